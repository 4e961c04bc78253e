//! Algorithm layer: the encoder, quota resolver, and the four
//! assignment solvers. Deterministic and I/O-free — every type here is
//! plain data, and every function is a pure transformation over it so
//! that `pm_pipeline` can drive the whole thing from one place and
//! `pm_cli`/`pm_report` never have to reach back in.

pub mod encode;
pub mod quota;
pub mod solver;
pub mod types;

#[cfg(feature = "minmax")]
pub use solver::minmax::MinMaxSolver;

#[cfg(feature = "fairflow")]
pub use solver::fairflow::FairFlowSolver;

#[cfg(feature = "fairsequence")]
pub use solver::fairsequence::FairSequenceSolver;

#[cfg(feature = "randomized")]
pub use solver::randomized::RandomizedSolver;

pub use encode::{decode, encode, Assigned, DecodeOutput, EncodeError, EncodeOutput};
pub use quota::{resolve as resolve_quotas, ConfigError, Quotas};
pub use solver::{SolveError, SolveInput, Solver};
pub use types::{Edge, Matrix, Paper, Reviewer, ScoreSignal};
