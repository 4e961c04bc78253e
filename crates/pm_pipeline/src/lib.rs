//! Orchestration (spec §4.7): wires `pm_io`'s loaded inputs through
//! `pm_algo`'s quota resolver, encoder, and solver family, then decodes
//! the result into the artifacts `pm_cli`/`pm_report` consume.
//!
//! Mirrors the retrieved `matcher/match.py::Match` orchestrator's shape
//! (resolve -> encode -> solve -> decode -> publish status) without its
//! module-level mutable state: every step here is a plain function over
//! owned data, and the status channel is an injected [`status_channel::StatusSink`]
//! rather than a global API client.

pub mod build_outputs;
pub mod run;
pub mod solver_factory;
pub mod status_channel;

use thiserror::Error;

/// Everything that can go wrong assembling and running a match, folding
/// in every lower-layer error type behind one umbrella (spec §7's error
/// table, `pm_pipeline` row).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] pm_io::errors::IoError),

    #[error("quota resolution error: {0}")]
    Quota(#[from] pm_algo::ConfigError),

    #[error("encode error: {0}")]
    Encode(#[from] pm_algo::EncodeError),

    #[error("solve error: {0}")]
    Solve(#[from] pm_algo::SolveError),

    #[error("{0}")]
    Internal(String),
}

pub use build_outputs::{build_run_record, AssignmentOutput, RunRecord};
pub use run::{run_match, spawn_match, MatchHandle, MatchOutcome, RunOptions};
