//! The four assignment solvers (spec §4.3-4.6) and their shared input/
//! output shapes.

#[cfg(feature = "fairflow")]
pub mod fairflow;
#[cfg(feature = "fairsequence")]
pub mod fairsequence;
pub mod mcf;
#[cfg(feature = "minmax")]
pub mod minmax;
#[cfg(feature = "randomized")]
pub mod randomized;

use crate::types::Matrix;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SolveError {
    /// Reported as `Status::NoSolution` (spec §7): the MCF could not
    /// route full demand, the makespan search found no feasible target,
    /// or greedy picking stalled.
    Infeasible(String),
    /// Reported as `Status::Error` (spec §7): a solver invariant was
    /// violated (e.g. FairFlow's G3 group grew across an iteration).
    Internal(String),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::Infeasible(msg) => write!(f, "infeasible: {msg}"),
            SolveError::Internal(msg) => write!(f, "internal solver error: {msg}"),
        }
    }
}

impl std::error::Error for SolveError {}

/// Everything a solver needs: the affinity/cost matrices keyed
/// `[reviewer][paper]`, the constraint matrix keyed `[paper][reviewer]`,
/// and the resolved quota vectors.
pub struct SolveInput<'a> {
    pub affinity: &'a Matrix<f64>,
    pub cost: &'a Matrix<i64>,
    pub constraints: &'a Matrix<i8>,
    pub minimum: &'a [u32],
    pub maximum: &'a [u32],
    pub demand: &'a [u32],
    /// Only consulted by the Randomized solver.
    pub probability_limit: f64,
    /// Only consulted by the Randomized solver's dependent rounding.
    pub rng_seed: u64,
}

impl<'a> SolveInput<'a> {
    pub fn n_reviewers(&self) -> usize {
        self.affinity.rows()
    }
    pub fn n_papers(&self) -> usize {
        self.affinity.cols()
    }
}

/// A solver consumes the matrices and quota vectors and returns a binary
/// assignment `S[r, p]`. `cancel` is polled between major phases (spec
/// §5); when it returns `true` the solver aborts with
/// `SolveError::Infeasible("cancelled")` rather than emitting a partial
/// assignment.
pub trait Solver {
    fn solve(&self, input: &SolveInput<'_>, cancel: &dyn Fn() -> bool) -> Result<Matrix<u8>, SolveError>;
}

pub(crate) fn locked_pairs(constraints: &Matrix<i8>) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for pi in 0..constraints.rows() {
        for ri in 0..constraints.cols() {
            if *constraints.get(pi, ri) == 1 {
                out.push((ri, pi));
            }
        }
    }
    out
}

pub(crate) fn is_forbidden(constraints: &Matrix<i8>, ri: usize, pi: usize) -> bool {
    *constraints.get(pi, ri) == -1
}
