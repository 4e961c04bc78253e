//! Assembles the decoded match into the `RunRecord` artifact `pm_cli`
//! writes and `pm_report` renders, self-verifying the assembled shape
//! before handing it back (spec §4.7's "decode into per-paper
//! assignments and alternates").
//!
//! Grounded on `vm_pipeline::build_artifacts`'s "assemble once,
//! self-verify, emit" shape: every artifact is built from already-
//! validated pieces, then checked once more before it leaves this
//! function, rather than trusting the assembly step silently.

use serde::Serialize;

use pm_core::ids::{PaperId, ReviewerId};
use pm_core::status::Status;
use pm_io::canonical::identity_digest;
use pm_io::config::ObjectiveType;
use pm_io::loader::LoadedInputs;

use crate::run::{MatchOutcome, RunOptions};
use crate::EngineError;

#[derive(Clone, Debug, Serialize)]
pub struct AssignmentOutput {
    pub paper: PaperId,
    pub assigned: Vec<(ReviewerId, f64)>,
    pub alternates: Vec<(ReviewerId, f64)>,
}

/// The one artifact a completed match produces: every per-paper
/// assignment plus the bookkeeping needed to reproduce the run (spec
/// §7's Assignment matrix / Alternate list, folded into one record).
#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    pub config_id: String,
    pub objective_type: ObjectiveType,
    pub seed: u64,
    pub status: Status,
    pub assignments: Vec<AssignmentOutput>,
    /// Pairs where a lock overrode a prior conflict/veto (spec §9).
    pub constraint_warnings: Vec<(PaperId, ReviewerId)>,
}

/// Build a `RunRecord` from a completed [`MatchOutcome`], checking that
/// every paper's decoded assignment count matches its resolved demand
/// before returning it.
pub fn build_run_record(
    inputs: &LoadedInputs,
    options: &RunOptions,
    outcome: &MatchOutcome,
) -> Result<RunRecord, EngineError> {
    let config_id = identity_digest(&inputs.config)?;

    let mut assignments = Vec::with_capacity(outcome.papers.len());
    for (pi, paper) in outcome.papers.iter().enumerate() {
        let assigned: Vec<(ReviewerId, f64)> =
            outcome.decode.assignments[pi].iter().map(|a| (a.reviewer.clone(), a.score)).collect();
        let alternates: Vec<(ReviewerId, f64)> =
            outcome.decode.alternates[pi].iter().map(|a| (a.reviewer.clone(), a.score)).collect();

        let demand = outcome.quotas.demand[pi];
        if assigned.len() as u32 != demand {
            return Err(EngineError::Internal(format!(
                "paper {} resolved demand {demand} but decoded {} assignments",
                paper.id,
                assigned.len()
            )));
        }

        assignments.push(AssignmentOutput { paper: paper.id.clone(), assigned, alternates });
    }

    Ok(RunRecord {
        config_id,
        objective_type: inputs.config.objective_type,
        seed: options.seed,
        status: Status::Complete,
        assignments,
        constraint_warnings: outcome.constraint_warnings.clone(),
    })
}
