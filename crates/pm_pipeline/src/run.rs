//! Prepares `pm_algo`'s inputs from a [`pm_io::loader::LoadedInputs`] and
//! drives one match end to end: resolve quotas, encode, solve, decode,
//! publishing status transitions along the way (spec §4.7/§5).
//!
//! `spawn_match` mirrors the retrieved `matcher/match.py::Match.run`'s
//! `threading.Thread` fire-and-forget shape, translated into
//! `std::thread::spawn` plus an explicit `JoinHandle`-owning handle and
//! an `Arc<AtomicBool>` cancel flag (spec §9's design note), instead of
//! the original's implicit thread-local state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use pm_algo::{decode, encode, resolve_quotas, DecodeOutput, Edge, Paper, Quotas, Reviewer, ScoreSignal, SolveInput};
use pm_core::ids::{PaperId, ReviewerId};
use pm_core::status::Status;
use pm_io::canonical::identity_digest;
use pm_io::edge::EdgeRecord;
use pm_io::loader::LoadedInputs;

use crate::solver_factory::build_solver;
use crate::status_channel::{publish_best_effort, StatusRegistry, StatusSink};
use crate::EngineError;

/// Per-run knobs that do not live in the `Configuration` record itself.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// Seed for every deterministic draw this run makes (tie-breaks,
    /// the Randomized solver's dependent rounding). Never OS entropy.
    pub seed: u64,
}

/// The decoded, ready-to-render result of a completed match.
pub struct MatchOutcome {
    pub quotas: Quotas,
    pub decode: DecodeOutput,
    pub reviewers: Vec<Reviewer>,
    pub papers: Vec<Paper>,
    /// Pairs where a lock overrode a prior conflict/veto (spec §9).
    pub constraint_warnings: Vec<(PaperId, ReviewerId)>,
}

fn edge_of(record: &EdgeRecord) -> Edge {
    Edge {
        paper: PaperId::from(record.head.as_str()),
        reviewer: ReviewerId::from(record.tail.as_str()),
        value: record.weight,
        label: record.label.clone(),
    }
}

/// Build the `(reviewer, override)` pairs a custom-max-papers edge
/// stream contributes, keeping only edges scoped to this run's match
/// group (spec §6: `head` is a match-group id, `tail` a reviewer id).
fn custom_max_overrides(inputs: &LoadedInputs) -> Vec<(ReviewerId, i64)> {
    inputs
        .custom_max_edges
        .iter()
        .filter(|e| e.head == inputs.config.match_group)
        .map(|e| (ReviewerId::from(e.tail.as_str()), e.weight.unwrap_or(0.0) as i64))
        .collect()
}

/// Build the `(paper, override)` pairs a custom-demand edge stream
/// contributes, keeping only edges scoped to this run's match group
/// (spec §6: `head` is a paper id, `tail` a match-group id).
fn custom_demand_overrides(inputs: &LoadedInputs) -> Vec<(PaperId, i64)> {
    inputs
        .custom_demand_edges
        .iter()
        .filter(|e| e.tail == inputs.config.match_group)
        .map(|e| (PaperId::from(e.head.as_str()), e.weight.unwrap_or(0.0) as i64))
        .collect()
}

fn run_match_inner(
    inputs: &LoadedInputs,
    options: &RunOptions,
    cancel: &dyn Fn() -> bool,
) -> Result<MatchOutcome, EngineError> {
    let config = &inputs.config;

    let quotas = resolve_quotas(
        &inputs.reviewers,
        &inputs.papers,
        config.min_papers,
        config.max_papers,
        config.user_demand,
        &custom_max_overrides(inputs),
        &custom_demand_overrides(inputs),
    )?;

    let reviewers: Vec<Reviewer> = inputs
        .reviewers
        .iter()
        .zip(quotas.minimum.iter().zip(quotas.maximum.iter()))
        .map(|(id, (&minimum, &maximum))| Reviewer { id: id.clone(), minimum, maximum })
        .collect();
    let papers: Vec<Paper> = inputs
        .papers
        .iter()
        .zip(quotas.demand.iter())
        .map(|(id, &demand)| Paper { id: id.clone(), demand })
        .collect();

    let signals: Vec<ScoreSignal> = config
        .scores_specification
        .iter()
        .map(|(name, spec)| ScoreSignal {
            source: name.clone(),
            weight: spec.weight,
            default: spec.default.unwrap_or(0.0),
            translate_map: spec.translate_map.clone(),
        })
        .collect();

    let score_edges: Vec<(String, Vec<Edge>)> = inputs
        .score_edges
        .iter()
        .map(|(name, edges)| (name.clone(), edges.iter().map(edge_of).collect()))
        .collect();
    let conflict_edges: Vec<Edge> = inputs.conflict_edges.iter().map(edge_of).collect();
    let veto_edges: Vec<Edge> = inputs.veto_edges.iter().map(edge_of).collect();
    let lock_edges: Vec<Edge> = inputs.lock_edges.iter().map(edge_of).collect();

    let encoded = encode(
        &reviewers,
        &papers,
        &signals,
        &score_edges,
        &conflict_edges,
        &veto_edges,
        &lock_edges,
        config.allow_zero_score_assignments,
    )?;

    if cancel() {
        return Err(EngineError::Solve(pm_algo::SolveError::Infeasible("cancelled".into())));
    }

    let solver = build_solver(config.objective_type);
    let solve_input = SolveInput {
        affinity: &encoded.affinity,
        cost: &encoded.cost,
        constraints: &encoded.constraints,
        minimum: &quotas.minimum,
        maximum: &quotas.maximum,
        demand: &quotas.demand,
        probability_limit: config.randomized_probability_limits,
        rng_seed: options.seed,
    };
    let assignment = solver.solve(&solve_input, cancel)?;

    if cancel() {
        return Err(EngineError::Solve(pm_algo::SolveError::Infeasible("cancelled".into())));
    }

    let decoded = decode(&assignment, &encoded.affinity, &encoded.constraints, &reviewers, config.alternates as usize);

    Ok(MatchOutcome {
        quotas,
        decode: decoded,
        reviewers,
        papers,
        constraint_warnings: encoded.constraint_warnings,
    })
}

/// Run one match synchronously, publishing `Running` before starting and
/// `Complete`/`NoSolution`/`Error` on the way out (spec §5/§7). The
/// config identity (spec §5) keys every status publish.
pub fn run_match(
    inputs: &LoadedInputs,
    options: &RunOptions,
    registry: &StatusRegistry,
    sink: &dyn StatusSink,
    cancel: &dyn Fn() -> bool,
) -> Result<MatchOutcome, EngineError> {
    let config_id = identity_digest(&inputs.config)?;
    publish_best_effort(registry, sink, &config_id, Status::Running, None);

    match run_match_inner(inputs, options, cancel) {
        Ok(outcome) => {
            publish_best_effort(registry, sink, &config_id, Status::Complete, None);
            Ok(outcome)
        }
        Err(EngineError::Solve(pm_algo::SolveError::Infeasible(msg))) => {
            publish_best_effort(registry, sink, &config_id, Status::NoSolution, Some(msg.clone()));
            Err(EngineError::Solve(pm_algo::SolveError::Infeasible(msg)))
        }
        Err(err) => {
            publish_best_effort(registry, sink, &config_id, Status::Error, Some(err.to_string()));
            Err(err)
        }
    }
}

/// A handle onto a match running on its own thread, carrying the
/// `Arc<AtomicBool>` used to request cancellation (spec §5's named
/// cancellation boundaries; polled after encode, between FairFlow
/// iterations, and before decode).
pub struct MatchHandle {
    join: JoinHandle<Result<MatchOutcome, EngineError>>,
    cancel_flag: Arc<AtomicBool>,
}

impl MatchHandle {
    pub fn request_cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    pub fn join(self) -> Result<MatchOutcome, EngineError> {
        self.join.join().unwrap_or_else(|_| Err(EngineError::Internal("match thread panicked".into())))
    }
}

/// Spawn a match on its own thread. `inputs` is cloned onto the new
/// thread; the registry and sink are shared via `Arc`.
pub fn spawn_match(
    inputs: LoadedInputs,
    options: RunOptions,
    registry: Arc<StatusRegistry>,
    sink: Arc<dyn StatusSink + Send + Sync>,
) -> MatchHandle {
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let thread_flag = cancel_flag.clone();

    let join = std::thread::spawn(move || {
        let cancel = move || thread_flag.load(Ordering::SeqCst);
        run_match(&inputs, &options, &registry, sink.as_ref(), &cancel)
    });

    MatchHandle { join, cancel_flag }
}
