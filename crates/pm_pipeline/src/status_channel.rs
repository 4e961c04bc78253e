//! Status channel: an injected publish capability plus the process-wide
//! registry that serializes same-configuration runs (spec §5/§7).
//!
//! Spec §9's "global mutable status" design note — the retrieved
//! original posts status through a module-level API client — is
//! replaced here with [`StatusSink`], a capability callers inject;
//! production wiring (an HTTP client, say) lives outside this crate,
//! and tests inject a stub.

use std::collections::BTreeMap;
use std::sync::Mutex;

use pm_core::status::{can_transition, Status, StatusRecord};

/// How many times [`run::run_match`](crate::run::run_match) retries a
/// rejected publish before giving up (spec §7's "implementation-chosen
/// bound" for external errors).
pub const MAX_PUBLISH_RETRIES: u32 = 3;

/// A failed attempt to hand a status transition to the external
/// collaborator. Distinct from [`crate::EngineError`] — a publish
/// failure never aborts the run itself, only the best-effort echo of
/// its outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusError;

/// Capability the orchestrator publishes state transitions through.
pub trait StatusSink {
    fn publish(&self, config_id: &str, status: Status, error_message: Option<String>) -> Result<(), StatusError>;
}

/// A sink that accepts every publish and discards it — the default for
/// offline runs (`pm_cli`) that only care about the final artifacts.
pub struct NullSink;

impl StatusSink for NullSink {
    fn publish(&self, _config_id: &str, _status: Status, _error_message: Option<String>) -> Result<(), StatusError> {
        Ok(())
    }
}

/// `Mutex<BTreeMap<ConfigId, StatusRecord>>` with last-write-wins per
/// key and a monotonicity guard: a delayed or duplicated publish never
/// moves a configuration's recorded state backwards (spec §5).
pub struct StatusRegistry {
    records: Mutex<BTreeMap<String, StatusRecord>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        StatusRegistry { records: Mutex::new(BTreeMap::new()) }
    }

    /// Record `to` for `config_id` if the transition from whatever is
    /// currently on record (or `Initialized` if nothing is) is legal.
    /// Returns `false`, leaving the registry untouched, when the
    /// transition would move the state backwards.
    pub fn transition(&self, config_id: &str, to: Status, error_message: Option<String>) -> bool {
        let mut guard = self.records.lock().expect("status registry poisoned");
        let from = guard.get(config_id).map(|r| r.status).unwrap_or(Status::Initialized);
        if !can_transition(from, to) {
            return false;
        }
        guard.insert(config_id.to_string(), StatusRecord { status: to, error_message });
        true
    }

    pub fn current(&self, config_id: &str) -> Option<StatusRecord> {
        self.records.lock().expect("status registry poisoned").get(config_id).cloned()
    }
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the monotonicity guard, then best-effort publish to `sink`,
/// retrying up to [`MAX_PUBLISH_RETRIES`] times. A publish that never
/// succeeds is dropped silently — `pm_pipeline` carries no logging
/// framework (the same discipline `pm_core`/`pm_algo` keep), so
/// surfacing the failure to a human is `pm_cli`'s job, not this one's.
pub fn publish_best_effort(
    registry: &StatusRegistry,
    sink: &dyn StatusSink,
    config_id: &str,
    status: Status,
    error_message: Option<String>,
) {
    if !registry.transition(config_id, status, error_message.clone()) {
        return;
    }
    for _ in 0..MAX_PUBLISH_RETRIES {
        if sink.publish(config_id, status, error_message.clone()).is_ok() {
            return;
        }
    }
}
