//! `Configuration`: the logical record consumed by the core (spec §6),
//! loaded from a single local JSON file. Field names and the `max_users`
//! legacy alias mirror the retrieved Python original's configuration note.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::IoError;
use crate::reject_remote_path;

/// The four closed solver variants (spec §9's "closed variant set").
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum ObjectiveType {
    MinMax,
    FairFlow,
    FairSequence,
    Randomized,
}

/// One heterogeneous score signal: a weight, an optional default for
/// missing pairs, an optional normalization flag, and an optional
/// label -> number translation map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoreSpec {
    pub weight: f64,
    #[serde(default)]
    pub default: Option<f64>,
    #[serde(default)]
    pub normalize: Option<bool>,
    #[serde(default)]
    pub translate_map: Option<BTreeMap<String, f64>>,
}

fn deserialize_yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YesNo {
        Bool(bool),
        Str(String),
    }
    match YesNo::deserialize(deserializer)? {
        YesNo::Bool(b) => Ok(b),
        YesNo::Str(s) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"yes\"/\"no\", got {other:?}"
            ))),
        },
    }
}

/// The Configuration record (spec §6). Deserialized from a single local
/// JSON file; no network schemes are ever resolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub title: String,
    pub match_group: String,
    pub paper_invitation: String,

    pub min_papers: u32,
    pub max_papers: u32,

    #[serde(alias = "max_users")]
    pub user_demand: u32,

    #[serde(default)]
    pub alternates: u32,

    #[serde(deserialize_with = "deserialize_yes_no")]
    pub allow_zero_score_assignments: bool,

    pub randomized_probability_limits: f64,

    pub objective_type: ObjectiveType,

    pub scores_specification: BTreeMap<String, ScoreSpec>,

    #[serde(default)]
    pub conflicts_invitation: Option<String>,
    /// Reviewer-paper pairs forced out of the assignment matrix
    /// regardless of affinity (spec §3/§4.1 "constraint overrides").
    #[serde(default)]
    pub vetoes_invitation: Option<String>,
    /// Reviewer-paper pairs forced into the assignment matrix,
    /// overriding any veto or conflict on the same pair.
    #[serde(default)]
    pub locks_invitation: Option<String>,
    #[serde(default)]
    pub custom_max_papers_invitation: Option<String>,
    #[serde(default)]
    pub custom_user_demand_invitation: Option<String>,

    pub assignment_invitation: String,
    pub aggregate_score_invitation: String,
}

/// Load a `Configuration` from a local JSON file path.
pub fn load_config(path: &Path) -> Result<Configuration, IoError> {
    reject_remote_path(path)?;
    let text = std::fs::read_to_string(path)?;
    let cfg: Configuration = serde_json::from_str(&text)?;
    if cfg.min_papers > cfg.max_papers {
        return Err(IoError::Manifest(format!(
            "min_papers ({}) exceeds max_papers ({})",
            cfg.min_papers, cfg.max_papers
        )));
    }
    if !(0.0..=1.0).contains(&cfg.randomized_probability_limits)
        || cfg.randomized_probability_limits <= 0.0
    {
        return Err(IoError::Manifest(format!(
            "randomized_probability_limits must be in (0, 1], got {}",
            cfg.randomized_probability_limits
        )));
    }
    Ok(cfg)
}
