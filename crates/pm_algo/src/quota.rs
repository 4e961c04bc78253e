//! Quota resolver (spec §4.2): merges global min/max load and demand with
//! per-reviewer/per-paper overrides into the vectors every solver consumes.

use pm_core::ids::{PaperId, ReviewerId};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    SupplyDemandMismatch { supply_min: u64, supply_max: u64, demand: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::SupplyDemandMismatch { supply_min, supply_max, demand } => write!(
                f,
                "supply/demand mismatch: sum(minimum)={supply_min} sum(demand)={demand} sum(maximum)={supply_max}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Quotas {
    pub minimum: Vec<u32>,
    pub maximum: Vec<u32>,
    pub demand: Vec<u32>,
}

/// Resolve quota vectors. `custom_max` overrides are `(reviewer, override)`
/// pairs applied as `maximum[r] <- min(maximum[r], max(override, 0))`
/// uniformly (spec §9's Open Question resolution — never a bare
/// replacement, regardless of solver). `custom_demand` overrides are
/// `(paper, override)` pairs applied positionally, replacing the paper's
/// global demand outright.
pub fn resolve(
    reviewers: &[ReviewerId],
    papers: &[PaperId],
    min_papers: u32,
    max_papers: u32,
    user_demand: u32,
    custom_max: &[(ReviewerId, i64)],
    custom_demand: &[(PaperId, i64)],
) -> Result<Quotas, ConfigError> {
    let mut minimum = vec![min_papers; reviewers.len()];
    let mut maximum = vec![max_papers; reviewers.len()];
    let mut demand = vec![user_demand; papers.len()];

    for (rid, over) in custom_max {
        if let Some(ri) = reviewers.iter().position(|r| r == rid) {
            maximum[ri] = maximum[ri].min((*over).max(0) as u32);
        }
    }
    for ri in 0..reviewers.len() {
        if minimum[ri] > maximum[ri] {
            minimum[ri] = maximum[ri];
        }
    }

    for (pid, over) in custom_demand {
        if let Some(pi) = papers.iter().position(|p| p == pid) {
            demand[pi] = (*over).max(0) as u32;
        }
    }

    let supply_min: u64 = minimum.iter().map(|&v| v as u64).sum();
    let supply_max: u64 = maximum.iter().map(|&v| v as u64).sum();
    let total_demand: u64 = demand.iter().map(|&v| v as u64).sum();

    if supply_min > total_demand || total_demand > supply_max {
        return Err(ConfigError::SupplyDemandMismatch {
            supply_min,
            supply_max,
            demand: total_demand,
        });
    }

    Ok(Quotas { minimum, maximum, demand })
}
