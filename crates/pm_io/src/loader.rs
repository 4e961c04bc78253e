//! Orchestrates config + edge-stream loading into a single
//! [`LoadedInputs`], deriving the stable reviewer/paper universe from the
//! union of ids observed across every edge stream (no separate
//! reviewer/paper roster file is part of this local-file surface; the
//! edges themselves are the roster, same as the retrieved Python
//! original deriving its reviewer/paper sets from invitation edges).

use std::collections::BTreeSet;
use std::path::Path;

use pm_core::ids::{PaperId, ReviewerId};

use crate::config::{load_config, Configuration};
use crate::edge::{load_edges, EdgeRecord};
use crate::errors::IoError;

#[derive(Clone, Debug)]
pub struct LoadedInputs {
    pub config: Configuration,
    /// Score edges keyed by signal source name (matches
    /// `Configuration::scores_specification`'s keys).
    pub score_edges: Vec<(String, Vec<EdgeRecord>)>,
    pub conflict_edges: Vec<EdgeRecord>,
    pub veto_edges: Vec<EdgeRecord>,
    pub lock_edges: Vec<EdgeRecord>,
    pub custom_max_edges: Vec<EdgeRecord>,
    pub custom_demand_edges: Vec<EdgeRecord>,
    /// Stable, lexicographically sorted reviewer universe.
    pub reviewers: Vec<ReviewerId>,
    /// Stable, lexicographically sorted paper universe.
    pub papers: Vec<PaperId>,
}

/// One score-signal source paired with the local path of its edge file.
pub struct ScoreSource<'a> {
    pub name: &'a str,
    pub path: &'a Path,
}

pub fn load_inputs(
    config_path: &Path,
    score_sources: &[ScoreSource<'_>],
    conflicts_path: Option<&Path>,
    vetoes_path: Option<&Path>,
    locks_path: Option<&Path>,
    custom_max_path: Option<&Path>,
    custom_demand_path: Option<&Path>,
) -> Result<LoadedInputs, IoError> {
    let config = load_config(config_path)?;

    let mut score_edges = Vec::with_capacity(score_sources.len());
    for src in score_sources {
        if !config.scores_specification.contains_key(src.name) {
            return Err(IoError::Manifest(format!(
                "score source {:?} has no matching entry in scores_specification",
                src.name
            )));
        }
        score_edges.push((src.name.to_string(), load_edges(src.path)?));
    }
    for name in config.scores_specification.keys() {
        if !score_edges.iter().any(|(n, _)| n == name) {
            return Err(IoError::Manifest(format!(
                "scores_specification declares {name:?} but no --score edge file was given"
            )));
        }
    }

    let conflict_edges = match conflicts_path {
        Some(p) => load_edges(p)?,
        None => Vec::new(),
    };
    let veto_edges = match vetoes_path {
        Some(p) => load_edges(p)?,
        None => Vec::new(),
    };
    let lock_edges = match locks_path {
        Some(p) => load_edges(p)?,
        None => Vec::new(),
    };
    let custom_max_edges = match custom_max_path {
        Some(p) => load_edges(p)?,
        None => Vec::new(),
    };
    let custom_demand_edges = match custom_demand_path {
        Some(p) => load_edges(p)?,
        None => Vec::new(),
    };

    let mut paper_ids: BTreeSet<String> = BTreeSet::new();
    let mut reviewer_ids: BTreeSet<String> = BTreeSet::new();

    for (_, edges) in &score_edges {
        for e in edges {
            paper_ids.insert(e.head.clone());
            reviewer_ids.insert(e.tail.clone());
        }
    }
    for e in &conflict_edges {
        paper_ids.insert(e.head.clone());
        reviewer_ids.insert(e.tail.clone());
    }
    for e in &veto_edges {
        paper_ids.insert(e.head.clone());
        reviewer_ids.insert(e.tail.clone());
    }
    for e in &lock_edges {
        paper_ids.insert(e.head.clone());
        reviewer_ids.insert(e.tail.clone());
    }
    // custom-max edges: head = match group, tail = reviewer.
    for e in &custom_max_edges {
        reviewer_ids.insert(e.tail.clone());
    }
    // custom-demand edges: head = paper, tail = match group.
    for e in &custom_demand_edges {
        paper_ids.insert(e.head.clone());
    }

    if paper_ids.is_empty() {
        return Err(IoError::Manifest("no papers observed in any edge stream".into()));
    }
    if reviewer_ids.is_empty() {
        return Err(IoError::Manifest("no reviewers observed in any edge stream".into()));
    }

    let reviewers: Vec<ReviewerId> = reviewer_ids.into_iter().map(|s| ReviewerId::from(s.as_str())).collect();
    let papers: Vec<PaperId> = paper_ids.into_iter().map(|s| PaperId::from(s.as_str())).collect();

    Ok(LoadedInputs {
        config,
        score_edges,
        conflict_edges,
        veto_edges,
        lock_edges,
        custom_max_edges,
        custom_demand_edges,
        reviewers,
        papers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{contents}").unwrap();
        f
    }

    #[test]
    fn derives_reviewer_and_paper_universe_from_edges() {
        let config = write_tmp(
            r#"{
            "title": "t", "match_group": "g", "paper_invitation": "p",
            "min_papers": 0, "max_papers": 2, "user_demand": 1,
            "allow_zero_score_assignments": "yes",
            "randomized_probability_limits": 0.5,
            "objective_type": "MinMax",
            "scores_specification": {"affinity": {"weight": 1.0}},
            "assignment_invitation": "a",
            "aggregate_score_invitation": "s"
        }"#,
        );
        let scores = write_tmp(r#"[{"head":"p1","tail":"r1","weight":0.9},{"head":"p2","tail":"r1","weight":0.1}]"#);
        let loaded = load_inputs(
            config.path(),
            &[ScoreSource { name: "affinity", path: scores.path() }],
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(loaded.papers.len(), 2);
        assert_eq!(loaded.reviewers.len(), 1);
    }
}
