//! Matrix builder (encoder) and decoder (spec §4.1).
//!
//! Constraint assembly order is significant: zero, then conflicts (-1),
//! then vetoes (-1), then locks (+1, overriding prior -1), then — when
//! zero-score assignments are disallowed — an additional -1 for pairs
//! whose aggregate score defaults to zero. A lock set earlier in the
//! pipeline is never overwritten by the zero-score rule: lock dominance
//! (spec §3's constraint-matrix invariant) holds regardless of which
//! rule runs last.

use std::collections::HashMap;

use pm_core::ids::{PaperId, ReviewerId};
use pm_core::rounding::affinity_to_cost;

use crate::types::{Edge, Matrix, Paper, Reviewer, ScoreSignal};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    UnknownLabel { label: String, valid: Vec<String> },
    NonNumericWeight(String),
    UnknownReviewer(String),
    UnknownPaper(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::UnknownLabel { label, valid } => {
                write!(f, "unknown translation label {label:?}, valid labels: {valid:?}")
            }
            EncodeError::NonNumericWeight(pair) => write!(f, "non-numeric weight for pair {pair}"),
            EncodeError::UnknownReviewer(id) => write!(f, "edge references unknown reviewer {id:?}"),
            EncodeError::UnknownPaper(id) => write!(f, "edge references unknown paper {id:?}"),
        }
    }
}

impl std::error::Error for EncodeError {}

pub struct EncodeOutput {
    /// `A[r, p]`: aggregate affinity.
    pub affinity: Matrix<f64>,
    /// `C[r, p]`: integer-scaled cost, `C = -A` rescaled.
    pub cost: Matrix<i64>,
    /// `K[p, r] in {-1, 0, +1}`.
    pub constraints: Matrix<i8>,
    /// Pairs where a lock overrode a prior conflict/veto (spec §9's Open
    /// Question: "surface a warning diagnostic at least").
    pub constraint_warnings: Vec<(PaperId, ReviewerId)>,
}

fn index_of<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    ids.enumerate().map(|(i, id)| (id, i)).collect()
}

#[allow(clippy::too_many_arguments)]
pub fn encode(
    reviewers: &[Reviewer],
    papers: &[Paper],
    signals: &[ScoreSignal],
    score_edges: &[(String, Vec<Edge>)],
    conflict_edges: &[Edge],
    veto_edges: &[Edge],
    lock_edges: &[Edge],
    allow_zero_score: bool,
) -> Result<EncodeOutput, EncodeError> {
    let n_r = reviewers.len();
    let n_p = papers.len();

    let r_index = index_of(reviewers.iter().map(|r| r.id.as_str()));
    let p_index = index_of(papers.iter().map(|p| p.id.as_str()));

    let mut affinity = Matrix::filled(n_r, n_p, 0.0f64);

    for signal in signals {
        let edges: &[Edge] = score_edges
            .iter()
            .find(|(name, _)| name == &signal.source)
            .map(|(_, e)| e.as_slice())
            .unwrap_or(&[]);

        let mut provided: HashMap<(usize, usize), f64> = HashMap::with_capacity(edges.len());
        for e in edges {
            let ri = *r_index
                .get(e.reviewer.as_str())
                .ok_or_else(|| EncodeError::UnknownReviewer(e.reviewer.as_str().to_string()))?;
            let pi = *p_index
                .get(e.paper.as_str())
                .ok_or_else(|| EncodeError::UnknownPaper(e.paper.as_str().to_string()))?;

            let value = if let Some(label) = &e.label {
                let map = signal.translate_map.as_ref().ok_or_else(|| EncodeError::UnknownLabel {
                    label: label.clone(),
                    valid: Vec::new(),
                })?;
                *map.get(label).ok_or_else(|| EncodeError::UnknownLabel {
                    label: label.clone(),
                    valid: map.keys().cloned().collect(),
                })?
            } else if let Some(v) = e.value {
                v
            } else {
                return Err(EncodeError::NonNumericWeight(format!("{}:{}", e.paper, e.reviewer)));
            };
            provided.insert((ri, pi), value);
        }

        for ri in 0..n_r {
            for pi in 0..n_p {
                let v = provided.get(&(ri, pi)).copied().unwrap_or(signal.default);
                *affinity.get_mut(ri, pi) += signal.weight * v;
            }
        }
    }

    let mut cost = Matrix::filled(n_r, n_p, 0i64);
    for ri in 0..n_r {
        for pi in 0..n_p {
            cost.set(ri, pi, affinity_to_cost(*affinity.get(ri, pi)));
        }
    }

    let mut constraints = Matrix::filled(n_p, n_r, 0i8);
    let mut warnings = Vec::new();

    let resolve_indices = |e: &Edge| -> Result<(usize, usize), EncodeError> {
        let ri = *r_index
            .get(e.reviewer.as_str())
            .ok_or_else(|| EncodeError::UnknownReviewer(e.reviewer.as_str().to_string()))?;
        let pi = *p_index
            .get(e.paper.as_str())
            .ok_or_else(|| EncodeError::UnknownPaper(e.paper.as_str().to_string()))?;
        Ok((ri, pi))
    };

    for e in conflict_edges {
        let (ri, pi) = resolve_indices(e)?;
        constraints.set(pi, ri, -1);
    }
    for e in veto_edges {
        let (ri, pi) = resolve_indices(e)?;
        constraints.set(pi, ri, -1);
    }
    for e in lock_edges {
        let (ri, pi) = resolve_indices(e)?;
        if *constraints.get(pi, ri) == -1 {
            warnings.push((papers[pi].id.clone(), reviewers[ri].id.clone()));
        }
        constraints.set(pi, ri, 1);
    }

    if !allow_zero_score {
        for ri in 0..n_r {
            for pi in 0..n_p {
                if *affinity.get(ri, pi) == 0.0 && *constraints.get(pi, ri) != 1 {
                    constraints.set(pi, ri, -1);
                }
            }
        }
    }

    Ok(EncodeOutput { affinity, cost, constraints, constraint_warnings: warnings })
}

pub struct Assigned {
    pub reviewer: ReviewerId,
    pub score: f64,
}

pub struct DecodeOutput {
    /// Per paper (by index), assigned reviewers sorted by score descending.
    pub assignments: Vec<Vec<Assigned>>,
    /// Per paper (by index), ranked alternates (unassigned, unconflicted).
    pub alternates: Vec<Vec<Assigned>>,
}

/// Decode a binary assignment matrix `S[r, p]` plus the affinity matrix
/// into per-paper assignments and ranked alternates (spec §4.1).
pub fn decode(
    assignment: &Matrix<u8>,
    affinity: &Matrix<f64>,
    constraints: &Matrix<i8>,
    reviewers: &[Reviewer],
    alternates_count: usize,
) -> DecodeOutput {
    let n_r = reviewers.len();
    let n_p = affinity.cols();

    let mut assignments = Vec::with_capacity(n_p);
    let mut alternates = Vec::with_capacity(n_p);

    for pi in 0..n_p {
        let mut assigned: Vec<Assigned> = (0..n_r)
            .filter(|&ri| *assignment.get(ri, pi) == 1)
            .map(|ri| Assigned { reviewer: reviewers[ri].id.clone(), score: *affinity.get(ri, pi) })
            .collect();
        assigned.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let mut alt: Vec<Assigned> = (0..n_r)
            .filter(|&ri| *assignment.get(ri, pi) == 0 && *constraints.get(pi, ri) != -1)
            .map(|ri| Assigned { reviewer: reviewers[ri].id.clone(), score: *affinity.get(ri, pi) })
            .collect();
        alt.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        alt.truncate(alternates_count);

        assignments.push(assigned);
        alternates.push(alt);
    }

    DecodeOutput { assignments, alternates }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewer(id: &str) -> Reviewer {
        Reviewer { id: id.into(), minimum: 0, maximum: 2 }
    }
    fn paper(id: &str) -> Paper {
        Paper { id: id.into(), demand: 1 }
    }
    fn edge(paper: &str, reviewer: &str, value: f64) -> Edge {
        Edge { paper: paper.into(), reviewer: reviewer.into(), value: Some(value), label: None }
    }

    #[test]
    fn lock_dominates_conflict() {
        let reviewers = vec![reviewer("r1")];
        let papers = vec![paper("p1")];
        let signals = vec![ScoreSignal { source: "s".into(), weight: 1.0, default: 0.0, translate_map: None }];
        let score_edges = vec![("s".to_string(), vec![edge("p1", "r1", 0.5)])];
        let conflicts = vec![edge("p1", "r1", 0.0)];
        let locks = vec![edge("p1", "r1", 0.0)];

        let out = encode(&reviewers, &papers, &signals, &score_edges, &conflicts, &[], &locks, true).unwrap();
        assert_eq!(*out.constraints.get(0, 0), 1, "lock must win over conflict");
        assert_eq!(out.constraint_warnings.len(), 1);
    }

    #[test]
    fn unknown_label_reports_valid_keys() {
        let reviewers = vec![reviewer("r1")];
        let papers = vec![paper("p1")];
        let mut map = std::collections::BTreeMap::new();
        map.insert("high".to_string(), 1.0);
        let signals = vec![ScoreSignal { source: "s".into(), weight: 1.0, default: 0.0, translate_map: Some(map) }];
        let bad_edge = Edge { paper: "p1".into(), reviewer: "r1".into(), value: None, label: Some("nope".into()) };
        let score_edges = vec![("s".to_string(), vec![bad_edge])];

        let err = encode(&reviewers, &papers, &signals, &score_edges, &[], &[], &[], true).unwrap_err();
        match err {
            EncodeError::UnknownLabel { label, valid } => {
                assert_eq!(label, "nope");
                assert_eq!(valid, vec!["high".to_string()]);
            }
            other => panic!("expected UnknownLabel, got {other:?}"),
        }
    }

    #[test]
    fn zero_score_rule_never_overrides_a_lock() {
        let reviewers = vec![reviewer("r1")];
        let papers = vec![paper("p1")];
        let signals = vec![ScoreSignal { source: "s".into(), weight: 1.0, default: 0.0, translate_map: None }];
        let locks = vec![edge("p1", "r1", 0.0)];
        let out = encode(&reviewers, &papers, &signals, &[], &[], &[], &locks, false).unwrap();
        assert_eq!(*out.constraints.get(0, 0), 1);
    }
}
