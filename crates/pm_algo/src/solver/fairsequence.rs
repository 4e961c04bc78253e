//! FairSequence solver (spec §4.5): an envy-free picking sequence. At
//! each step the paper with the highest deficit ratio claims its most-
//! preferred unassigned, non-conflicted reviewer with remaining
//! capacity. A `BinaryHeap` keyed on that ratio drives the sequence;
//! entries are invalidated lazily via a per-paper generation counter —
//! the same lazy-heap idiom the teacher's allocation code uses for its
//! tie-break bookkeeping (re-derive validity at pop time instead of
//! maintaining a separate removal index).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::solver::{locked_pairs, SolveError, SolveInput, Solver};
use crate::types::Matrix;

#[derive(Clone, Copy, Debug)]
struct HeapEntry {
    /// `remaining_demand / original_demand`, higher is more urgent.
    ratio: f64,
    paper: usize,
    generation: u64,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.ratio == other.ratio && self.paper == other.paper
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on ratio; break ties on paper index ascending (spec
        // §4.5: "ties broken by paper index"), so reverse the index
        // comparison since BinaryHeap is itself a max-heap.
        self.ratio
            .partial_cmp(&other.ratio)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.paper.cmp(&self.paper))
    }
}

pub struct FairSequenceSolver;

impl Solver for FairSequenceSolver {
    fn solve(&self, input: &SolveInput<'_>, cancel: &dyn Fn() -> bool) -> Result<Matrix<u8>, SolveError> {
        let n_r = input.n_reviewers();
        let n_p = input.n_papers();
        let mut assignment = Matrix::filled(n_r, n_p, 0u8);

        let mut remaining_capacity = input.maximum.to_vec();
        let mut remaining_demand = input.demand.to_vec();
        let original_demand: Vec<u32> = input.demand.to_vec();

        for (ri, pi) in locked_pairs(input.constraints) {
            assignment.set(ri, pi, 1);
            remaining_capacity[ri] = remaining_capacity[ri].saturating_sub(1);
            remaining_demand[pi] = remaining_demand[pi].saturating_sub(1);
        }

        // Saturate reviewer minimums first, same two-phase shape as the
        // flow-based solvers (first saturate minimums, then satisfy
        // demand): each reviewer under quota claims its best remaining
        // eligible paper before the envy-free sequence begins.
        let mut remaining_min: Vec<u32> = (0..n_r)
            .map(|ri| {
                let assigned = (0..n_p).filter(|&pi| *assignment.get(ri, pi) == 1).count() as u32;
                input.minimum[ri].saturating_sub(assigned)
            })
            .collect();

        for ri in 0..n_r {
            while remaining_min[ri] > 0 {
                if remaining_capacity[ri] == 0 {
                    return Err(SolveError::Infeasible(format!(
                        "reviewer index {ri} cannot reach its minimum load"
                    )));
                }
                let mut best: Option<(usize, f64)> = None;
                for pi in 0..n_p {
                    if remaining_demand[pi] == 0 || *assignment.get(ri, pi) == 1 {
                        continue;
                    }
                    if *input.constraints.get(pi, ri) == -1 {
                        continue;
                    }
                    let score = *input.affinity.get(ri, pi);
                    if best.map(|(_, b)| score > b).unwrap_or(true) {
                        best = Some((pi, score));
                    }
                }
                let (pi, _) = best.ok_or_else(|| {
                    SolveError::Infeasible(format!("reviewer index {ri} cannot reach its minimum load"))
                })?;
                assignment.set(ri, pi, 1);
                remaining_capacity[ri] -= 1;
                remaining_demand[pi] -= 1;
                remaining_min[ri] -= 1;
            }
        }

        let mut generation = vec![0u64; n_p];
        let mut heap = BinaryHeap::with_capacity(n_p);
        for pi in 0..n_p {
            if remaining_demand[pi] > 0 {
                heap.push(HeapEntry {
                    ratio: remaining_demand[pi] as f64 / original_demand[pi].max(1) as f64,
                    paper: pi,
                    generation: generation[pi],
                });
            }
        }

        let mut iterations_since_cancel_check = 0u32;
        while let Some(entry) = heap.pop() {
            iterations_since_cancel_check += 1;
            if iterations_since_cancel_check % 64 == 0 && cancel() {
                return Err(SolveError::Infeasible("cancelled".into()));
            }

            let pi = entry.paper;
            if entry.generation != generation[pi] || remaining_demand[pi] == 0 {
                continue; // stale entry: superseded since it was pushed
            }

            let mut best: Option<(usize, f64)> = None;
            for ri in 0..n_r {
                if remaining_capacity[ri] == 0 {
                    continue;
                }
                if *assignment.get(ri, pi) == 1 {
                    continue;
                }
                if *input.constraints.get(pi, ri) == -1 {
                    continue;
                }
                let score = *input.affinity.get(ri, pi);
                if best.map(|(_, b)| score > b).unwrap_or(true) {
                    best = Some((ri, score));
                }
            }

            let (ri, _) = best.ok_or_else(|| {
                SolveError::Infeasible(format!("no eligible reviewer remains for paper index {pi}"))
            })?;

            assignment.set(ri, pi, 1);
            remaining_capacity[ri] -= 1;
            remaining_demand[pi] -= 1;

            if remaining_demand[pi] > 0 {
                generation[pi] += 1;
                heap.push(HeapEntry {
                    ratio: remaining_demand[pi] as f64 / original_demand[pi].max(1) as f64,
                    paper: pi,
                    generation: generation[pi],
                });
            }
        }

        if remaining_demand.iter().any(|&d| d > 0) {
            return Err(SolveError::Infeasible("picking sequence stalled with unmet demand".into()));
        }

        Ok(assignment)
    }
}
