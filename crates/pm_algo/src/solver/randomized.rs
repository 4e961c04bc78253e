//! Randomized solver (spec §4.6): solve the LP relaxation of the
//! assignment polytope, then round the fractional solution to an
//! integral one via pairwise dependent (pivotal) rounding so that every
//! paper's realized reviewer count matches its demand exactly and each
//! reviewer's assignment probability never exceeds `probability_limit`.
//!
//! The LP step follows the retrieved `good_lp`-based optimiser's
//! builder style (`ProblemVariables`, `constraint!`, `SolverModel::with`)
//! verbatim; the teacher repo has no LP solver of its own, so this is
//! the pack's only grounding source for that half. The rounding step has
//! no analogue in the pack and is original, built on `pm_core::rng`.

use good_lp::solvers::microlp::microlp;
use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use crate::solver::{locked_pairs, SolveError, SolveInput, Solver};
use crate::types::Matrix;
use pm_core::rng::match_rng_from_seed;

pub struct RandomizedSolver;

impl Solver for RandomizedSolver {
    fn solve(&self, input: &SolveInput<'_>, cancel: &dyn Fn() -> bool) -> Result<Matrix<u8>, SolveError> {
        let n_r = input.n_reviewers();
        let n_p = input.n_papers();

        let locked = locked_pairs(input.constraints);
        let mut forced = Matrix::filled(n_r, n_p, false);
        for &(ri, pi) in &locked {
            forced.set(ri, pi, true);
        }

        if cancel() {
            return Err(SolveError::Infeasible("cancelled".into()));
        }

        let mut vars = ProblemVariables::new();
        let mut x: Vec<Vec<Option<Variable>>> = vec![vec![None; n_p]; n_r];
        for ri in 0..n_r {
            for pi in 0..n_p {
                if *forced.get(ri, pi) {
                    continue;
                }
                if *input.constraints.get(pi, ri) == -1 {
                    continue;
                }
                let upper = input.probability_limit.clamp(0.0, 1.0);
                x[ri][pi] = Some(vars.add(variable().min(0.0).max(upper)));
            }
        }

        let xr = &x;
        let objective: Expression = (0..n_r)
            .flat_map(|ri| (0..n_p).filter_map(move |pi| xr[ri][pi].map(|v| (ri, pi, v))))
            .map(|(ri, pi, v)| v * *input.affinity.get(ri, pi))
            .sum();

        let mut problem = vars.maximise(objective).using(microlp);

        for pi in 0..n_p {
            let forced_count = (0..n_r).filter(|&ri| *forced.get(ri, pi)).count() as f64;
            let free: Expression = (0..n_r).filter_map(|ri| x[ri][pi].map(|v| v.into())).sum();
            let target = input.demand[pi] as f64 - forced_count;
            problem = problem.with(constraint!(free == target));
        }
        for ri in 0..n_r {
            let forced_count = (0..n_p).filter(|&pi| *forced.get(ri, pi)).count() as f64;
            let free: Expression = (0..n_p).filter_map(|pi| x[ri][pi].map(|v| v.into())).sum();
            let max_remaining = (input.maximum[ri] as f64 - forced_count).max(0.0);
            let min_remaining = (input.minimum[ri] as f64 - forced_count).max(0.0);
            problem = problem.with(constraint!(free.clone() <= max_remaining));
            problem = problem.with(constraint!(free >= min_remaining));
        }

        if cancel() {
            return Err(SolveError::Infeasible("cancelled".into()));
        }

        let solution = problem
            .solve()
            .map_err(|e| SolveError::Infeasible(format!("LP relaxation has no feasible point: {e}")))?;

        let mut fractional = Matrix::filled(n_r, n_p, 0.0_f64);
        for ri in 0..n_r {
            for pi in 0..n_p {
                if let Some(v) = x[ri][pi] {
                    fractional.set(ri, pi, solution.value(v).clamp(0.0, 1.0));
                }
            }
        }

        let mut rng = match_rng_from_seed(input.rng_seed);
        let mut assignment = Matrix::filled(n_r, n_p, 0u8);
        for &(ri, pi) in &locked {
            assignment.set(ri, pi, 1);
        }

        for pi in 0..n_p {
            let mut pending: Vec<(usize, f64)> =
                (0..n_r).map(|ri| (ri, *fractional.get(ri, pi))).filter(|&(_, p)| p > 0.0).collect();
            round_single_constraint(&mut pending, &mut rng);
            for (ri, p) in pending {
                if p >= 0.5 {
                    assignment.set(ri, pi, 1);
                }
            }
        }

        repair_reviewer_capacity(&mut assignment, input, &forced)?;

        Ok(assignment)
    }
}

/// Pivotal (Madow) dependent rounding of a single degree constraint:
/// `pending` holds `(index, fractional_probability)` pairs whose
/// probabilities sum to an integer. Repeatedly resolves two
/// still-fractional entries at a time so that each `index`'s marginal
/// probability of ending at 1 equals its starting fractional value, and
/// the sum across all entries is preserved exactly at every step.
fn round_single_constraint(pending: &mut [(usize, f64)], rng: &mut pm_core::rng::MatchRng) {
    loop {
        let fractional: Vec<usize> = (0..pending.len()).filter(|&i| pending[i].1 > 1e-9 && pending[i].1 < 1.0 - 1e-9).collect();
        if fractional.len() < 2 {
            break;
        }
        let a = fractional[0];
        let b = fractional[1];
        let (pa, pb) = (pending[a].1, pending[b].1);
        let sum = pa + pb;
        if sum < 1.0 {
            if rng.sample_bernoulli(pa / sum) {
                pending[a].1 = sum;
                pending[b].1 = 0.0;
            } else {
                pending[a].1 = 0.0;
                pending[b].1 = sum;
            }
        } else {
            let raise_a_prob = (1.0 - pb) / (2.0 - sum);
            if rng.sample_bernoulli(raise_a_prob) {
                pending[a].1 = 1.0;
                pending[b].1 = sum - 1.0;
            } else {
                pending[b].1 = 1.0;
                pending[a].1 = sum - 1.0;
            }
        }
    }
    for entry in pending.iter_mut() {
        if entry.1 >= 0.5 {
            entry.1 = 1.0;
        } else {
            entry.1 = 0.0;
        }
    }
}

fn reviewer_load(assignment: &Matrix<u8>, ri: usize, n_p: usize) -> u32 {
    (0..n_p).map(|pi| *assignment.get(ri, pi) as u32).sum()
}

/// The per-paper rounding above preserves each paper's demand exactly
/// but only preserves reviewer load constraints in expectation. This
/// pass repairs both directions: a reviewer over `maximum[r]` gives up
/// its lowest-affinity non-locked paper to the next best eligible
/// reviewer with spare capacity, then a reviewer still under
/// `minimum[r]` claims a paper from a non-locked reviewer on that paper
/// who has room to spare above their own minimum. Leaves the assignment
/// untouched when no repair is needed, which is the common case, and
/// reports infeasibility when the bounds genuinely cannot be met.
fn repair_reviewer_capacity(
    assignment: &mut Matrix<u8>,
    input: &SolveInput<'_>,
    forced: &Matrix<bool>,
) -> Result<(), SolveError> {
    let n_r = input.n_reviewers();
    let n_p = input.n_papers();

    loop {
        let mut moved = false;
        for ri in 0..n_r {
            if reviewer_load(assignment, ri, n_p) <= input.maximum[ri] {
                continue;
            }
            let worst = (0..n_p)
                .filter(|&pi| *assignment.get(ri, pi) == 1 && !*forced.get(ri, pi))
                .min_by(|&a, &b| input.affinity.get(ri, a).partial_cmp(input.affinity.get(ri, b)).unwrap_or(std::cmp::Ordering::Equal));
            let Some(pi) = worst else { continue };

            let replacement = (0..n_r)
                .filter(|&r2| r2 != ri)
                .filter(|&r2| *assignment.get(r2, pi) == 0)
                .filter(|&r2| *input.constraints.get(pi, r2) != -1)
                .filter(|&r2| reviewer_load(assignment, r2, n_p) < input.maximum[r2])
                .max_by(|&a, &b| input.affinity.get(a, pi).partial_cmp(input.affinity.get(b, pi)).unwrap_or(std::cmp::Ordering::Equal));

            if let Some(r2) = replacement {
                assignment.set(ri, pi, 0);
                assignment.set(r2, pi, 1);
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    loop {
        let mut moved = false;
        for ri in 0..n_r {
            if reviewer_load(assignment, ri, n_p) >= input.minimum[ri] {
                continue;
            }
            let donor = (0..n_p)
                .filter(|&pi| *assignment.get(ri, pi) == 0)
                .filter(|&pi| *input.constraints.get(pi, ri) != -1)
                .filter_map(|pi| {
                    (0..n_r)
                        .filter(|&r2| r2 != ri)
                        .filter(|&r2| *assignment.get(r2, pi) == 1 && !*forced.get(r2, pi))
                        .filter(|&r2| reviewer_load(assignment, r2, n_p) > input.minimum[r2])
                        .max_by(|&a, &b| input.affinity.get(a, pi).partial_cmp(input.affinity.get(b, pi)).unwrap_or(std::cmp::Ordering::Equal))
                        .map(|r2| (pi, r2))
                })
                .max_by(|&(pa, _), &(pb, _)| input.affinity.get(ri, pa).partial_cmp(input.affinity.get(ri, pb)).unwrap_or(std::cmp::Ordering::Equal));

            if let Some((pi, r2)) = donor {
                assignment.set(r2, pi, 0);
                assignment.set(ri, pi, 1);
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    for ri in 0..n_r {
        let load = reviewer_load(assignment, ri, n_p);
        if load < input.minimum[ri] || load > input.maximum[ri] {
            return Err(SolveError::Infeasible(format!(
                "reviewer {ri} load {load} falls outside [{}, {}] after rounding repair",
                input.minimum[ri], input.maximum[ri]
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_an_exact_paper_demand() {
        let mut pending = vec![(0usize, 0.4), (1, 0.3), (2, 0.3)];
        let mut rng = match_rng_from_seed(7);
        round_single_constraint(&mut pending, &mut rng);
        let total: f64 = pending.iter().map(|&(_, p)| p).sum();
        assert_eq!(total, 1.0);
        assert!(pending.iter().all(|&(_, p)| p == 0.0 || p == 1.0));
    }

    #[test]
    fn solves_a_small_instance() {
        let n_r = 2;
        let n_p = 2;
        let mut affinity = Matrix::filled(n_r, n_p, 0.0);
        affinity.set(0, 0, 0.9);
        affinity.set(1, 0, 0.1);
        affinity.set(0, 1, 0.1);
        affinity.set(1, 1, 0.9);
        let cost = Matrix::filled(n_r, n_p, 0i64);
        let constraints = Matrix::filled(n_p, n_r, 0i8);
        let input = SolveInput {
            affinity: &affinity,
            cost: &cost,
            constraints: &constraints,
            minimum: &[0, 0],
            maximum: &[1, 1],
            demand: &[1, 1],
            probability_limit: 1.0,
            rng_seed: 42,
        };
        let out = RandomizedSolver.solve(&input, &|| false).unwrap();
        for pi in 0..n_p {
            let count: u8 = (0..n_r).map(|ri| *out.get(ri, pi)).sum();
            assert_eq!(count, 1);
        }
    }
}
