//! MinMax solver (spec §4.3): a single min-cost-flow call.

use crate::solver::mcf::{solve_lower_bounded, BoundedEdge};
use crate::solver::{locked_pairs, SolveError, SolveInput, Solver};
use crate::types::Matrix;

pub struct MinMaxSolver;

impl Solver for MinMaxSolver {
    fn solve(&self, input: &SolveInput<'_>, cancel: &dyn Fn() -> bool) -> Result<Matrix<u8>, SolveError> {
        let n_r = input.n_reviewers();
        let n_p = input.n_papers();
        let mut assignment = Matrix::filled(n_r, n_p, 0u8);

        let mut remaining_min = input.minimum.to_vec();
        let mut remaining_max = input.maximum.to_vec();
        let mut remaining_demand = input.demand.to_vec();

        for (ri, pi) in locked_pairs(input.constraints) {
            assignment.set(ri, pi, 1);
            remaining_max[ri] = remaining_max[ri].saturating_sub(1);
            remaining_min[ri] = remaining_min[ri].saturating_sub(1);
            remaining_demand[pi] = remaining_demand[pi].saturating_sub(1);
        }

        if cancel() {
            return Err(SolveError::Infeasible("cancelled".into()));
        }

        // Node layout: 0 = source, [1, n_r] reviewers, [n_r+1, n_r+n_p] papers, sink.
        let source = 0usize;
        let sink = n_r + n_p + 1;
        let reviewer_node = |ri: usize| ri + 1;
        let paper_node = |pi: usize| n_r + 1 + pi;

        let mut edges = Vec::with_capacity(n_r + n_p + n_r * n_p);
        let mut pair_of_edge: Vec<Option<(usize, usize)>> = Vec::with_capacity(edges.capacity());

        for ri in 0..n_r {
            edges.push(BoundedEdge {
                from: source,
                to: reviewer_node(ri),
                lower: remaining_min[ri] as i64,
                upper: remaining_max[ri] as i64,
                cost: 0,
            });
            pair_of_edge.push(None);
        }
        for pi in 0..n_p {
            edges.push(BoundedEdge {
                from: paper_node(pi),
                to: sink,
                lower: remaining_demand[pi] as i64,
                upper: remaining_demand[pi] as i64,
                cost: 0,
            });
            pair_of_edge.push(None);
        }
        for ri in 0..n_r {
            for pi in 0..n_p {
                if *assignment.get(ri, pi) == 1 {
                    continue; // already satisfied by a lock
                }
                if *input.constraints.get(pi, ri) == -1 {
                    continue; // forbidden
                }
                edges.push(BoundedEdge {
                    from: reviewer_node(ri),
                    to: paper_node(pi),
                    lower: 0,
                    upper: 1,
                    cost: *input.cost.get(ri, pi),
                });
                pair_of_edge.push(Some((ri, pi)));
            }
        }

        let n_nodes = n_r + n_p + 2;
        let result = solve_lower_bounded(n_nodes, source, sink, &edges)
            .ok_or_else(|| SolveError::Infeasible("min-cost flow could not route full demand".into()))?;

        for (flow, pair) in result.flows.iter().zip(pair_of_edge.iter()) {
            if let Some((ri, pi)) = pair {
                if *flow == 1 {
                    assignment.set(*ri, *pi, 1);
                }
            }
        }

        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost_matrix(rows: usize, cols: usize, values: &[i64]) -> Matrix<i64> {
        let mut m = Matrix::filled(rows, cols, 0i64);
        for r in 0..rows {
            for c in 0..cols {
                m.set(r, c, values[r * cols + c]);
            }
        }
        m
    }

    #[test]
    fn assigns_exact_demand_respecting_capacity() {
        // 2 reviewers, 2 papers, demand 1 each, max 1 each.
        let affinity = Matrix::filled(2, 2, 0.0);
        let cost = cost_matrix(2, 2, &[1, 2, 2, 1]);
        let constraints = Matrix::filled(2, 2, 0i8);
        let input = SolveInput {
            affinity: &affinity,
            cost: &cost,
            constraints: &constraints,
            minimum: &[0, 0],
            maximum: &[1, 1],
            demand: &[1, 1],
            probability_limit: 1.0,
            rng_seed: 0,
        };
        let out = MinMaxSolver.solve(&input, &|| false).unwrap();
        // optimal: r0->p0 (cost1), r1->p1(cost1) total 2, beats the cross pairing (4)
        assert_eq!(*out.get(0, 0), 1);
        assert_eq!(*out.get(1, 1), 1);
        assert_eq!(*out.get(0, 1), 0);
        assert_eq!(*out.get(1, 0), 0);
    }

    #[test]
    fn reports_infeasible_when_demand_exceeds_capacity() {
        let affinity = Matrix::filled(1, 1, 0.0);
        let cost = cost_matrix(1, 1, &[0]);
        let constraints = Matrix::filled(1, 1, 0i8);
        let input = SolveInput {
            affinity: &affinity,
            cost: &cost,
            constraints: &constraints,
            minimum: &[0],
            maximum: &[0],
            demand: &[1],
            probability_limit: 1.0,
            rng_seed: 0,
        };
        assert!(MinMaxSolver.solve(&input, &|| false).is_err());
    }
}
