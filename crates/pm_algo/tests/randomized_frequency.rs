//! Scenario 6: over many sampled runs of the Randomized solver, the
//! empirical frequency of any specific (reviewer, paper) pair never
//! exceeds `probability_limit` by more than a small slack.

#![cfg(feature = "randomized")]

use pm_algo::{Matrix, RandomizedSolver, SolveInput, Solver};

const SAMPLES: u64 = 1000;
const PROBABILITY_LIMIT: f64 = 0.5;
const EPSILON: f64 = 0.05;

#[test]
fn pair_frequency_never_exceeds_the_probability_limit() {
    let n_r = 4;
    let n_p = 1;

    let affinity = Matrix::filled(n_r, n_p, 1.0_f64);
    let cost = Matrix::filled(n_r, n_p, 0_i64);
    let constraints = Matrix::filled(n_p, n_r, 0_i8);
    let maximum = vec![1u32; n_r];
    let minimum = vec![0u32; n_r];
    let demand = vec![1u32];

    let mut assigned_count = vec![0u64; n_r];

    for seed in 0..SAMPLES {
        let input = SolveInput {
            affinity: &affinity,
            cost: &cost,
            constraints: &constraints,
            minimum: &minimum,
            maximum: &maximum,
            demand: &demand,
            probability_limit: PROBABILITY_LIMIT,
            rng_seed: seed,
        };
        let out = RandomizedSolver.solve(&input, &|| false).unwrap();

        let mut total = 0u8;
        for ri in 0..n_r {
            let v = *out.get(ri, 0);
            total += v;
            assigned_count[ri] += v as u64;
        }
        assert_eq!(total, 1, "paper demand must be met exactly every draw");
    }

    for (ri, &count) in assigned_count.iter().enumerate() {
        let freq = count as f64 / SAMPLES as f64;
        assert!(
            freq <= PROBABILITY_LIMIT + EPSILON,
            "reviewer {ri} assigned with frequency {freq}, exceeding {PROBABILITY_LIMIT} + {EPSILON}"
        );
    }
}
