//! Maps the closed `ObjectiveType` variant set (spec §9) onto a boxed
//! [`pm_algo::Solver`], mirroring the retrieved `matcher/match.py`'s
//! `Match._solver_class` dispatch table.

use pm_algo::{FairFlowSolver, FairSequenceSolver, MinMaxSolver, RandomizedSolver, Solver};
use pm_io::config::ObjectiveType;

pub fn build_solver(objective: ObjectiveType) -> Box<dyn Solver> {
    match objective {
        ObjectiveType::MinMax => Box::new(MinMaxSolver),
        ObjectiveType::FairFlow => Box::new(FairFlowSolver),
        ObjectiveType::FairSequence => Box::new(FairSequenceSolver),
        ObjectiveType::Randomized => Box::new(RandomizedSolver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_objective_type_has_a_solver() {
        for objective in [
            ObjectiveType::MinMax,
            ObjectiveType::FairFlow,
            ObjectiveType::FairSequence,
            ObjectiveType::Randomized,
        ] {
            let _solver = build_solver(objective);
        }
    }
}
