//! End-to-end scenarios straight off the testable-properties list:
//! solve, load bounds, locks, vetoes, conflicts, and the supply/demand
//! configuration error. Each test builds a `LoadedInputs` by hand (the
//! same shape `pm_io::loader::load_inputs` produces from files) and
//! drives it through `pm_pipeline::run_match`.

use std::collections::BTreeMap;

use pm_core::ids::{PaperId, ReviewerId};
use pm_core::status::Status;
use pm_io::config::{Configuration, ObjectiveType, ScoreSpec};
use pm_io::edge::EdgeRecord;
use pm_io::loader::LoadedInputs;
use pm_pipeline::run::{run_match, RunOptions};
use pm_pipeline::status_channel::{NullSink, StatusRegistry};
use pm_pipeline::EngineError;

fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn base_config(max_papers: u32, user_demand: u32, objective_type: ObjectiveType) -> Configuration {
    let mut scores_specification = BTreeMap::new();
    scores_specification.insert(
        "affinity".to_string(),
        ScoreSpec { weight: 1.0, default: Some(0.1), normalize: None, translate_map: None },
    );
    Configuration {
        title: "scenario".into(),
        match_group: "g".into(),
        paper_invitation: "p".into(),
        min_papers: 0,
        max_papers,
        user_demand,
        alternates: 0,
        allow_zero_score_assignments: true,
        randomized_probability_limits: 0.5,
        objective_type,
        scores_specification,
        conflicts_invitation: None,
        vetoes_invitation: None,
        locks_invitation: None,
        custom_max_papers_invitation: None,
        custom_user_demand_invitation: None,
        assignment_invitation: "a".into(),
        aggregate_score_invitation: "s".into(),
    }
}

/// A full bipartite score edge set with distinct, non-zero values so no
/// pair is ambiguous on affinity alone.
fn full_score_edges(papers: &[String], reviewers: &[String]) -> Vec<(String, Vec<EdgeRecord>)> {
    let mut edges = Vec::with_capacity(papers.len() * reviewers.len());
    for (pi, p) in papers.iter().enumerate() {
        for (ri, r) in reviewers.iter().enumerate() {
            let value = 0.1 + ((pi * 31 + ri * 7) % 97) as f64 / 200.0;
            edges.push(EdgeRecord { head: p.clone(), tail: r.clone(), weight: Some(value), label: None });
        }
    }
    vec![("affinity".to_string(), edges)]
}

fn run(inputs: &LoadedInputs, seed: u64) -> Result<pm_pipeline::run::MatchOutcome, EngineError> {
    let options = RunOptions { seed };
    let registry = StatusRegistry::new();
    let sink = NullSink;
    let cancel = || false;
    run_match(inputs, &options, &registry, &sink, &cancel)
}

#[test]
fn scenario_1_ten_papers_seven_reviewers_demand_one_max_two() {
    let papers = ids("p", 10);
    let reviewers = ids("r", 7);
    let score_edges = full_score_edges(&papers, &reviewers);

    for objective in [
        ObjectiveType::MinMax,
        ObjectiveType::FairFlow,
        ObjectiveType::FairSequence,
        ObjectiveType::Randomized,
    ] {
        let inputs = LoadedInputs {
            config: base_config(2, 1, objective),
            score_edges: score_edges.clone(),
            conflict_edges: vec![],
            veto_edges: vec![],
            lock_edges: vec![],
            custom_max_edges: vec![],
            custom_demand_edges: vec![],
            reviewers: reviewers.iter().map(|s| ReviewerId::from(s.as_str())).collect(),
            papers: papers.iter().map(|s| PaperId::from(s.as_str())).collect(),
        };

        let outcome = run(&inputs, 1).unwrap_or_else(|e| panic!("{objective:?} failed: {e}"));
        assert_eq!(outcome.decode.assignments.len(), 10);

        let mut per_reviewer = vec![0u32; reviewers.len()];
        for paper_assignment in &outcome.decode.assignments {
            for assigned in paper_assignment {
                let ri = reviewers.iter().position(|r| r.as_str() == assigned.reviewer.as_str()).unwrap();
                per_reviewer[ri] += 1;
            }
        }
        assert!(per_reviewer.iter().all(|&c| c <= 2), "{objective:?}: reviewer load exceeded max");
    }
}

#[test]
fn scenario_2_supply_below_demand_is_a_configuration_error() {
    let papers = ids("p", 10);
    let reviewers = ids("r", 7);
    let score_edges = full_score_edges(&papers, &reviewers);

    // max_papers=3 globally (21 supply), demand=2 per paper (20 total);
    // two reviewers get a custom-max override driving supply to 15 < 20.
    let custom_max_edges = vec![
        EdgeRecord { head: "g".into(), tail: "r0".into(), weight: Some(-99.0), label: None },
        EdgeRecord { head: "g".into(), tail: "r1".into(), weight: Some(-99.0), label: None },
    ];

    let inputs = LoadedInputs {
        config: base_config(3, 2, ObjectiveType::MinMax),
        score_edges,
        conflict_edges: vec![],
        veto_edges: vec![],
        lock_edges: vec![],
        custom_max_edges,
        custom_demand_edges: vec![],
        reviewers: reviewers.iter().map(|s| ReviewerId::from(s.as_str())).collect(),
        papers: papers.iter().map(|s| PaperId::from(s.as_str())).collect(),
    };

    let config_id = pm_io::canonical::identity_digest(&inputs.config).unwrap();
    let registry = StatusRegistry::new();
    let sink = NullSink;
    let cancel = || false;
    let options = RunOptions { seed: 1 };

    let err = run_match(&inputs, &options, &registry, &sink, &cancel)
        .expect_err("expected a supply/demand configuration error");
    assert!(matches!(err, EngineError::Quota(_)), "expected Quota error, got {err}");
    assert_eq!(registry.current(&config_id).unwrap().status, Status::Error);
}

#[test]
fn scenario_3_locks_are_always_honored() {
    let papers = ids("p", 6);
    let reviewers = ids("r", 7);
    let score_edges = full_score_edges(&papers, &reviewers);

    let lock_edges = vec![
        EdgeRecord { head: "p0".into(), tail: "r4".into(), weight: None, label: None },
        EdgeRecord { head: "p2".into(), tail: "r4".into(), weight: None, label: None },
        EdgeRecord { head: "p4".into(), tail: "r1".into(), weight: None, label: None },
        EdgeRecord { head: "p5".into(), tail: "r1".into(), weight: None, label: None },
    ];

    let inputs = LoadedInputs {
        config: base_config(4, 2, ObjectiveType::MinMax),
        score_edges,
        conflict_edges: vec![],
        veto_edges: vec![],
        lock_edges,
        custom_max_edges: vec![],
        custom_demand_edges: vec![],
        reviewers: reviewers.iter().map(|s| ReviewerId::from(s.as_str())).collect(),
        papers: papers.iter().map(|s| PaperId::from(s.as_str())).collect(),
    };

    let outcome = run(&inputs, 1).unwrap();
    let assigned = |paper: &str, reviewer: &str| {
        let pi = papers.iter().position(|p| p == paper).unwrap();
        outcome.decode.assignments[pi].iter().any(|a| a.reviewer.as_str() == reviewer)
    };
    assert!(assigned("p0", "r4"));
    assert!(assigned("p2", "r4"));
    assert!(assigned("p4", "r1"));
    assert!(assigned("p5", "r1"));
}

#[test]
fn scenario_4_vetoes_never_appear_in_the_assignment() {
    let papers = ids("p", 6);
    let reviewers = ids("r", 7);
    let score_edges = full_score_edges(&papers, &reviewers);

    let veto_edges = vec![
        EdgeRecord { head: "p0".into(), tail: "r1".into(), weight: None, label: None },
        EdgeRecord { head: "p0".into(), tail: "r2".into(), weight: None, label: None },
        EdgeRecord { head: "p1".into(), tail: "r1".into(), weight: None, label: None },
        EdgeRecord { head: "p1".into(), tail: "r2".into(), weight: None, label: None },
        EdgeRecord { head: "p2".into(), tail: "r1".into(), weight: None, label: None },
        EdgeRecord { head: "p2".into(), tail: "r2".into(), weight: None, label: None },
        EdgeRecord { head: "p2".into(), tail: "r3".into(), weight: None, label: None },
        EdgeRecord { head: "p3".into(), tail: "r5".into(), weight: None, label: None },
    ];

    let inputs = LoadedInputs {
        config: base_config(4, 2, ObjectiveType::MinMax),
        score_edges,
        conflict_edges: vec![],
        veto_edges: veto_edges.clone(),
        lock_edges: vec![],
        custom_max_edges: vec![],
        custom_demand_edges: vec![],
        reviewers: reviewers.iter().map(|s| ReviewerId::from(s.as_str())).collect(),
        papers: papers.iter().map(|s| PaperId::from(s.as_str())).collect(),
    };

    let outcome = run(&inputs, 1).unwrap();
    for veto in &veto_edges {
        let pi = papers.iter().position(|p| p == &veto.head).unwrap();
        assert!(
            !outcome.decode.assignments[pi].iter().any(|a| a.reviewer.as_str() == veto.tail),
            "vetoed pair {}/{} was assigned",
            veto.head,
            veto.tail
        );
    }
}

#[test]
fn scenario_5_conflicts_never_appear_in_the_assignment() {
    let papers = ids("p", 6);
    let reviewers = ids("r", 7);
    let score_edges = full_score_edges(&papers, &reviewers);

    let conflict_edges = vec![
        EdgeRecord { head: "p0".into(), tail: "r1".into(), weight: None, label: None },
        EdgeRecord { head: "p1".into(), tail: "r2".into(), weight: None, label: None },
        EdgeRecord { head: "p3".into(), tail: "r3".into(), weight: None, label: None },
    ];

    let inputs = LoadedInputs {
        config: base_config(3, 2, ObjectiveType::MinMax),
        score_edges,
        conflict_edges: conflict_edges.clone(),
        veto_edges: vec![],
        lock_edges: vec![],
        custom_max_edges: vec![],
        custom_demand_edges: vec![],
        reviewers: reviewers.iter().map(|s| ReviewerId::from(s.as_str())).collect(),
        papers: papers.iter().map(|s| PaperId::from(s.as_str())).collect(),
    };

    let outcome = run(&inputs, 1).unwrap();
    for conflict in &conflict_edges {
        let pi = papers.iter().position(|p| p == &conflict.head).unwrap();
        assert!(
            !outcome.decode.assignments[pi].iter().any(|a| a.reviewer.as_str() == conflict.tail),
            "conflicted pair {}/{} was assigned",
            conflict.head,
            conflict.tail
        );
    }
}
