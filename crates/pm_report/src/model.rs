//! `ReportModel`: the one pure, already-computed shape both renderers
//! consume. Built once from a finished [`pm_pipeline::RunRecord`] plus
//! the `Configuration` it ran against — never from raw solver state, so
//! a renderer never has to re-derive anything (spec §9's "pure, offline
//! rendering" counterpart to `vm_report::model::ReportModel`).

use pm_core::ids::{PaperId, ReviewerId};
use pm_io::config::{Configuration, ObjectiveType};
use pm_pipeline::RunRecord;

/// One paper's row in the report: its assigned reviewers (ranked by
/// score) and its ranked alternates.
#[derive(Clone, Debug)]
pub struct PaperRow {
    pub paper: PaperId,
    pub assigned: Vec<(ReviewerId, f64)>,
    pub alternates: Vec<(ReviewerId, f64)>,
}

/// Cover block: identifies the configuration the run belongs to.
#[derive(Clone, Debug)]
pub struct CoverBlock {
    pub title: String,
    pub match_group: String,
    pub objective_type: ObjectiveType,
    pub config_id: String,
    pub seed: u64,
}

/// Summary counters derived once, never recomputed by a renderer.
#[derive(Clone, Debug)]
pub struct SummaryBlock {
    pub paper_count: usize,
    pub reviewer_count: usize,
    pub total_assignments: usize,
    pub constraint_warning_count: usize,
}

#[derive(Clone, Debug)]
pub struct ReportModel {
    pub cover: CoverBlock,
    pub summary: SummaryBlock,
    pub papers: Vec<PaperRow>,
    pub constraint_warnings: Vec<(PaperId, ReviewerId)>,
}

/// Build the report model from a finished run's `RunRecord` plus the
/// `Configuration` it was produced from. Pure: no filesystem access, no
/// knowledge of JSON or HTML.
pub fn build_model(config: &Configuration, record: &RunRecord) -> ReportModel {
    let papers: Vec<PaperRow> = record
        .assignments
        .iter()
        .map(|a| PaperRow {
            paper: a.paper.clone(),
            assigned: a.assigned.clone(),
            alternates: a.alternates.clone(),
        })
        .collect();

    let reviewer_count = {
        let mut seen: Vec<&ReviewerId> = Vec::new();
        for row in &papers {
            for (rid, _) in row.assigned.iter().chain(row.alternates.iter()) {
                if !seen.contains(&rid) {
                    seen.push(rid);
                }
            }
        }
        seen.len()
    };

    let total_assignments: usize = papers.iter().map(|p| p.assigned.len()).sum();

    ReportModel {
        cover: CoverBlock {
            title: config.title.clone(),
            match_group: config.match_group.clone(),
            objective_type: record.objective_type,
            config_id: record.config_id.clone(),
            seed: record.seed,
        },
        summary: SummaryBlock {
            paper_count: papers.len(),
            reviewer_count,
            total_assignments,
            constraint_warning_count: record.constraint_warnings.len(),
        },
        papers,
        constraint_warnings: record.constraint_warnings.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_core::status::Status;
    use pm_pipeline::AssignmentOutput;
    use std::collections::BTreeMap;

    fn config() -> Configuration {
        Configuration {
            title: "Workshop 2026".into(),
            match_group: "g".into(),
            paper_invitation: "p".into(),
            min_papers: 0,
            max_papers: 2,
            user_demand: 1,
            alternates: 1,
            allow_zero_score_assignments: true,
            randomized_probability_limits: 0.5,
            objective_type: ObjectiveType::MinMax,
            scores_specification: BTreeMap::new(),
            conflicts_invitation: None,
            vetoes_invitation: None,
            locks_invitation: None,
            custom_max_papers_invitation: None,
            custom_user_demand_invitation: None,
            assignment_invitation: "a".into(),
            aggregate_score_invitation: "s".into(),
        }
    }

    #[test]
    fn counts_distinct_reviewers_once() {
        let record = RunRecord {
            config_id: "abc123".into(),
            objective_type: ObjectiveType::MinMax,
            seed: 7,
            status: Status::Complete,
            assignments: vec![AssignmentOutput {
                paper: PaperId::from("p1"),
                assigned: vec![(ReviewerId::from("r1"), 0.9)],
                alternates: vec![(ReviewerId::from("r2"), 0.2), (ReviewerId::from("r1"), 0.9)],
            }],
            constraint_warnings: vec![],
        };
        let model = build_model(&config(), &record);
        assert_eq!(model.summary.reviewer_count, 2);
        assert_eq!(model.summary.total_assignments, 1);
    }
}
