//! JSON report rendering: cover -> summary -> papers -> constraint
//! warnings, in that fixed order, grounded on `vm_report::render_json`'s
//! deterministic `serde_json::Map` insertion-order discipline (built
//! with `serde_json`'s `preserve_order` feature so insertion order
//! survives to the emitted bytes).

use serde_json::{Map as JsonMap, Value};

use crate::model::ReportModel;

pub fn render_json(model: &ReportModel) -> Value {
    let mut root = obj();
    root.insert("cover".into(), cover_json(model));
    root.insert("summary".into(), summary_json(model));
    root.insert("papers".into(), Value::Array(model.papers.iter().map(paper_json).collect()));
    root.insert(
        "constraint_warnings".into(),
        Value::Array(model.constraint_warnings.iter().map(|(p, r)| warning_json(p, r)).collect()),
    );
    Value::Object(root)
}

fn cover_json(model: &ReportModel) -> Value {
    let mut o = obj();
    o.insert("title".into(), Value::String(model.cover.title.clone()));
    o.insert("match_group".into(), Value::String(model.cover.match_group.clone()));
    o.insert(
        "objective_type".into(),
        Value::String(format!("{:?}", model.cover.objective_type)),
    );
    o.insert("config_id".into(), Value::String(model.cover.config_id.clone()));
    o.insert("seed".into(), Value::Number(model.cover.seed.into()));
    Value::Object(o)
}

fn summary_json(model: &ReportModel) -> Value {
    let mut o = obj();
    o.insert("paper_count".into(), Value::Number(model.summary.paper_count.into()));
    o.insert("reviewer_count".into(), Value::Number(model.summary.reviewer_count.into()));
    o.insert("total_assignments".into(), Value::Number(model.summary.total_assignments.into()));
    o.insert(
        "constraint_warning_count".into(),
        Value::Number(model.summary.constraint_warning_count.into()),
    );
    Value::Object(o)
}

fn paper_json(row: &crate::model::PaperRow) -> Value {
    let mut o = obj();
    o.insert("paper".into(), Value::String(row.paper.to_string()));
    o.insert("assigned".into(), Value::Array(row.assigned.iter().map(assigned_json).collect()));
    o.insert("alternates".into(), Value::Array(row.alternates.iter().map(assigned_json).collect()));
    Value::Object(o)
}

fn assigned_json(entry: &(pm_core::ids::ReviewerId, f64)) -> Value {
    let mut o = obj();
    o.insert("reviewer".into(), Value::String(entry.0.to_string()));
    o.insert(
        "score".into(),
        serde_json::Number::from_f64(entry.1).map(Value::Number).unwrap_or(Value::Null),
    );
    Value::Object(o)
}

fn warning_json(paper: &pm_core::ids::PaperId, reviewer: &pm_core::ids::ReviewerId) -> Value {
    let mut o = obj();
    o.insert("paper".into(), Value::String(paper.to_string()));
    o.insert("reviewer".into(), Value::String(reviewer.to_string()));
    Value::Object(o)
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoverBlock, PaperRow, ReportModel, SummaryBlock};
    use pm_core::ids::{PaperId, ReviewerId};
    use pm_io::config::ObjectiveType;

    #[test]
    fn top_level_keys_are_in_fixed_order() {
        let model = ReportModel {
            cover: CoverBlock {
                title: "t".into(),
                match_group: "g".into(),
                objective_type: ObjectiveType::MinMax,
                config_id: "abc".into(),
                seed: 0,
            },
            summary: SummaryBlock { paper_count: 1, reviewer_count: 1, total_assignments: 1, constraint_warning_count: 0 },
            papers: vec![PaperRow {
                paper: PaperId::from("p1"),
                assigned: vec![(ReviewerId::from("r1"), 0.9)],
                alternates: vec![],
            }],
            constraint_warnings: vec![],
        };
        let json = render_json(&model);
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["cover", "summary", "papers", "constraint_warnings"]);
    }
}
