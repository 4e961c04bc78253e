//! Local edge-stream loading: the offline stand-in for the outer service's
//! bulk edge posting/retrieval (spec §6's Edge record, scoped down to a
//! single local JSON/JSONL file per source).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::IoError;
use crate::reject_remote_path;

/// `{head, tail, weight, label?}`. For score/conflict edges `head` is a
/// paper id and `tail` a reviewer id; for custom-load edges `head` is a
/// match-group id and `tail` a reviewer id; for custom-demand edges
/// `head` is a paper id and `tail` a match-group id (spec §6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub head: String,
    pub tail: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Read a local edge stream: either a single JSON array of records or
/// newline-delimited JSON objects (JSONL), detected from the first
/// non-whitespace byte.
pub fn load_edges(path: &Path) -> Result<Vec<EdgeRecord>, IoError> {
    reject_remote_path(path)?;
    let text = std::fs::read_to_string(path)?;
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        let edges: Vec<EdgeRecord> = serde_json::from_str(trimmed)?;
        Ok(edges)
    } else {
        let mut edges = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            edges.push(serde_json::from_str(line)?);
        }
        Ok(edges)
    }
}
