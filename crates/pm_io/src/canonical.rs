//! Canonical JSON bytes + SHA-256 digesting, used to compute the
//! configuration identity that keys the status registry.
//!
//! Objects: keys sorted lexicographically. Arrays: order preserved (callers
//! are responsible for stable ordering upstream). Output is compact JSON
//! with no trailing newline.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::IoError;

fn sort_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_value(v))).collect();
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

/// Serialize `value` to canonical (key-sorted, compact) JSON bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, IoError> {
    let raw = serde_json::to_value(value)?;
    let canon = sort_value(raw);
    Ok(serde_json::to_vec(&canon)?)
}

/// Lowercase 64-hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest a serializable value directly to its SHA-256 hex, used as the
/// configuration identity key for the status registry (spec §5/§7).
pub fn identity_digest<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}
