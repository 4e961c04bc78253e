//! pm_io — local-file configuration and edge-stream loading, canonical
//! JSON + SHA-256 identity digesting for the reviewer/paper assignment
//! engine.
//!
//! Non-goals stay out of this crate (HTTP, authentication, bulk edge
//! posting to a remote service): every loader here reads exactly one
//! local file and every path is checked to carry no URL scheme.

#![forbid(unsafe_code)]

use std::path::Path;

pub mod canonical;
pub mod config;
pub mod edge;
pub mod errors;
pub mod loader;

pub use errors::{IoError, IoResult};

/// Reject any path that looks like a URL (`scheme://...`) rather than a
/// local filesystem path, mirroring the teacher CLI's non-local-path
/// guard.
pub(crate) fn reject_remote_path(path: &Path) -> Result<(), IoError> {
    let s = path.to_string_lossy();
    if let Some(idx) = s.find("://") {
        if s[..idx].chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
            return Err(IoError::RemotePath(s.into_owned()));
        }
    }
    Ok(())
}
