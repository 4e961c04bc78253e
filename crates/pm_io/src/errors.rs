//! Unified error type for local-file configuration and edge-stream loading.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed input: {0}")]
    Manifest(String),

    #[error("remote path rejected: {0} (only local files are accepted)")]
    RemotePath(String),
}

pub type IoResult<T> = Result<T, IoError>;
