//! Error types for core lifecycle operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] idebox_config::ConfigError),

    #[error(transparent)]
    Provider(#[from] idebox_provider::ProviderError),

    #[error("Snapshot conflict: {0}")]
    SnapshotConflict(String),

    #[error("Lifecycle conflict: {0}")]
    LifecycleConflict(String),

    #[error("Unknown snapshot: {0}")]
    UnknownSnapshot(String),

    #[error("Invalid snapshot name '{0}': only letters, digits, '_', '.' and '-' are allowed, and the name may not start with '.' or '-'")]
    InvalidSnapshotName(String),

    #[error("Lineage store corrupted: {0}")]
    LineageCorrupted(String),

    #[error("Download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
