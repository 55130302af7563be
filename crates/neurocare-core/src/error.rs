//! Error types for NeuroCare.

use thiserror::Error;

/// Core error type for all NeuroCare operations.
///
/// Tier failures never reach the user; they are logged and the cascade
/// moves on to the next tier.
#[derive(Error, Debug)]
pub enum NeuroCareError {
    #[error("No mood log ID available")]
    MissingMoodLog,

    #[error("{service} HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("{service} timed out after {after:?}")]
    Timeout {
        service: String,
        after: std::time::Duration,
    },

    #[error("{service} returned an empty reply")]
    EmptyReply { service: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NeuroCareError>;
