//! Checkpoint error types.

use thiserror::Error;

/// Errors raised while encoding, decoding or restoring a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Checkpoint binary encoding failed: {0}")]
    Binary(#[from] bincode::Error),

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The checkpoint was taken from a differently named machine
    #[error("Checkpoint belongs to machine '{found}', not '{expected}'")]
    MachineMismatch { expected: String, found: String },

    #[error("Checkpoint refers to unknown state '{0}'")]
    UnknownState(String),
}
