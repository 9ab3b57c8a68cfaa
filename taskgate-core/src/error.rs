//! Core error types for `TaskGate`.

use thiserror::Error;

/// Core error type for `TaskGate` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The write intent cannot be used as given.
    #[error("Invalid write intent: {0}")]
    InvalidIntent(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
