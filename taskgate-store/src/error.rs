//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

impl StoreError {
    /// Returns true if this error is fixed by editing configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::Config(_) | StoreError::MissingCredential(_) | StoreError::Serialization(_)
        )
    }
}
