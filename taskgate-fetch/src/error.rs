//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for calls made through the request executor.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider kept answering 429 until retries ran out.
    #[error("Rate limited by provider after {attempts} attempts")]
    RateLimited {
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// The provider rejected the request with a non-2xx, non-429 status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider message, or the raw body when none was given.
        message: String,
    },

    /// Network-level failure (connect, TLS, reset, client timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The caller's deadline passed before the call completed.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// A 2xx response that could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The rate limiter was shut down while the call was waiting.
    #[error("Rate limiter shut down")]
    Shutdown,
}

impl FetchError {
    /// Creates an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Returns true if retrying the whole operation later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Transport(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status, if the provider answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::RateLimited { attempts: 3 }.is_transient());
        assert!(FetchError::Transport("reset".into()).is_transient());
        assert!(FetchError::api(503, "unavailable").is_transient());
        assert!(!FetchError::api(400, "invalid value for idList").is_transient());
        assert!(!FetchError::Shutdown.is_transient());
    }

    #[test]
    fn test_status_extraction() {
        assert_eq!(FetchError::api(404, "not found").status(), Some(404));
        assert_eq!(FetchError::RateLimited { attempts: 3 }.status(), Some(429));
        assert_eq!(FetchError::Transport("dns".into()).status(), None);
    }
}
