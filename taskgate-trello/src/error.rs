//! Errors surfaced by the write path.

use taskgate_core::CoreError;
use taskgate_fetch::FetchError;
use taskgate_store::StoreError;
use thiserror::Error;

/// Terminal error of one create-task operation.
///
/// Decoration failures never appear here; they are reported on the
/// successful outcome instead.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The intent failed validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The intent names no board and no default board is configured.
    #[error("No board given and no default board configured")]
    NoBoard,

    /// The board has no list the card could go into.
    #[error("No destination list on board {board_id}")]
    NoDestination {
        /// Board that was searched.
        board_id: String,
    },

    /// The card create call failed.
    #[error("Card creation failed: {reason}")]
    CreateFailed {
        /// Human-readable reason.
        reason: String,
        /// Underlying call error.
        #[source]
        source: FetchError,
    },

    /// A read needed before creating the card failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl WriteError {
    /// Wraps a failed create call.
    pub fn create_failed(source: FetchError) -> Self {
        Self::CreateFailed {
            reason: source.to_string(),
            source,
        }
    }

    /// Returns true if repeating the whole operation later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::CreateFailed { source, .. } | Self::Fetch(source) => source.is_transient(),
            _ => false,
        }
    }
}

/// Error building a [`Gateway`](crate::Gateway).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration is incomplete or out of range.
    #[error(transparent)]
    Config(#[from] StoreError),

    /// The HTTP transport could not be built.
    #[error(transparent)]
    Transport(#[from] FetchError),
}
