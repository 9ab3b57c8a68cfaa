//! Domain models for `TaskGate`.
//!
//! ## Submodules
//!
//! - [`board`] - Records read from and written to the provider
//! - [`intent`] - The caller-supplied write request
//! - [`snapshot`] - Cached reference data

mod board;
mod intent;
mod snapshot;

// Re-export everything at the models level
pub use board::{Board, BoardList, Card, Checklist, Label, Member, SearchResults};
pub use intent::{Destination, WriteIntent};
pub use snapshot::{EntityKind, Snapshot, SnapshotKey, SnapshotPayload};
