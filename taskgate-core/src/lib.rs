// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TaskGate` Core
//!
//! Core types and models for the `TaskGate` Trello gateway.
//!
//! This crate provides the value types passed between the gateway's
//! components. Nothing in here performs I/O.
//!
//! ## Key Types
//!
//! ### Board Records
//! - [`Board`] - A board the credentials can see
//! - [`BoardList`] - A list (card container) on a board
//! - [`Member`] - A board member
//! - [`Label`] - A board label
//! - [`Card`] - A card as returned by create and search calls
//!
//! ### Write Input
//! - [`WriteIntent`] - The record a caller wants created
//! - [`Destination`] - Target list by id or by name
//!
//! ### Reference Data
//! - [`EntityKind`] - Which reference collection a snapshot holds
//! - [`SnapshotKey`] - Cache key `(kind, board id)`
//! - [`Snapshot`] - Timestamped reference data for one board

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Board records
    Board,
    BoardList,
    Card,
    Checklist,
    Label,
    Member,
    SearchResults,
    // Write input
    Destination,
    WriteIntent,
    // Reference data
    EntityKind,
    Snapshot,
    SnapshotKey,
    SnapshotPayload,
};
