// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TaskGate` Trello
//!
//! Trello-specific half of the `TaskGate` gateway.
//!
//! | Module | Role |
//! |--------|------|
//! | [`api`] | Typed endpoints over the rate-limited executor |
//! | [`metadata`] | Cached members, labels and lists per board |
//! | [`resolver`] | Fuzzy mapping of names to member, label and list IDs |
//! | [`dupe_guard`] | Near-duplicate search and idempotency fingerprints |
//! | [`orchestrator`] | The create-task state machine |
//! | [`gateway`] | Wires everything from a [`GatewayConfig`](taskgate_store::GatewayConfig) |
//!
//! ## Usage
//!
//! ```ignore
//! use taskgate_core::WriteIntent;
//! use taskgate_store::GatewayConfig;
//! use taskgate_trello::Gateway;
//!
//! let gateway = Gateway::new(&GatewayConfig::load()?)?;
//! let outcome = gateway
//!     .create_task(WriteIntent::new("Kampanya Planı").assign("ziya"))
//!     .await?;
//! println!("{} ({})", outcome.card.url, outcome.fingerprint);
//! ```

pub mod api;
pub mod dupe_guard;
pub mod error;
pub mod gateway;
pub mod metadata;
pub mod orchestrator;
pub mod resolver;

pub use api::{NewCard, TrelloApi};
pub use dupe_guard::{DuplicateGuard, compute_idempotency_fingerprint, normalize_title};
pub use error::{GatewayError, WriteError};
pub use gateway::Gateway;
pub use metadata::BoardMetadata;
pub use orchestrator::{LABEL_COLORS, TaskOutcome, TaskWriter, WriteStage};
pub use resolver::{AliasTable, CandidateMatch, EntityResolver, Resolution};
