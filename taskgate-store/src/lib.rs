// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TaskGate` Store
//!
//! Local state for the `TaskGate` gateway.
//!
//! This crate provides:
//!
//! - **ReferenceCache**: LRU + TTL cache of board members, labels and lists
//! - **GatewayConfig**: JSON configuration with environment overrides
//!
//! ## Usage
//!
//! ```ignore
//! use taskgate_core::{EntityKind, SnapshotKey};
//! use taskgate_store::{GatewayConfig, ReferenceCache};
//!
//! let config = GatewayConfig::load()?;
//! let cache = ReferenceCache::from_config(&config.cache);
//!
//! let labels = cache
//!     .get_or_fetch(SnapshotKey::new(EntityKind::Labels, board_id), || fetch_labels(board_id))
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheConfig, CacheStats, DEFAULT_CAPACITY, DEFAULT_TTL, ReferenceCache};
pub use config::{
    ENV_API_KEY, ENV_BASE_URL, ENV_DEFAULT_BOARD, ENV_TOKEN, GatewayConfig, WriterConfig,
};
pub use error::StoreError;
