//! CLI command implementations.

pub mod boards;
pub mod config;
pub mod create;
pub mod fingerprint;
pub mod lists;
