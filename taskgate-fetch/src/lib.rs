// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `TaskGate` Fetch
//!
//! Outbound call infrastructure for the `TaskGate` gateway.
//!
//! ## Host APIs
//!
//! The [`host`] module provides the network seam:
//!
//! - [`host::transport`] - [`Transport`] trait, [`ApiRequest`], [`ApiResponse`]
//! - [`host::http`] - `reqwest` transport with credential query parameters
//!
//! ## Call Pipeline
//!
//! - [`limiter::RateLimiter`] - Two independent quota buckets, FIFO admission
//! - [`retry::RetryStrategy`] - Exponential backoff for 429 answers
//! - [`executor::RequestExecutor`] - Limiter + retries around a transport
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskgate_fetch::{ApiRequest, Credentials, HttpTransport, RateLimiter, RequestExecutor};
//!
//! let transport = HttpTransport::new(Credentials::new(key, token))?;
//! let executor = RequestExecutor::new(Arc::new(transport), Arc::new(RateLimiter::default()));
//!
//! let lists = executor.execute(ApiRequest::get("/1/boards/abc/lists")).await?;
//! ```

// Core modules
pub mod error;
pub mod executor;
pub mod host;
pub mod limiter;
pub mod retry;

// Re-export key types at crate root

// Errors
pub use error::FetchError;

// Host APIs
pub use host::{
    http::{Credentials, DEFAULT_BASE_URL, HttpTransport},
    transport::{ApiRequest, ApiResponse, Transport},
};

// Call pipeline
pub use executor::RequestExecutor;
pub use limiter::{BucketConfig, LimitsConfig, RESTRICTED_PREFIX, RateBucket, RateLimiter};
pub use retry::RetryStrategy;

// Re-exported so callers can build requests without a direct reqwest dependency.
pub use reqwest::Method;
