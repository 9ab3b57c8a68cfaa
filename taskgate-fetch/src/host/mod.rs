//! Host APIs for `TaskGate` provider calls.
//!
//! - [`transport`] - The [`Transport`] seam and its request/response types
//! - [`http`] - `reqwest`-backed transport with credential handling

pub mod http;
pub mod transport;

// Re-export key types
pub use http::{Credentials, HttpTransport};
pub use transport::{ApiRequest, ApiResponse, Transport};
