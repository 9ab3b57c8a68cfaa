//! HTTP transport backed by `reqwest`.
//!
//! This module provides the production [`Transport`]:
//! - Credential query parameters (`key`, `token`) on every call
//! - JSON bodies for writes
//! - Request/response tracing without leaking credentials

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::FetchError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com";

/// User agent string for `TaskGate`.
const USER_AGENT: &str = concat!("TaskGate/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Credentials
// ============================================================================

/// API key and user token, sent as query parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    token: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }

    /// Returns the API key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true if either value is blank.
    pub fn is_incomplete(&self) -> bool {
        self.key.trim().is_empty() || self.token.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// Production transport talking to the provider over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    /// Creates a transport against the default base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self, FetchError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            credentials,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Creates a transport with a custom base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidResponse`] for an unparsable base URL and
    /// [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Url::parse(base_url)
            .map_err(|e| FetchError::InvalidResponse(format!("invalid base URL: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Builds the full URL including credentials and query parameters.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))
            .map_err(|e| FetchError::InvalidResponse(format!("invalid path {}: {e}", request.path)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("key", &self.credentials.key)
                .append_pair("token", &self.credentials.token);
            for (k, v) in &request.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        let url = self.url_for(request)?;
        debug!("Sending request");

        let mut builder = self.inner.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "Response received");

        Ok(ApiResponse::new(status, body))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::with_base_url(
            "https://api.trello.com/",
            Credentials::new("k", "t"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_url_carries_credentials_and_params() {
        let req = ApiRequest::get("/1/search").param("query", "\"Website Analizi\"");
        let url = transport().url_for(&req).unwrap();

        assert_eq!(url.path(), "/1/search");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("key".to_string(), "k".to_string()));
        assert_eq!(pairs[1], ("token".to_string(), "t".to_string()));
        assert_eq!(pairs[2].1, "\"Website Analizi\"");
    }

    #[test]
    fn test_base_url_prefix_is_kept() {
        let transport = HttpTransport::with_base_url(
            "http://localhost:8080/proxy",
            Credentials::new("k", "t"),
            Duration::from_secs(5),
        )
        .unwrap();
        let url = transport.url_for(&ApiRequest::post("/1/cards")).unwrap();
        assert_eq!(url.path(), "/proxy/1/cards");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpTransport::with_base_url(
            "not a url",
            Credentials::new("k", "t"),
            Duration::from_secs(5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new("secret-key", "secret-token");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("secret"));
        assert!(Credentials::new("k", " ").is_incomplete());
    }
}
