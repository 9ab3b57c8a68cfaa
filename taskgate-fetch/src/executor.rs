//! Rate-limited, retrying request executor.
//!
//! Every provider call goes through [`RequestExecutor::execute`]:
//!
//! 1. The bucket is picked from the request path.
//! 2. The call waits for admission by the shared [`RateLimiter`].
//! 3. A 429 answer is retried with exponential backoff, each attempt being
//!    admitted again. Anything else that is not 2xx fails immediately.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::host::transport::{ApiRequest, ApiResponse, Transport};
use crate::limiter::{RateBucket, RateLimiter};
use crate::retry::RetryStrategy;

/// Executes provider calls under the rate limiter with 429 retries.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    retry_strategy: RetryStrategy,
}

impl RequestExecutor {
    /// Creates an executor with the default retry strategy.
    pub fn new(transport: Arc<dyn Transport>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            transport,
            limiter,
            retry_strategy: RetryStrategy::default(),
        }
    }

    /// Sets the retry strategy for this executor.
    #[must_use]
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Returns the shared limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Returns the retry strategy.
    pub fn retry_strategy(&self) -> &RetryStrategy {
        &self.retry_strategy
    }

    /// Executes a request and returns the decoded JSON body.
    ///
    /// An empty 2xx body yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimited`] when every attempt was answered with 429
    /// - [`FetchError::Api`] for any other non-2xx status (not retried)
    /// - [`FetchError::Transport`] when no answer arrived (not retried)
    /// - [`FetchError::InvalidResponse`] for an undecodable 2xx body
    /// - [`FetchError::Shutdown`] if the limiter shut down while waiting
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, FetchError> {
        let bucket = RateBucket::for_path(&request.path);
        let mut attempt = 0;

        loop {
            debug!(attempt, bucket = %bucket, "Dispatching request");

            let response = self
                .limiter
                .schedule(bucket, self.transport.send(&request))
                .await??;

            if response.is_success() {
                return decode_body(&response);
            }

            if response.is_rate_limited() {
                if self.retry_strategy.has_attempt_after(attempt) {
                    let delay = self.retry_strategy.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Rate limited, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                warn!(attempts = attempt + 1, "Rate limited, retries exhausted");
                return Err(FetchError::RateLimited {
                    attempts: attempt + 1,
                });
            }

            let message = response.error_message();
            debug!(status = response.status, message = %message, "Request rejected");
            return Err(FetchError::Api {
                status: response.status,
                message,
            });
        }
    }

    /// Executes a request, giving up after `timeout`.
    ///
    /// On expiry the pending limiter wait, in-flight call or backoff sleep is
    /// dropped; no further attempt is made.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] on expiry, otherwise as
    /// [`execute`](Self::execute).
    pub async fn execute_with_timeout(
        &self,
        request: ApiRequest,
        timeout: Duration,
    ) -> Result<Value, FetchError> {
        tokio::time::timeout(timeout, self.execute(request))
            .await
            .map_err(|_| FetchError::Timeout(timeout))?
    }

    /// Executes a request and deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`FetchError::Json`] if the body
    /// does not match `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, FetchError> {
        let value = self.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("limiter", &self.limiter)
            .field("retry_strategy", &self.retry_strategy)
            .finish_non_exhaustive()
    }
}

fn decode_body(response: &ApiResponse) -> Result<Value, FetchError> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body)
        .map_err(|e| FetchError::InvalidResponse(format!("JSON error: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
