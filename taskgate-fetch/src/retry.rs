//! Retry policy for rate-limited requests.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff for HTTP 429 rejections.
///
/// Only rate-limit rejections are retried. Every attempt is admitted through
/// the rate limiter again, so retries spend bucket tokens like any other call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryStrategy {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds. Doubles each time.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on a single delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl RetryStrategy {
    /// Creates a strategy with the given attempt budget and default delays.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Delay after the zero-based `attempt` failed: `base * 2^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Returns true if another attempt follows the zero-based `attempt`.
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let strategy = RetryStrategy::default();

        assert_eq!(strategy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_max_delay_cap() {
        let strategy = RetryStrategy::new(10).with_base_delay(Duration::from_secs(10));

        // Should be capped at 30 seconds
        assert_eq!(strategy.delay_for_attempt(5), Duration::from_secs(30));
    }

    #[test]
    fn test_attempt_budget() {
        let strategy = RetryStrategy::default();
        assert!(strategy.has_attempt_after(0));
        assert!(strategy.has_attempt_after(1));
        assert!(!strategy.has_attempt_after(2));

        assert!(!RetryStrategy::no_retry().has_attempt_after(0));
        assert_eq!(RetryStrategy::new(0).max_attempts, 1);
    }
}
