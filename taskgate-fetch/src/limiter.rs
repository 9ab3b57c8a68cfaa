//! Two-bucket rate limiter for provider calls.
//!
//! Every outbound call is admitted through one of two independent buckets:
//!
//! - [`RateBucket::General`] - all routes except the member routes
//! - [`RateBucket::Restricted`] - routes under `/1/members`, which the
//!   provider meters far more strictly
//!
//! A bucket admits a call only when all three hold:
//!
//! - the reservoir has a token (refilled by `refill_amount` every
//!   `refill_interval`, never above `capacity`)
//! - fewer than `capacity` calls were dispatched in the trailing
//!   `refill_interval`
//! - at least `min_time` passed since the previous dispatch
//!
//! Waiting callers queue on a fair mutex, so admission within a bucket is
//! FIFO. Buckets never block each other. Dropping a waiting future leaves the
//! queue without spending a token.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use crate::error::FetchError;

/// Path prefix routed to the restricted bucket.
pub const RESTRICTED_PREFIX: &str = "/1/members";

// ============================================================================
// Rate Bucket
// ============================================================================

/// A route family with its own rate budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBucket {
    /// Everything not covered by a stricter bucket.
    General,
    /// Member routes (`/1/members...`).
    Restricted,
}

impl RateBucket {
    /// Selects the bucket for a request path.
    pub fn for_path(path: &str) -> Self {
        if path.starts_with(RESTRICTED_PREFIX) {
            Self::Restricted
        } else {
            Self::General
        }
    }

    /// Returns the bucket name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Restricted => "restricted",
        }
    }
}

impl fmt::Display for RateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Bucket Configuration
// ============================================================================

/// Quota settings for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Maximum tokens, and maximum dispatches per refill interval.
    pub capacity: u32,
    /// Tokens added at each refill.
    pub refill_amount: u32,
    /// Time between refills, in milliseconds.
    pub refill_interval_ms: u64,
    /// Minimum spacing between two dispatches, in milliseconds.
    pub min_time_ms: u64,
}

impl BucketConfig {
    /// General traffic: 90 calls per 10 seconds, 120ms apart.
    pub fn general() -> Self {
        Self {
            capacity: 90,
            refill_amount: 90,
            refill_interval_ms: 10_000,
            min_time_ms: 120,
        }
    }

    /// Member routes: 95 calls per 15 minutes, 9 seconds apart.
    pub fn restricted() -> Self {
        Self {
            capacity: 95,
            refill_amount: 95,
            refill_interval_ms: 900_000,
            min_time_ms: 9_000,
        }
    }

    /// Returns the refill interval.
    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }

    /// Returns the minimum dispatch spacing.
    pub fn min_time(&self) -> Duration {
        Duration::from_millis(self.min_time_ms)
    }

    /// Checks that the bucket can ever admit a call.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be positive".to_string());
        }
        if self.refill_amount == 0 {
            return Err("refill_amount must be positive".to_string());
        }
        if self.refill_interval_ms == 0 {
            return Err("refill_interval_ms must be positive".to_string());
        }
        Ok(())
    }
}

/// Settings for both buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// General bucket.
    #[serde(default = "BucketConfig::general")]
    pub general: BucketConfig,
    /// Restricted bucket.
    #[serde(default = "BucketConfig::restricted")]
    pub restricted: BucketConfig,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            general: BucketConfig::general(),
            restricted: BucketConfig::restricted(),
        }
    }
}

// ============================================================================
// Bucket State
// ============================================================================

struct BucketState {
    tokens: u32,
    next_refill: Instant,
    last_dispatch: Option<Instant>,
    /// Dispatch times inside the trailing refill interval, oldest first.
    dispatched: VecDeque<Instant>,
}

impl BucketState {
    fn new(config: &BucketConfig, now: Instant) -> Self {
        Self {
            tokens: config.capacity,
            next_refill: now + config.refill_interval(),
            last_dispatch: None,
            dispatched: VecDeque::with_capacity(config.capacity as usize),
        }
    }

    fn refill(&mut self, config: &BucketConfig, now: Instant) {
        if now < self.next_refill {
            return;
        }
        let interval = config.refill_interval();
        let interval_ns = interval.as_nanos().max(1);
        let periods = (now - self.next_refill).as_nanos() / interval_ns + 1;

        let refilled = u128::from(self.tokens) + u128::from(config.refill_amount) * periods;
        self.tokens = u32::try_from(refilled.min(u128::from(config.capacity)))
            .unwrap_or(config.capacity);

        let advance = u64::try_from(periods * interval_ns).unwrap_or(u64::MAX);
        self.next_refill = self
            .next_refill
            .checked_add(Duration::from_nanos(advance))
            .unwrap_or(now + interval);
    }

    fn prune(&mut self, config: &BucketConfig, now: Instant) {
        let window = config.refill_interval();
        while let Some(&oldest) = self.dispatched.front() {
            if oldest + window > now {
                break;
            }
            self.dispatched.pop_front();
        }
    }

    /// Returns when the next dispatch may happen, or `None` if it may happen now.
    fn ready_at(&self, config: &BucketConfig, now: Instant) -> Option<Instant> {
        let mut at = now;
        if self.tokens == 0 {
            at = at.max(self.next_refill);
        }
        if self.dispatched.len() >= config.capacity as usize {
            if let Some(&oldest) = self.dispatched.front() {
                at = at.max(oldest + config.refill_interval());
            }
        }
        if let Some(last) = self.last_dispatch {
            at = at.max(last + config.min_time());
        }
        (at > now).then_some(at)
    }

    fn dispatch(&mut self, now: Instant) {
        self.tokens = self.tokens.saturating_sub(1);
        self.last_dispatch = Some(now);
        self.dispatched.push_back(now);
    }
}

struct Bucket {
    kind: RateBucket,
    config: BucketConfig,
    state: Mutex<BucketState>,
}

impl Bucket {
    fn new(kind: RateBucket, config: BucketConfig, now: Instant) -> Self {
        let state = BucketState::new(&config, now);
        Self {
            kind,
            config,
            state: Mutex::new(state),
        }
    }
}

// ============================================================================
// Rate Limiter
// ============================================================================

/// Shared scheduler enforcing both provider quotas.
///
/// One instance is meant to be shared (behind an `Arc`) by every caller
/// talking to the same provider account.
pub struct RateLimiter {
    general: Bucket,
    restricted: Bucket,
    shutdown: watch::Sender<bool>,
}

impl RateLimiter {
    /// Creates a limiter with the given bucket settings.
    pub fn new(limits: LimitsConfig) -> Self {
        let now = Instant::now();
        let (shutdown, _) = watch::channel(false);
        Self {
            general: Bucket::new(RateBucket::General, limits.general, now),
            restricted: Bucket::new(RateBucket::Restricted, limits.restricted, now),
            shutdown,
        }
    }

    fn bucket(&self, kind: RateBucket) -> &Bucket {
        match kind {
            RateBucket::General => &self.general,
            RateBucket::Restricted => &self.restricted,
        }
    }

    /// Returns the settings of a bucket.
    pub fn config(&self, kind: RateBucket) -> &BucketConfig {
        &self.bucket(kind).config
    }

    /// Runs `task` once `bucket` admits it.
    ///
    /// The task is never dropped by the limiter itself; its output is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Shutdown`] if the limiter shuts down before
    /// admission. The task is not run in that case.
    pub async fn schedule<F, T>(&self, bucket: RateBucket, task: F) -> Result<T, FetchError>
    where
        F: Future<Output = T>,
    {
        self.admit(bucket).await?;
        Ok(task.await)
    }

    /// Waits until `kind` admits one dispatch and records it.
    async fn admit(&self, kind: RateBucket) -> Result<(), FetchError> {
        let bucket = self.bucket(kind);
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return Err(FetchError::Shutdown);
        }

        let mut state = tokio::select! {
            state = bucket.state.lock() => state,
            _ = shutdown.wait_for(|closed| *closed) => return Err(FetchError::Shutdown),
        };

        loop {
            if *shutdown.borrow() {
                return Err(FetchError::Shutdown);
            }

            let now = Instant::now();
            state.refill(&bucket.config, now);
            state.prune(&bucket.config, now);

            let Some(at) = state.ready_at(&bucket.config, now) else {
                state.dispatch(now);
                trace!(bucket = %bucket.kind, tokens = state.tokens, "Dispatch admitted");
                return Ok(());
            };

            debug!(
                bucket = %bucket.kind,
                wait_ms = u64::try_from((at - now).as_millis()).unwrap_or(u64::MAX),
                "Waiting for rate limit admission"
            );
            tokio::select! {
                () = sleep_until(at) => {}
                _ = shutdown.wait_for(|closed| *closed) => return Err(FetchError::Shutdown),
            }
        }
    }

    /// Releases every waiting caller with [`FetchError::Shutdown`].
    ///
    /// Calls that were already admitted keep running.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        debug!("Rate limiter shut down");
    }

    /// Returns true once [`shutdown`](Self::shutdown) was called.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("general", &self.general.config)
            .field("restricted", &self.restricted.config)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
