//! Reference data cache.
//!
//! Holds board members, labels and lists so that resolving names does not
//! re-read them on every write. This cache provides:
//!
//! - **TTL expiration**: an entry is served for `ttl` after it was fetched,
//!   however often it is read in between
//! - **LRU eviction**: past `capacity` entries, the least recently used goes
//! - **Thread-safety**: a short `Mutex` section per operation, never held
//!   across a fetch
//!
//! Concurrent misses on the same key each fetch; the last write wins. The
//! entries are re-reads of provider state, so this only costs a request.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use taskgate_core::{Snapshot, SnapshotKey};
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default maximum number of snapshots.
pub const DEFAULT_CAPACITY: usize = 120;

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

// ============================================================================
// Configuration
// ============================================================================

/// Cache sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of snapshots.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Snapshot lifetime in seconds, counted from fetch time.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

impl CacheConfig {
    /// Returns the TTL.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Entries dropped because they outlived the TTL.
    pub expirations: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

// ============================================================================
// Reference Cache
// ============================================================================

struct CachedSnapshot {
    snapshot: Snapshot,
    cached_at: Instant,
}

/// Size-bounded, time-boxed cache of board reference data.
pub struct ReferenceCache {
    entries: Mutex<LruCache<SnapshotKey, CachedSnapshot>>,
    ttl: Duration,
    counters: Counters,
}

impl ReferenceCache {
    /// Creates a cache. A zero capacity is raised to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            counters: Counters::default(),
        }
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl())
    }

    /// Creates a cache holding 120 snapshots for 10 minutes each.
    pub fn with_default_config() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<SnapshotKey, CachedSnapshot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached snapshot if it is younger than the TTL.
    ///
    /// An expired entry is removed.
    pub fn get(&self, key: &SnapshotKey) -> Option<Snapshot> {
        let mut entries = self.lock();

        if let Some(cached) = entries.get(key) {
            if cached.cached_at.elapsed() < self.ttl {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Reference cache hit");
                return Some(cached.snapshot.clone());
            }
            entries.pop(key);
            self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Reference cache entry expired");
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Stores a snapshot under its own key, replacing any previous entry.
    pub fn insert(&self, snapshot: Snapshot) {
        let key = snapshot.key();
        let entry = CachedSnapshot {
            snapshot,
            cached_at: Instant::now(),
        };

        let evicted = self.lock().push(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(evicted = %evicted_key, "Reference cache full, evicted least recently used");
            }
        }
    }

    /// Returns the cached snapshot, or runs `fetch` and caches its result.
    ///
    /// The lock is not held while `fetch` runs.
    ///
    /// # Errors
    ///
    /// Returns the error of `fetch`; nothing is cached in that case.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: SnapshotKey, fetch: F) -> Result<Snapshot, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Snapshot, E>>,
    {
        if let Some(snapshot) = self.get(&key) {
            return Ok(snapshot);
        }

        debug!(key = %key, "Reference cache miss, fetching");
        let snapshot = fetch().await?;
        self.insert(snapshot.clone());
        Ok(snapshot)
    }

    /// Removes one entry.
    pub fn invalidate(&self, key: &SnapshotKey) {
        if self.lock().pop(key).is_some() {
            debug!(key = %key, "Invalidated reference cache entry");
        }
    }

    /// Removes every entry of one board.
    pub fn invalidate_scope(&self, scope_id: &str) {
        let mut entries = self.lock();
        let keys: Vec<SnapshotKey> = entries
            .iter()
            .filter(|(k, _)| k.scope_id == scope_id)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            entries.pop(key);
        }
        debug!(scope_id = %scope_id, removed = keys.len(), "Invalidated board reference data");
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a copy of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl std::fmt::Debug for ReferenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceCache")
            .field("len", &self.len())
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
