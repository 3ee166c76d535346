//! Time-expiring result cache for data source responses.
//!
//! Entries are keyed by query name plus the query's integer parameters and
//! hold an `Arc` snapshot of the fetched value. An entry is served while
//! `now - fetched_at < ttl`; otherwise the next lookup fetches again and
//! replaces it wholesale. Failed fetches are returned to the caller and never
//! stored.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Used to test expiry.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

// ---------------------------------------------------------------------------
// CacheKey / CacheEntry
// ---------------------------------------------------------------------------

/// Identity of a cached response: the logical query plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: &'static str,
    pub params: Vec<i64>,
}

impl CacheKey {
    pub fn new(query: &'static str, params: &[i64]) -> Self {
        Self {
            query,
            params: params.to_vec(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.query, params.join(", "))
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

// ---------------------------------------------------------------------------
// ResultCache
// ---------------------------------------------------------------------------

/// Memoizes fetch results per [`CacheKey`] with a time-to-live.
///
/// Safe to share between sessions: readers take a shared lock, and a refill
/// swaps the whole entry under the write lock. The fetch itself runs without
/// any lock held, so two concurrent misses on the same key may both fetch;
/// the last writer wins.
pub struct ResultCache<V> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V> ResultCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Return the cached value for `key`, or call `fetch` and cache its result.
    pub fn get_or_fetch<F>(&self, key: &CacheKey, ttl: Duration, fetch: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(hit) = self.get(key, ttl) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }

        debug!(key = %key, "cache miss");
        let value = Arc::new(fetch()?);
        self.entries.write().insert(
            key.clone(),
            CacheEntry {
                value: Arc::clone(&value),
                fetched_at: self.clock.now(),
            },
        );
        Ok(value)
    }

    /// Peek at a fresh entry without fetching.
    pub fn get(&self, key: &CacheKey, ttl: Duration) -> Option<Arc<V>> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| Arc::clone(&entry.value))
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop every entry older than `ttl`. Returns how many were removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, ttl));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
