//! Freshness-keyed summary cache.
//!
//! [`SummaryCache`] maps a freshness key (see [`key`](super::key)) to a
//! [`CacheEntry`]. Entries expire lazily: a lookup at or past `expires_at`
//! reports a miss and drops the entry. When the cache is full, the entries
//! with the oldest `generated_at` are evicted to make room; this is
//! creation-order eviction, not LRU, since a summary is rarely read again
//! after its first serve.
//!
//! # Concurrency
//!
//! One mutex guards the map and its age index. `get` and `set` never
//! suspend, and expire-evict-insert runs as a single critical section, so
//! concurrent inserts cannot push the cache past `max_entries`. Two
//! concurrent misses on the same key may both generate a summary and both
//! `set`; the last writer wins. There is deliberately no request coalescing.
//!
//! # Shared backends
//!
//! The cache is in-memory and per-process. A shared backend (redis or
//! similar) would slot in behind the same `get`/`set` signature, since the
//! freshness key is already a plain string.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::key::build_key;
use crate::clock::{self, Clock, SystemClock};
use crate::telemetry;
use crate::types::SummaryData;

/// Configuration for the summary cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of live entries. Default: 1,000.
    pub max_entries: usize,
    /// Time-to-live for cached entries. Default: 24 hours.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A cached summary. Read-only once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub data: SummaryData,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Age ordering for eviction: creation time, then insertion sequence.
type AgeKey = (DateTime<Utc>, u64);

struct Slot {
    entry: CacheEntry,
    age: AgeKey,
}

#[derive(Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    by_age: BTreeMap<AgeKey, String>,
    next_seq: u64,
}

impl Inner {
    fn remove(&mut self, key: &str) -> Option<Slot> {
        let slot = self.slots.remove(key)?;
        self.by_age.remove(&slot.age);
        Some(slot)
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.entry.is_expired_at(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_age.pop_first()?;
        self.slots.remove(&key);
        Some(key)
    }
}

/// Bounded, TTL-based, in-memory summary cache.
///
/// Construct one per process and share it (`Arc<SummaryCache>`); there is no
/// global instance.
pub struct SummaryCache {
    inner: Mutex<Inner>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl SummaryCache {
    /// Create a cache reading wall-clock time.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up the summary for a thread at a freshness point.
    ///
    /// Returns `None` on a miss or when the entry has expired. Emits cache
    /// hit/miss metrics.
    pub fn get(&self, thread_id: &str, last_post_timestamp: &str) -> Option<CacheEntry> {
        let key = build_key(thread_id, last_post_timestamp);
        let now = self.clock.now();
        let mut inner = self.lock();

        let hit = match inner.slots.get(&key).map(|slot| slot.entry.clone()) {
            Some(entry) if entry.is_expired_at(now) => {
                inner.remove(&key);
                debug!(%key, "cache entry expired");
                None
            }
            other => other,
        };
        drop(inner);

        match hit {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                debug!(%key, "cache hit");
                Some(entry)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                debug!(%key, "cache miss");
                None
            }
        }
    }

    /// Store a summary for a thread at a freshness point.
    ///
    /// Replaces any entry already under that key. When inserting a new key
    /// into a full cache, expired entries are dropped first, then the oldest
    /// entries until there is room.
    pub fn set(&self, thread_id: &str, last_post_timestamp: &str, data: SummaryData) {
        if self.config.max_entries == 0 {
            return;
        }

        let key = build_key(thread_id, last_post_timestamp);
        let now = self.clock.now();
        let entry = CacheEntry {
            key: key.clone(),
            data,
            generated_at: now,
            expires_at: clock::add_saturating(now, self.config.ttl),
        };

        let mut inner = self.lock();
        let replaced = inner.remove(&key).is_some();

        let mut evicted = 0u64;
        if !replaced && inner.slots.len() >= self.config.max_entries {
            inner.purge_expired(now);
            while inner.slots.len() >= self.config.max_entries {
                match inner.evict_oldest() {
                    Some(old) => {
                        debug!(key = %old, "evicted oldest cache entry");
                        evicted += 1;
                    }
                    None => break,
                }
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        let age = (now, seq);
        inner.by_age.insert(age, key.clone());
        inner.slots.insert(key, Slot { entry, age });
        drop(inner);

        if evicted > 0 {
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(evicted);
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.lock().purge_expired(now);
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Number of entries held, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.slots.clear();
        inner.by_age.clear();
    }

    /// Spawn a background task that calls [`purge_expired`](Self::purge_expired)
    /// every `interval`.
    ///
    /// Expiry is already enforced on read; the sweep only reclaims memory
    /// held by keys nobody asks for anymore. The task stops once every other
    /// `Arc` to the cache has been dropped.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(cache) => {
                        cache.purge_expired();
                    }
                    None => break,
                }
            }
        })
    }
}
