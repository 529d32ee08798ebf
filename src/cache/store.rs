//! Metadata Cache Module
//!
//! Bounded map of decoded metadata with recency-ordered eviction and lazy expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Metadata Cache ==
/// Size- and time-bounded cache of decoded metadata.
///
/// Recency is "last touch": an insert, an overwrite or a successful read moves
/// the key to the most recently used end. Expired entries are only dropped
/// when a read finds them; there is no background sweep.
#[derive(Debug)]
pub struct MetadataCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Recency order
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries kept after any operation
    max_items: usize,
    /// Lifetime of an entry from its last write
    ttl: Duration,
}

impl MetadataCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_items` entries for `ttl` each.
    pub fn new(max_items: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_items,
            ttl,
        }
    }

    // == Get ==
    /// Returns the live value for `key`, refreshing its recency.
    pub fn get(&mut self, key: &str) -> Option<Arc<Value>> {
        self.get_at(key, Instant::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<Arc<Value>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired_at(now) {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "cache entry expired");
            return None;
        }

        let value = Arc::clone(&entry.value);
        self.lru.touch(key);
        self.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Inserts or overwrites `key`, then evicts the least recently used entry
    /// if the cache is over capacity.
    ///
    /// Returns the evicted key, if any.
    pub fn set(&mut self, key: impl Into<String>, value: Arc<Value>) -> Option<String> {
        self.set_at(key, value, Instant::now())
    }

    /// Same as [`set`](Self::set) with an explicit clock reading.
    pub fn set_at(
        &mut self,
        key: impl Into<String>,
        value: Arc<Value>,
        now: Instant,
    ) -> Option<String> {
        let key = key.into();
        self.lru.touch(&key);
        self.entries
            .insert(key, CacheEntry::new(value, now, self.ttl));

        // Each set adds at most one entry, so one eviction restores the bound.
        let mut evicted = None;
        if self.entries.len() > self.max_items {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_eviction();
                debug!(key = %oldest, "cache entry evicted");
                evicted = Some(oldest);
            }
        }

        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns true if `key` is stored, expired or not. Does not touch recency.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_items
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
