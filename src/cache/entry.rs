//! Cache Entry Module
//!
//! Defines a cached metadata value together with its expiry deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A decoded metadata value and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The decoded metadata
    pub value: Arc<Value>,
    /// When the entry was inserted or last overwritten
    pub inserted_at: Instant,
    /// `inserted_at + ttl`
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry inserted at `now` that expires after `ttl`.
    pub fn new(value: Arc<Value>, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a read exactly at the
    /// deadline is already a miss.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Returns the time left before expiry, saturating at zero.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
