//! Cache Module
//!
//! In-memory metadata cache with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::MetadataCache;

// == Public Constants ==
/// Default maximum number of cached metadata documents
pub const DEFAULT_MAX_ITEMS: usize = 500;

/// Default time-to-live of a cached document in seconds
pub const DEFAULT_TTL_SECS: u64 = 300;
