//! Cache Module
//!
//! In-memory caching with TTL expiration, LRU eviction and per-instance
//! statistics, organised as a fixed registry of named caches.

mod entry;
mod keys;
mod lru;
mod named;
mod registry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use keys::CacheKey;
pub use lru::LruTracker;
pub use named::NamedCache;
pub use registry::{CacheKind, CacheRegistry, CacheSettings};
pub use stats::{CacheCounters, CacheStats, CacheSummary};
pub use store::CacheStore;
