//! Cache Entry Module
//!
//! Defines a single stored payload together with the instant it was written.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry holding an opaque, already-encoded payload.
///
/// The entry does not know its own TTL; the owning store applies one TTL to
/// every entry it holds.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded payload, never interpreted by the cache
    pub value: Vec<u8>,
    /// Instant of the last write
    pub inserted_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `inserted_at`.
    pub fn new(value: Vec<u8>, inserted_at: Instant) -> Self {
        Self { value, inserted_at }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl` at `now`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is already
    /// expired, so `now - inserted_at >= ttl` never reaches a caller.
    pub fn is_expired_at(&self, ttl: Duration, now: Instant) -> bool {
        self.age_at(now) >= ttl
    }

    // == Age ==
    /// Time elapsed since the entry was written. Saturates at zero if `now`
    /// precedes the write.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    /// Remaining lifetime under `ttl`, zero once expired.
    #[cfg(test)]
    pub fn ttl_remaining_at(&self, ttl: Duration, now: Instant) -> Duration {
        ttl.saturating_sub(self.age_at(now))
    }
}
