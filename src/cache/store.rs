//! Cache Store Module
//!
//! Single-threaded cache engine combining HashMap storage with LRU tracking
//! and a store-wide TTL. Thread safety is added by [`NamedCache`].
//!
//! [`NamedCache`]: crate::cache::NamedCache

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::stats::ENTRY_OVERHEAD_BYTES;
use crate::cache::{CacheCounters, CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Bounded, expiring, LRU-evicting key-value store with statistics.
///
/// Every method has an `*_at` twin taking the current instant explicitly;
/// the plain methods call them with `Instant::now()`.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker, same key set as `entries`
    lru: LruTracker,
    counters: CacheCounters,
    max_size: usize,
    ttl: Duration,
    /// Sum of key and payload lengths of all stored entries
    payload_bytes: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries held at once
    /// * `ttl` - Lifetime of every entry, measured from its last write
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: CacheCounters::default(),
            max_size,
            ttl,
            payload_bytes: 0,
        }
    }

    // == Get ==
    /// Looks up a key, returning a copy of its payload if present and fresh.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        self.get_at(key, Instant::now())
    }

    /// Lookup evaluated at `now`.
    ///
    /// An expired entry is removed on the spot and counted both as an
    /// eviction and as a miss. A fresh entry becomes most recently used.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<Vec<u8>> {
        let expired = match self.entries.get(key) {
            None => {
                self.counters.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(self.ttl, now),
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_evictions(1);
            self.counters.record_miss();
            return None;
        }

        self.lru.touch(key);
        self.counters.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a payload under `key`, resetting its age.
    pub fn set(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.set_at(key, value, Instant::now())
    }

    /// Write evaluated at `now`.
    ///
    /// A new key arriving at capacity first evicts the least recently used
    /// entry. Overwriting an existing key never evicts anything.
    pub fn set_at(&mut self, key: impl Into<String>, value: Vec<u8>, now: Instant) {
        let key = key.into();

        if self.max_size == 0 {
            return;
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.drop_payload(&oldest);
                self.counters.record_evictions(1);
            }
        }

        self.payload_bytes += key.len() + value.len();
        if let Some(previous) = self.entries.insert(key.clone(), CacheEntry::new(value, now)) {
            self.payload_bytes -= key.len() + previous.value.len();
        }
        self.lru.touch(&key);
    }

    // == Delete ==
    /// Removes a key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Clear ==
    /// Empties the store and resets every counter.
    ///
    /// Returns the number of entries held before clearing.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.counters.reset();
        self.payload_bytes = 0;
        removed
    }

    // == Cleanup Expired ==
    /// Removes every expired entry regardless of its LRU position.
    ///
    /// Returns the number of entries removed; each counts as an eviction.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    pub fn cleanup_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.counters.record_evictions(expired.len());
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of the store's statistics.
    pub fn stats(&self) -> CacheStats {
        let memory_bytes = self.payload_bytes + self.entries.len() * ENTRY_OVERHEAD_BYTES;

        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            hits: self.counters.hits,
            misses: self.counters.misses,
            evictions: self.counters.evictions,
            hit_rate_percent: self.counters.hit_rate_percent(),
            ttl_seconds: self.ttl.as_secs(),
            memory_usage_estimate_kb: memory_bytes as f64 / 1024.0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Internal Helpers ==
    fn remove_entry(&mut self, key: &str) -> bool {
        if self.drop_payload(key) {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    /// Drops the map entry only; the caller keeps the LRU tracker in sync.
    fn drop_payload(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.payload_bytes -= key.len() + entry.value.len();
                true
            }
            None => false,
        }
    }
}
