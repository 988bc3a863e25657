//! Cache Statistics Module
//!
//! Counters kept by each store and the snapshot reported to operators.

use serde::Serialize;

/// Rough per-entry bookkeeping cost (map slot, tracker slot, instant) added
/// to the key and payload lengths when estimating memory.
pub const ENTRY_OVERHEAD_BYTES: usize = 96;

// == Cache Counters ==
/// Running hit/miss/eviction counters of one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Hit Rate ==
    /// Hit rate in percent, 0 when no lookups have been made.
    pub fn hit_rate_percent(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

// == Cache Stats ==
/// Point-in-time statistics of one named cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored (expired ones not yet swept included)
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate_percent: f64,
    pub ttl_seconds: u64,
    /// Estimated footprint of keys, payloads and bookkeeping, in KiB
    pub memory_usage_estimate_kb: f64,
}

// == Cache Summary ==
/// Fleet-wide totals derived from every named cache's stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSummary {
    pub total_entries: usize,
    pub total_memory_usage_kb: f64,
    pub total_memory_usage_mb: f64,
    pub cache_types: usize,
    pub avg_hit_rate: f64,
}

impl CacheSummary {
    /// Aggregates a set of per-cache stats.
    pub fn from_stats<'a>(stats: impl IntoIterator<Item = &'a CacheStats>) -> Self {
        let mut total_entries = 0;
        let mut total_kb = 0.0;
        let mut hit_rate_sum = 0.0;
        let mut cache_types = 0;

        for s in stats {
            total_entries += s.size;
            total_kb += s.memory_usage_estimate_kb;
            hit_rate_sum += s.hit_rate_percent;
            cache_types += 1;
        }

        let avg_hit_rate = if cache_types == 0 {
            0.0
        } else {
            round2(hit_rate_sum / cache_types as f64)
        };

        Self {
            total_entries,
            total_memory_usage_kb: round2(total_kb),
            total_memory_usage_mb: round2(total_kb / 1024.0),
            cache_types,
            avg_hit_rate,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
