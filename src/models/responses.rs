//! Response DTOs for the administrative API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStats, CacheSummary};
use crate::health::CapabilitySnapshot;

/// Active provider of one capability, as shown by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: String,
    pub base_url: String,
}

/// Outcome of the persistent store self-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Ok,
    Unavailable,
    /// No store configured
    Disabled,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether a write-then-read on the `api` cache round-tripped
    pub cache_ok: bool,
    /// Informational only, store failures never degrade the service
    pub persistent_store: StoreStatus,
    /// Active provider per capability
    pub upstreams: BTreeMap<String, ProviderStatus>,
    /// Minutes since every capability was last checked, absent before the
    /// first complete check
    pub last_check_minutes_ago: Option<i64>,
}

impl HealthResponse {
    /// Builds the response at `now`; degraded when the cache self-check
    /// failed or the last check is older than `max_check_age`.
    pub fn evaluate(
        cache_ok: bool,
        persistent_store: StoreStatus,
        upstreams: BTreeMap<String, ProviderStatus>,
        last_check: Option<DateTime<Utc>>,
        max_check_age: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let age = last_check.map(|checked| now - checked);
        let stale = age.map_or(true, |age| age > max_check_age);

        Self {
            status: if cache_ok && !stale { "healthy" } else { "degraded" }.to_string(),
            timestamp: now.to_rfc3339(),
            cache_ok,
            persistent_store,
            upstreams,
            last_check_minutes_ago: age.map(|age| age.num_minutes()),
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub caches: BTreeMap<String, CacheStats>,
    pub summary: CacheSummary,
}

/// Response body for POST /cache/cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub status: String,
    pub total_entries_removed: usize,
    pub cleanup_by_cache: BTreeMap<String, usize>,
    pub message: String,
}

impl CleanupResponse {
    pub fn new(cleanup_by_cache: BTreeMap<String, usize>) -> Self {
        let total: usize = cleanup_by_cache.values().sum();
        Self {
            status: "completed".to_string(),
            total_entries_removed: total,
            cleanup_by_cache,
            message: format!("Removed {} expired entries", total),
        }
    }
}

/// Response body for DELETE /cache/clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub status: String,
    pub total_entries_removed: usize,
    pub message: String,
}

impl ClearResponse {
    pub fn new(total: usize) -> Self {
        Self {
            status: "cleared".to_string(),
            total_entries_removed: total,
            message: format!("Cleared {} entries from all caches", total),
        }
    }
}

/// Response body for GET /upstreams
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamsResponse {
    pub upstreams: Vec<CapabilitySnapshot>,
    pub check_interval_seconds: u64,
}

/// Response body for POST /upstreams/check
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamCheckResponse {
    /// `completed` or `timed_out`
    pub result: String,
    pub upstreams: Vec<CapabilitySnapshot>,
}
