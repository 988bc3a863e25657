//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheKind, CacheSettings};
use crate::health::{CandidatePair, Endpoint, TrackerSettings};

const DEFAULT_PRIMARY_ID: &str = "bvg";
const DEFAULT_PRIMARY_URL: &str = "https://v6.bvg.transport.rest";
const DEFAULT_SECONDARY_ID: &str = "vbb";
const DEFAULT_SECONDARY_URL: &str = "https://v6.vbb.transport.rest";

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache sweep interval in seconds
    pub cache_cleanup_interval: u64,
    /// Seconds between upstream probe cycles
    pub health_check_interval: u64,
    /// Upper bound in seconds for one whole probe cycle
    pub health_check_timeout: u64,
    /// Upper bound in seconds for one synthetic query
    pub probe_timeout: u64,
    /// Consecutive primary failures before trying the secondary
    pub failover_threshold: u32,
    pub stations: CandidatePair,
    pub journeys: CandidatePair,
    /// Persistent records older than this many days are deleted
    pub store_retention_days: i64,
    /// Store retention sweep interval in seconds
    pub store_cleanup_interval: u64,
    /// Per-cache capacity and TTL
    pub caches: HashMap<CacheKind, CacheSettings>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CACHE_CLEANUP_INTERVAL` - Cache sweep frequency in seconds (default: 300)
    /// - `HEALTH_CHECK_INTERVAL` - Probe cycle frequency in seconds (default: 600)
    /// - `HEALTH_CHECK_TIMEOUT` - Probe cycle limit in seconds (default: 60)
    /// - `PROBE_TIMEOUT` - Single query limit in seconds (default: 5)
    /// - `FAILOVER_THRESHOLD` - Primary failures before failover (default: 1)
    /// - `STATIONS_PRIMARY_URL`, `STATIONS_SECONDARY_URL`,
    ///   `JOURNEYS_PRIMARY_URL`, `JOURNEYS_SECONDARY_URL` - candidate base URLs
    /// - `UPSTREAM_PRIMARY_NAME`, `UPSTREAM_SECONDARY_NAME` - candidate ids (default: bvg, vbb)
    /// - `STORE_RETENTION_DAYS` - Persistent record retention (default: 28)
    /// - `STORE_CLEANUP_INTERVAL` - Retention sweep frequency in seconds (default: 86400)
    /// - `CACHE_<NAME>_MAX_SIZE`, `CACHE_<NAME>_TTL` - per-cache tuning, TTL in seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let primary_id: String = env_or("UPSTREAM_PRIMARY_NAME", DEFAULT_PRIMARY_ID.to_string());
        let secondary_id: String = env_or("UPSTREAM_SECONDARY_NAME", DEFAULT_SECONDARY_ID.to_string());
        let pair = |primary_var: &str, secondary_var: &str| {
            CandidatePair::new(
                Endpoint::new(primary_id.clone(), env_or(primary_var, DEFAULT_PRIMARY_URL.to_string())),
                Endpoint::new(secondary_id.clone(), env_or(secondary_var, DEFAULT_SECONDARY_URL.to_string())),
            )
        };

        let caches = CacheKind::ALL
            .iter()
            .map(|kind| {
                let base = kind.default_settings();
                let prefix = format!("CACHE_{}", kind.as_str().to_uppercase());
                let max_size = env_or(&format!("{prefix}_MAX_SIZE"), base.max_size);
                let ttl = env_or(&format!("{prefix}_TTL"), base.ttl.as_secs());
                (*kind, CacheSettings::new(max_size, Duration::from_secs(ttl)))
            })
            .collect();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_cleanup_interval: env_or("CACHE_CLEANUP_INTERVAL", defaults.cache_cleanup_interval),
            health_check_interval: env_or("HEALTH_CHECK_INTERVAL", defaults.health_check_interval),
            health_check_timeout: env_or("HEALTH_CHECK_TIMEOUT", defaults.health_check_timeout),
            probe_timeout: env_or("PROBE_TIMEOUT", defaults.probe_timeout),
            failover_threshold: env_or("FAILOVER_THRESHOLD", defaults.failover_threshold),
            stations: pair("STATIONS_PRIMARY_URL", "STATIONS_SECONDARY_URL"),
            journeys: pair("JOURNEYS_PRIMARY_URL", "JOURNEYS_SECONDARY_URL"),
            store_retention_days: env_or("STORE_RETENTION_DAYS", defaults.store_retention_days),
            store_cleanup_interval: env_or("STORE_CLEANUP_INTERVAL", defaults.store_cleanup_interval),
            caches,
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            failure_threshold: self.failover_threshold.max(1),
            probe_timeout: Duration::from_secs(self.probe_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let pair = CandidatePair::new(
            Endpoint::new(DEFAULT_PRIMARY_ID, DEFAULT_PRIMARY_URL),
            Endpoint::new(DEFAULT_SECONDARY_ID, DEFAULT_SECONDARY_URL),
        );

        Self {
            server_port: 8000,
            cache_cleanup_interval: 300,
            health_check_interval: 600,
            health_check_timeout: 60,
            probe_timeout: 5,
            failover_threshold: 1,
            stations: pair.clone(),
            journeys: pair,
            store_retention_days: 28,
            store_cleanup_interval: 86400,
            caches: CacheKind::ALL
                .iter()
                .map(|kind| (*kind, kind.default_settings()))
                .collect(),
        }
    }
}
