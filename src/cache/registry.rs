//! Cache Registry Module
//!
//! The fixed family of named caches, each tuned for one volatility class,
//! and the fleet-wide maintenance operations over them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::cache::{CacheStats, CacheSummary, NamedCache};

const MINUTE: u64 = 60;
const DAY: u64 = 24 * 60 * MINUTE;

// == Cache Kind ==
/// The statically known cache names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// Parsed and pretty-printed route plans
    Api,
    /// Live bike positions and nearby stops
    Transport,
    /// Reverse-geocoded place names
    Geocoding,
    /// Weekly canteen menus
    Mensa,
    /// Student lecture schedules
    Schedule,
}

impl CacheKind {
    pub const ALL: [CacheKind; 5] = [
        CacheKind::Api,
        CacheKind::Transport,
        CacheKind::Geocoding,
        CacheKind::Mensa,
        CacheKind::Schedule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Api => "api",
            CacheKind::Transport => "transport",
            CacheKind::Geocoding => "geocoding",
            CacheKind::Mensa => "mensa",
            CacheKind::Schedule => "schedule",
        }
    }

    pub fn from_name(name: &str) -> Option<CacheKind> {
        CacheKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Built-in tuning: minutes for live data, days for geocoding, a week
    /// for static weekly menus.
    pub fn default_settings(&self) -> CacheSettings {
        match self {
            CacheKind::Api => CacheSettings::new(1000, Duration::from_secs(5 * MINUTE)),
            CacheKind::Transport => CacheSettings::new(500, Duration::from_secs(MINUTE)),
            CacheKind::Geocoding => CacheSettings::new(5000, Duration::from_secs(7 * DAY)),
            CacheKind::Mensa => CacheSettings::new(50, Duration::from_secs(7 * DAY)),
            CacheKind::Schedule => CacheSettings::new(200, Duration::from_secs(DAY)),
        }
    }

    fn index(&self) -> usize {
        match self {
            CacheKind::Api => 0,
            CacheKind::Transport => 1,
            CacheKind::Geocoding => 2,
            CacheKind::Mensa => 3,
            CacheKind::Schedule => 4,
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Settings ==
/// Capacity and TTL of one named cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub max_size: usize,
    pub ttl: Duration,
}

impl CacheSettings {
    pub const fn new(max_size: usize, ttl: Duration) -> Self {
        Self { max_size, ttl }
    }
}

// == Cache Registry ==
/// Owns one [`NamedCache`] per [`CacheKind`]. The set never changes after
/// construction.
#[derive(Debug)]
pub struct CacheRegistry {
    caches: Vec<NamedCache>,
}

impl CacheRegistry {
    /// Builds every cache with its built-in tuning.
    pub fn new() -> Self {
        Self::with_settings(&HashMap::new())
    }

    /// Builds every cache, taking tuning from `overrides` where present.
    pub fn with_settings(overrides: &HashMap<CacheKind, CacheSettings>) -> Self {
        let caches = CacheKind::ALL
            .iter()
            .map(|kind| {
                let settings = overrides
                    .get(kind)
                    .copied()
                    .unwrap_or_else(|| kind.default_settings());
                NamedCache::new(kind.as_str(), settings.max_size, settings.ttl)
            })
            .collect();

        Self { caches }
    }

    pub fn get(&self, kind: CacheKind) -> &NamedCache {
        &self.caches[kind.index()]
    }

    // == Stats All ==
    /// Per-cache statistics keyed by cache name.
    pub async fn stats_all(&self) -> BTreeMap<String, CacheStats> {
        let mut all = BTreeMap::new();
        for cache in &self.caches {
            all.insert(cache.name().to_string(), cache.stats().await);
        }
        all
    }

    pub async fn summary(&self) -> CacheSummary {
        CacheSummary::from_stats(self.stats_all().await.values())
    }

    // == Cleanup All ==
    /// Sweeps expired entries out of every cache. Each cache is locked only
    /// for its own sweep, so normal traffic keeps flowing to the others.
    pub async fn cleanup_all(&self) -> BTreeMap<String, usize> {
        let mut removed = BTreeMap::new();
        for cache in &self.caches {
            removed.insert(cache.name().to_string(), cache.cleanup_expired().await);
        }
        removed
    }

    // == Clear All ==
    /// Administrative reset of every cache.
    ///
    /// Returns the total number of entries removed, each cache's count taken
    /// right before it was cleared.
    pub async fn clear_all(&self) -> usize {
        let mut total = 0;
        for cache in &self.caches {
            total += cache.clear().await;
        }
        info!(total_entries_removed = total, "All caches cleared");
        total
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_unique() {
        let mut names: Vec<&str> = CacheKind::ALL.iter().map(CacheKind::as_str).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CacheKind::ALL.len());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CacheKind::from_name("mensa"), Some(CacheKind::Mensa));
        assert_eq!(CacheKind::from_name("Mensa"), None);
        assert_eq!(CacheKind::from_name("redis"), None);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in CacheKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[tokio::test]
    async fn test_registry_applies_default_tuning() {
        let registry = CacheRegistry::new();
        let stats = registry.stats_all().await;

        assert_eq!(stats.len(), 5);
        assert_eq!(stats["transport"].ttl_seconds, 60);
        assert_eq!(stats["mensa"].ttl_seconds, 7 * DAY);
        assert_eq!(stats["geocoding"].max_size, 5000);
    }

    #[tokio::test]
    async fn test_registry_applies_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(
            CacheKind::Api,
            CacheSettings::new(3, Duration::from_secs(10)),
        );
        let registry = CacheRegistry::with_settings(&overrides);

        let stats = registry.get(CacheKind::Api).stats().await;
        assert_eq!(stats.max_size, 3);
        assert_eq!(stats.ttl_seconds, 10);
        assert_eq!(registry.get(CacheKind::Mensa).stats().await.max_size, 50);
    }

    #[tokio::test]
    async fn test_caches_are_independent() {
        let registry = CacheRegistry::new();

        registry.get(CacheKind::Api).set("k", b"api".to_vec()).await;
        registry.get(CacheKind::Mensa).set("k", b"mensa".to_vec()).await;

        assert_eq!(registry.get(CacheKind::Api).get("k").await, Some(b"api".to_vec()));
        assert_eq!(registry.get(CacheKind::Mensa).get("k").await, Some(b"mensa".to_vec()));
        assert_eq!(registry.get(CacheKind::Transport).get("k").await, None);
    }

    #[tokio::test]
    async fn test_clear_all_reports_total_before_clearing() {
        let registry = CacheRegistry::new();
        registry.get(CacheKind::Api).set("a", vec![1]).await;
        registry.get(CacheKind::Api).set("b", vec![2]).await;
        registry.get(CacheKind::Schedule).set("c", vec![3]).await;

        assert_eq!(registry.clear_all().await, 3);
        assert_eq!(registry.summary().await.total_entries, 0);
        assert_eq!(registry.clear_all().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_all_reports_every_cache() {
        let mut overrides = HashMap::new();
        overrides.insert(CacheKind::Transport, CacheSettings::new(10, Duration::ZERO));
        let registry = CacheRegistry::with_settings(&overrides);

        registry.get(CacheKind::Transport).set("bike", vec![1]).await;
        registry.get(CacheKind::Api).set("route", vec![1]).await;

        let removed = registry.cleanup_all().await;
        assert_eq!(removed.len(), 5);
        assert_eq!(removed["transport"], 1);
        assert_eq!(removed["api"], 0);
        assert_eq!(registry.get(CacheKind::Api).stats().await.size, 1);
    }

    #[tokio::test]
    async fn test_summary_sums_sizes() {
        let registry = CacheRegistry::new();
        registry.get(CacheKind::Api).set("a", vec![0; 10]).await;
        registry.get(CacheKind::Geocoding).set("b", vec![0; 10]).await;

        let summary = registry.summary().await;
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.cache_types, 5);
        assert!(summary.total_memory_usage_kb > 0.0);
    }
}
