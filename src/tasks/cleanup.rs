//! Cleanup Tasks
//!
//! Periodic sweeps of expired cache entries and of persistent records past
//! their retention.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheRegistry;
use crate::persistence::PersistentStore;

/// Spawns a task that calls [`CacheRegistry::cleanup_all`] every `interval`.
///
/// The first sweep happens one interval after startup. The returned handle
/// is aborted on shutdown.
pub fn spawn_cache_cleanup_task(caches: Arc<CacheRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting cache cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = caches.cleanup_all().await;
            let total: usize = removed.values().sum();

            if total > 0 {
                info!(total, per_cache = ?removed, "Cache cleanup removed expired entries");
            } else {
                debug!("Cache cleanup: no expired entries found");
            }
        }
    })
}

/// Spawns a task deleting store records older than `retention`, every
/// `interval`. Store failures are logged and retried on the next tick.
pub fn spawn_store_cleanup_task(
    store: Arc<dyn PersistentStore>,
    retention: chrono::Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            retention_days = retention.num_days(),
            interval_secs = interval.as_secs(),
            "Starting store cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let cutoff = Utc::now() - retention;
            match store.delete_older_than(cutoff).await {
                Ok(0) => debug!("Store cleanup: nothing past retention"),
                Ok(removed) => info!(removed, %cutoff, "Store cleanup removed old records"),
                Err(e) => warn!(error = %e, "Store cleanup failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKind, CacheSettings};
    use crate::persistence::{InMemoryStore, PersistentRecord};
    use serde_json::json;
    use std::collections::HashMap;

    fn short_lived_registry() -> Arc<CacheRegistry> {
        let mut overrides = HashMap::new();
        overrides.insert(CacheKind::Transport, CacheSettings::new(10, Duration::from_millis(50)));
        Arc::new(CacheRegistry::with_settings(&overrides))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let caches = short_lived_registry();
        caches.get(CacheKind::Transport).set("bikes", b"[]".to_vec()).await;

        let handle = spawn_cache_cleanup_task(caches.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        let stats = caches.get(CacheKind::Transport).stats().await;
        assert_eq!(stats.size, 0, "Expired entry should have been swept");
        assert_eq!(stats.evictions, 1);
        // Swept without any lookup
        assert_eq!(stats.misses, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let caches = short_lived_registry();
        caches.get(CacheKind::Geocoding).set("geo:1", b"\"Hardenbergstr.\"".to_vec()).await;

        let handle = spawn_cache_cleanup_task(caches.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(caches.get(CacheKind::Geocoding).stats().await.size, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cache_cleanup_task(Arc::new(CacheRegistry::new()), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[tokio::test]
    async fn test_store_cleanup_task_applies_retention() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .save(PersistentRecord::new("mensa:veggie", "2026-W38", json!([]), now - chrono::Duration::days(30)))
            .await
            .unwrap();
        store
            .save(PersistentRecord::new("mensa:veggie", "2026-W42", json!([]), now))
            .await
            .unwrap();

        let handle = spawn_store_cleanup_task(store.clone(), chrono::Duration::days(28), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get_latest("mensa:veggie").await.unwrap().unwrap().bucket, "2026-W42");

        handle.abort();
    }
}
