//! Tiered Loader
//!
//! Read-through orchestration over the named caches, the optional
//! persistent store and a live fetch. Only the live fetch can fail a
//! request; cache and store problems are logged and treated as misses.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheKind, CacheRegistry};
use crate::error::FetchError;
use crate::freshness::FreshnessPolicy;
use crate::persistence::{PersistentRecord, PersistentStore};

/// A value carrying the time its data was last fetched from upstream.
pub trait Timestamped {
    fn last_updated(&self) -> DateTime<Utc>;
}

/// Which tier answered a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Store,
    Upstream,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Loaded<T> {
    fn new(value: T, source: DataSource) -> Self {
        Self { value, source }
    }
}

// == Tiered Loader ==
#[derive(Clone)]
pub struct TieredLoader {
    caches: Arc<CacheRegistry>,
    store: Option<Arc<dyn PersistentStore>>,
}

impl TieredLoader {
    pub fn new(caches: Arc<CacheRegistry>, store: Option<Arc<dyn PersistentStore>>) -> Self {
        Self { caches, store }
    }

    pub fn caches(&self) -> &Arc<CacheRegistry> {
        &self.caches
    }

    // == Get Or Fetch ==
    /// Cache, then `fetch`. A fetched value is cached before it is returned.
    pub async fn get_or_fetch<T, F, Fut>(&self, kind: CacheKind, key: &str, fetch: F) -> Result<Loaded<T>, FetchError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let cache = self.caches.get(kind);
        if let Some(value) = cache.get_json::<T>(key).await {
            debug!(cache = %kind, key, "Cache hit");
            return Ok(Loaded::new(value, DataSource::Cache));
        }

        let value = fetch().await?;
        cache.set_json(key, &value).await;
        Ok(Loaded::new(value, DataSource::Upstream))
    }

    // == Get Fresh ==
    /// Cache, then persistent store, then `fetch`, with every stored copy
    /// checked against `policy` before use.
    ///
    /// A store copy that passes the gate is promoted into the cache. A live
    /// result is saved to the store under the policy's current bucket and
    /// then cached. `force_refresh` skips both lookups.
    pub async fn get_fresh<T, F, Fut>(
        &self,
        kind: CacheKind,
        key: &str,
        resource: &str,
        policy: &FreshnessPolicy,
        force_refresh: bool,
        fetch: F,
    ) -> Result<Loaded<T>, FetchError>
    where
        T: Serialize + DeserializeOwned + Timestamped,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let cache = self.caches.get(kind);

        if !force_refresh {
            if let Some(value) = cache.get_json::<T>(key).await {
                if !policy.needs_refresh(value.last_updated()) {
                    debug!(cache = %kind, key, "Fresh cache hit");
                    return Ok(Loaded::new(value, DataSource::Cache));
                }
                info!(cache = %kind, key, "Cached copy is stale, refreshing");
            }

            if let Some(value) = self.load_stored::<T>(resource).await {
                if !policy.needs_refresh(value.last_updated()) {
                    debug!(resource, "Fresh store hit, promoting to cache");
                    cache.set_json(key, &value).await;
                    return Ok(Loaded::new(value, DataSource::Store));
                }
                info!(resource, "Stored copy is stale, refreshing");
            }
        }

        let value = fetch().await?;
        self.save_stored(resource, policy, &value).await;
        cache.set_json(key, &value).await;
        Ok(Loaded::new(value, DataSource::Upstream))
    }

    async fn load_stored<T: DeserializeOwned>(&self, resource: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        let record = match store.get_latest(resource).await {
            Ok(record) => record?,
            Err(e) => {
                warn!(resource, error = %e, "Persistent store lookup failed");
                return None;
            }
        };

        match serde_json::from_value(record.payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(resource, bucket = %record.bucket, error = %e, "Stored record failed to decode");
                None
            }
        }
    }

    async fn save_stored<T: Serialize + Timestamped>(&self, resource: &str, policy: &FreshnessPolicy, value: &T) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(resource, error = %e, "Record failed to encode, not persisted");
                return;
            }
        };

        let last_updated = value.last_updated();
        let bucket = policy.period.bucket_label(&last_updated.with_timezone(&chrono::Local));
        if let Err(e) = store
            .save(PersistentRecord::new(resource, bucket, payload, last_updated))
            .await
        {
            warn!(resource, error = %e, "Persistent store save failed");
        }
    }
}
