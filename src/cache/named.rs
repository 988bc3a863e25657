//! Named Cache Module
//!
//! Thread-safe handle around one [`CacheStore`], plus the JSON encode/decode
//! pair call sites use to put typed values into the byte-oriented store.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};

// == Named Cache ==
/// One named, independently locked cache instance.
///
/// Every call takes the instance's own lock for its whole duration and never
/// awaits anything else while holding it, so calls on one instance are
/// linearizable and calls on different instances never contend.
#[derive(Debug)]
pub struct NamedCache {
    name: &'static str,
    store: Mutex<CacheStore>,
}

impl NamedCache {
    pub fn new(name: &'static str, max_size: usize, ttl: Duration) -> Self {
        Self {
            name,
            store: Mutex::new(CacheStore::new(max_size, ttl)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.store.lock().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: Vec<u8>) {
        self.store.lock().await.set(key, value)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.lock().await.delete(key)
    }

    /// Empties the cache and resets its counters, returning the number of
    /// entries held right before clearing.
    pub async fn clear(&self) -> usize {
        self.store.lock().await.clear()
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.store.lock().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    // == Typed Access ==
    /// Reads and decodes a JSON value.
    ///
    /// A payload that no longer decodes into `T` is logged and reported as
    /// absent so the caller refetches; the lookup itself still counted as a
    /// hit because the entry was retrieved.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(cache = self.name, key, error = %e, "Cached value failed to decode, treating as miss");
                None
            }
        }
    }

    /// Encodes and stores a JSON value. Encoding failures are logged and
    /// leave the cache untouched.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) {
        let key = key.into();
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                debug!(cache = self.name, key = %key, bytes = bytes.len(), "Caching value");
                self.set(key, bytes).await;
            }
            Err(e) => {
                warn!(cache = self.name, key = %key, error = %e, "Value failed to encode, not cached");
            }
        }
    }
}
