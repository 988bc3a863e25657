//! Persistence Module
//!
//! Interface to the optional persistent store that outlives the in-memory
//! caches. Every call site treats the store as best-effort: a failure means
//! "no stored data available", never a failed request.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryStore;

// == Store Error ==
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == Persistent Record ==
/// One upserted row: the latest payload for a resource in a time bucket.
///
/// `(resource, bucket)` is the natural key; a save with the same key
/// replaces the previous row, no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentRecord {
    /// Logical resource, e.g. `mensa:hardenbergstrasse`
    pub resource: String,
    /// Time bucket, e.g. `2026-W42`
    pub bucket: String,
    pub payload: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

impl PersistentRecord {
    pub fn new(
        resource: impl Into<String>,
        bucket: impl Into<String>,
        payload: serde_json::Value,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            resource: resource.into(),
            bucket: bucket.into(),
            payload,
            last_updated,
        }
    }
}

// == Persistent Store ==
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Upserts a record under its natural key. Last writer wins.
    async fn save(&self, record: PersistentRecord) -> Result<(), StoreError>;

    /// Most recently updated record of `resource` across all buckets.
    async fn get_latest(&self, resource: &str) -> Result<Option<PersistentRecord>, StoreError>;

    /// Deletes every record last updated before `cutoff`, returning how many.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}
