//! Process-local persistent store, used when no database is configured and
//! in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{PersistentRecord, PersistentStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<(String, String), PersistentRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PersistentStore for InMemoryStore {
    async fn save(&self, record: PersistentRecord) -> Result<(), StoreError> {
        let key = (record.resource.clone(), record.bucket.clone());
        debug!(resource = %record.resource, bucket = %record.bucket, "Upserting record");
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn get_latest(&self, resource: &str) -> Result<Option<PersistentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.resource == resource)
            .max_by_key(|r| r.last_updated)
            .cloned())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.last_updated >= cutoff);
        Ok(before - records.len())
    }
}
