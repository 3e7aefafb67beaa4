//! Download record storage.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{DownloadRecord, JobSnapshot};

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate local id: {0}")]
    Duplicate(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

/// Trait for download record storage backends.
///
/// Records live for the life of the process; there is no removal.
#[async_trait]
pub trait DownloadStore: Send + Sync {
    /// Insert a new record. Fails if the local id is taken.
    async fn insert(&self, record: DownloadRecord) -> Result<(), StoreError>;

    /// Get a record by local id.
    async fn get(&self, local_id: &str) -> Option<DownloadRecord>;

    /// All records, newest first.
    async fn list(&self) -> Vec<DownloadRecord>;

    /// Apply a provider snapshot atomically and return the resulting record.
    async fn apply_snapshot(
        &self,
        local_id: &str,
        snapshot: JobSnapshot,
    ) -> Result<DownloadRecord, StoreError>;

    /// Number of records.
    async fn count(&self) -> usize;
}

/// In-memory store; writers are serialized by a single lock.
#[derive(Debug, Default)]
pub struct MemoryDownloadStore {
    records: RwLock<HashMap<String, DownloadRecord>>,
}

impl MemoryDownloadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DownloadStore for MemoryDownloadStore {
    async fn insert(&self, record: DownloadRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.local_id) {
            return Err(StoreError::Duplicate(record.local_id));
        }
        records.insert(record.local_id.clone(), record);
        Ok(())
    }

    async fn get(&self, local_id: &str) -> Option<DownloadRecord> {
        self.records.read().await.get(local_id).cloned()
    }

    async fn list(&self) -> Vec<DownloadRecord> {
        let mut all: Vec<DownloadRecord> = self.records.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.local_id.cmp(&b.local_id))
        });
        all
    }

    async fn apply_snapshot(
        &self,
        local_id: &str,
        snapshot: JobSnapshot,
    ) -> Result<DownloadRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(local_id)
            .ok_or_else(|| StoreError::NotFound(local_id.to_string()))?;
        record.apply_snapshot(snapshot);
        Ok(record.clone())
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}
