//! In-memory event store

use crate::{StorageResult, StorageService};
use poster_planning::EventRecord;
use tokio::sync::RwLock;

/// Process-local store, mostly useful for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<Vec<EventRecord>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored records in insertion order
    pub async fn records(&self) -> Vec<EventRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl StorageService for MemoryStorage {
    async fn exists(&self, record: &EventRecord) -> StorageResult<bool> {
        Ok(self.records.read().await.contains(record))
    }

    async fn insert(&self, record: &EventRecord) -> StorageResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.records.read().await.len())
    }
}
