//! Interaction log repository
//!
//! The dashboard aggregator never reaches into storage itself: callers read
//! the log through [`InteractionStore::query_all`] and pass the records in.

use crate::error::{Result, UtmiError};
use crate::types::{InteractionId, InteractionRecord};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Append-only interaction log
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append a record at the end of the log
    async fn append(&self, record: InteractionRecord) -> Result<()>;

    /// Every record, in insertion order
    async fn query_all(&self) -> Result<Vec<InteractionRecord>>;

    /// Retrieve one record by ID
    async fn get(&self, id: InteractionId) -> Result<InteractionRecord>;

    async fn count(&self) -> Result<usize>;
}

/// Process-local store backed by a vector
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<InteractionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with existing records
    pub fn with_records(records: Vec<InteractionRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl InteractionStore for InMemoryStore {
    async fn append(&self, record: InteractionRecord) -> Result<()> {
        debug!("Appending interaction {}", record.id);
        self.records.write().await.push(record);
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<InteractionRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: InteractionId) -> Result<InteractionRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| UtmiError::RecordNotFound(id.to_string()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}
