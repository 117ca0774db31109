use crate::error::Result;
use crate::types::{IngestionRecord, Payload};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Append-only record log shared by all request handlers
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stamp and append one record, returning it with its assigned id.
    async fn append(&self, source_address: String, payload: Payload) -> Result<IngestionRecord>;

    /// Copy of every record in insertion order.
    async fn snapshot(&self) -> Result<Vec<IngestionRecord>>;

    /// Record by 1-based id.
    async fn get(&self, id: usize) -> Result<Option<IngestionRecord>>;

    async fn count(&self) -> Result<usize>;
}

/// In-memory log, lost on restart
#[derive(Clone, Default)]
pub struct InMemoryLog {
    records: Arc<Mutex<Vec<IngestionRecord>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the guard cannot leave a half-pushed record behind,
    // so a poisoned lock is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, Vec<IngestionRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| {
            warn!("Record log lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl RecordStore for InMemoryLog {
    async fn append(&self, source_address: String, payload: Payload) -> Result<IngestionRecord> {
        let mut records = self.lock();
        // id and timestamp are assigned under the lock so both follow commit order
        let record = IngestionRecord {
            id: records.len() + 1,
            timestamp: Utc::now(),
            source_address,
            payload,
        };
        records.push(record.clone());

        debug!("Appended record {} ({})", record.id, record.payload.kind());
        Ok(record)
    }

    async fn snapshot(&self) -> Result<Vec<IngestionRecord>> {
        Ok(self.lock().clone())
    }

    async fn get(&self, id: usize) -> Result<Option<IngestionRecord>> {
        let records = self.lock();
        Ok(id
            .checked_sub(1)
            .and_then(|index| records.get(index))
            .cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.lock().len())
    }
}
