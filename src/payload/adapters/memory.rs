//! In-memory payload repository for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::payload::{
    domain::{DataPayload, PayloadId, PipelineEntry},
    ports::{DataPayloadRepository, DataPayloadRepositoryError, DataPayloadRepositoryResult},
};

/// Thread-safe in-memory payload repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataPayloadRepository {
    state: Arc<RwLock<InMemoryPayloadState>>,
}

#[derive(Debug, Default)]
struct InMemoryPayloadState {
    payloads: HashMap<PayloadId, DataPayload>,
    entries: HashMap<PayloadId, PipelineEntry>,
}

impl InMemoryDataPayloadRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DataPayloadRepositoryResult<RwLockReadGuard<'_, InMemoryPayloadState>> {
        self.state.read().map_err(|err| {
            DataPayloadRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> DataPayloadRepositoryResult<RwLockWriteGuard<'_, InMemoryPayloadState>> {
        self.state.write().map_err(|err| {
            DataPayloadRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl DataPayloadRepository for InMemoryDataPayloadRepository {
    async fn store(&self, payload: &DataPayload) -> DataPayloadRepositoryResult<()> {
        let mut state = self.write()?;
        if state.payloads.contains_key(&payload.id()) {
            return Err(DataPayloadRepositoryError::DuplicatePayload(payload.id()));
        }
        state.payloads.insert(payload.id(), payload.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PayloadId) -> DataPayloadRepositoryResult<Option<DataPayload>> {
        let state = self.read()?;
        Ok(state.payloads.get(&id).cloned())
    }

    async fn list_without_pipeline_entry(&self) -> DataPayloadRepositoryResult<Vec<DataPayload>> {
        let state = self.read()?;
        let mut pending: Vec<DataPayload> = state
            .payloads
            .values()
            .filter(|payload| !state.entries.contains_key(&payload.id()))
            .cloned()
            .collect();
        pending.sort_by_key(|payload| (payload.created_at(), payload.id()));
        Ok(pending)
    }

    async fn has_pipeline_entry(&self, payload: PayloadId) -> DataPayloadRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state.entries.contains_key(&payload))
    }

    async fn record_pipeline_entry(&self, entry: &PipelineEntry) -> DataPayloadRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.payloads.contains_key(&entry.payload()) {
            return Err(DataPayloadRepositoryError::NotFound(entry.payload()));
        }
        if state.entries.contains_key(&entry.payload()) {
            return Err(DataPayloadRepositoryError::DuplicatePipelineEntry(
                entry.payload(),
            ));
        }
        state.entries.insert(entry.payload(), entry.clone());
        Ok(())
    }
}
