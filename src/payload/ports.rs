//! Persistence port for data payloads and their pipeline entries.

use super::domain::{DataPayload, PayloadId, PipelineEntry};
use crate::postgres::BlockingError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for payload repository operations.
pub type DataPayloadRepositoryResult<T> = Result<T, DataPayloadRepositoryError>;

/// Data payload persistence contract.
#[async_trait]
pub trait DataPayloadRepository: Send + Sync {
    /// Stores a new payload.
    ///
    /// # Errors
    ///
    /// Returns [`DataPayloadRepositoryError::DuplicatePayload`] when the
    /// identifier already exists.
    async fn store(&self, payload: &DataPayload) -> DataPayloadRepositoryResult<()>;

    /// Finds a payload by identifier.
    async fn find_by_id(&self, id: PayloadId) -> DataPayloadRepositoryResult<Option<DataPayload>>;

    /// Lists payloads the pipeline has not completed, oldest first.
    async fn list_without_pipeline_entry(&self) -> DataPayloadRepositoryResult<Vec<DataPayload>>;

    /// Returns whether the pipeline completed for `payload`.
    async fn has_pipeline_entry(&self, payload: PayloadId) -> DataPayloadRepositoryResult<bool>;

    /// Records pipeline completion for a payload.
    ///
    /// # Errors
    ///
    /// Returns [`DataPayloadRepositoryError::DuplicatePipelineEntry`] when the
    /// payload already has an entry and
    /// [`DataPayloadRepositoryError::NotFound`] when the payload is unknown.
    async fn record_pipeline_entry(&self, entry: &PipelineEntry) -> DataPayloadRepositoryResult<()>;
}

/// Errors returned by payload repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DataPayloadRepositoryError {
    /// A payload with the same identifier already exists.
    #[error("duplicate payload identifier: {0}")]
    DuplicatePayload(PayloadId),

    /// The payload already has a pipeline entry.
    #[error("payload {0} already has a pipeline entry")]
    DuplicatePipelineEntry(PayloadId),

    /// The payload was not found.
    #[error("payload not found: {0}")]
    NotFound(PayloadId),

    /// Persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DataPayloadRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BlockingError> for DataPayloadRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}
