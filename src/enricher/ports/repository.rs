//! Persistence port for enricher identities and subject links.

use crate::enricher::domain::{EnricherId, EnricherIdentity, EnricherName, SubjectKey, SubjectTaskLink};
use crate::postgres::BlockingError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for enricher repository operations.
pub type EnricherRepositoryResult<T> = Result<T, EnricherRepositoryError>;

/// Enricher persistence contract.
#[async_trait]
pub trait EnricherRepository: Send + Sync {
    /// Finds an enricher by unique name.
    async fn find_by_name(
        &self,
        name: &EnricherName,
    ) -> EnricherRepositoryResult<Option<EnricherIdentity>>;

    /// Stores a new enricher.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherRepositoryError::DuplicateName`] when the name is
    /// taken.
    async fn register(&self, identity: &EnricherIdentity) -> EnricherRepositoryResult<()>;

    /// Persists the mutable fields of an existing enricher.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherRepositoryError::NotFound`] when the enricher does
    /// not exist.
    async fn update(&self, identity: &EnricherIdentity) -> EnricherRepositoryResult<()>;

    /// Records that `link.task` was used for `link.subject`.
    async fn link_subject_task(&self, link: &SubjectTaskLink) -> EnricherRepositoryResult<()>;

    /// Returns the most recently linked task for a subject.
    async fn latest_task_for_subject(
        &self,
        enricher: EnricherId,
        subject: SubjectKey,
    ) -> EnricherRepositoryResult<Option<SubjectTaskLink>>;
}

/// Errors returned by enricher repository implementations.
#[derive(Debug, Clone, Error)]
pub enum EnricherRepositoryError {
    /// An enricher with the same name already exists.
    #[error("duplicate enricher name: {0}")]
    DuplicateName(EnricherName),

    /// The enricher was not found.
    #[error("enricher not found: {0}")]
    NotFound(EnricherId),

    /// Persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EnricherRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BlockingError> for EnricherRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}
