//! Persistence port for taxa.

use super::domain::{Taxon, TaxonId};
use crate::postgres::BlockingError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for taxon repository operations.
pub type TaxonRepositoryResult<T> = Result<T, TaxonRepositoryError>;

/// Taxon persistence contract.
#[async_trait]
pub trait TaxonRepository: Send + Sync {
    /// Stores a new taxon.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonRepositoryError::DuplicateTaxon`] when the identifier
    /// already exists.
    async fn store(&self, taxon: &Taxon) -> TaxonRepositoryResult<()>;

    /// Finds a taxon by identifier.
    async fn find_by_id(&self, id: TaxonId) -> TaxonRepositoryResult<Option<Taxon>>;

    /// Lists every taxon, oldest first.
    async fn list(&self) -> TaxonRepositoryResult<Vec<Taxon>>;
}

/// Errors returned by taxon repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaxonRepositoryError {
    /// A taxon with the same identifier already exists.
    #[error("duplicate taxon identifier: {0}")]
    DuplicateTaxon(TaxonId),

    /// Persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaxonRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BlockingError> for TaxonRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}
