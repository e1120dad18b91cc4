//! Persistence port for Open Tree of Life entries.

use crate::open_tree::domain::OpenTreeEntry;
use crate::postgres::BlockingError;
use crate::taxon::domain::{Taxon, TaxonId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for entry repository operations.
pub type OpenTreeEntryRepositoryResult<T> = Result<T, OpenTreeEntryRepositoryError>;

/// Open Tree of Life entry persistence contract.
#[async_trait]
pub trait OpenTreeEntryRepository: Send + Sync {
    /// Stores an entry.
    ///
    /// # Errors
    ///
    /// Returns [`OpenTreeEntryRepositoryError::DuplicateTaxon`] when the
    /// taxon already has an entry.
    async fn store(&self, entry: &OpenTreeEntry) -> OpenTreeEntryRepositoryResult<()>;

    /// Finds the entry for a taxon.
    async fn find_by_taxon(
        &self,
        taxon: TaxonId,
    ) -> OpenTreeEntryRepositoryResult<Option<OpenTreeEntry>>;

    /// Lists taxa that have no entry yet, oldest first.
    async fn list_taxa_without_entry(&self) -> OpenTreeEntryRepositoryResult<Vec<Taxon>>;
}

/// Errors returned by entry repository implementations.
#[derive(Debug, Clone, Error)]
pub enum OpenTreeEntryRepositoryError {
    /// The taxon already has an entry.
    #[error("taxon {0} already has an Open Tree of Life entry")]
    DuplicateTaxon(TaxonId),

    /// The taxon does not exist.
    #[error("taxon not found: {0}")]
    TaxonNotFound(TaxonId),

    /// Persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl OpenTreeEntryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BlockingError> for OpenTreeEntryRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}
