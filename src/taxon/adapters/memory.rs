//! In-memory taxon repository for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::taxon::{
    domain::{Taxon, TaxonId},
    ports::{TaxonRepository, TaxonRepositoryError, TaxonRepositoryResult},
};

/// Thread-safe in-memory taxon repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaxonRepository {
    taxa: Arc<RwLock<HashMap<TaxonId, Taxon>>>,
}

impl InMemoryTaxonRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TaxonRepositoryError {
    TaxonRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaxonRepository for InMemoryTaxonRepository {
    async fn store(&self, taxon: &Taxon) -> TaxonRepositoryResult<()> {
        let mut taxa = self.taxa.write().map_err(lock_error)?;
        if taxa.contains_key(&taxon.id()) {
            return Err(TaxonRepositoryError::DuplicateTaxon(taxon.id()));
        }
        taxa.insert(taxon.id(), taxon.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaxonId) -> TaxonRepositoryResult<Option<Taxon>> {
        let taxa = self.taxa.read().map_err(lock_error)?;
        Ok(taxa.get(&id).cloned())
    }

    async fn list(&self) -> TaxonRepositoryResult<Vec<Taxon>> {
        let taxa = self.taxa.read().map_err(lock_error)?;
        let mut listed: Vec<Taxon> = taxa.values().cloned().collect();
        listed.sort_by_key(|taxon| (taxon.created_at(), taxon.id()));
        Ok(listed)
    }
}
