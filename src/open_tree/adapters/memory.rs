//! In-memory Open Tree of Life entry repository for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::open_tree::{
    domain::OpenTreeEntry,
    ports::{OpenTreeEntryRepository, OpenTreeEntryRepositoryError, OpenTreeEntryRepositoryResult},
};
use crate::taxon::{
    domain::{Taxon, TaxonId},
    ports::TaxonRepository,
};

/// Thread-safe in-memory entry repository reading taxa from `T`.
#[derive(Debug)]
pub struct InMemoryOpenTreeEntryRepository<T: TaxonRepository> {
    taxa: Arc<T>,
    entries: Arc<RwLock<HashMap<TaxonId, OpenTreeEntry>>>,
}

impl<T: TaxonRepository> Clone for InMemoryOpenTreeEntryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            taxa: Arc::clone(&self.taxa),
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: TaxonRepository> InMemoryOpenTreeEntryRepository<T> {
    /// Creates an empty repository over the given taxa.
    #[must_use]
    pub fn new(taxa: Arc<T>) -> Self {
        Self {
            taxa,
            entries: Arc::default(),
        }
    }
}

fn lock_error(err: impl ToString) -> OpenTreeEntryRepositoryError {
    OpenTreeEntryRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<T: TaxonRepository> OpenTreeEntryRepository for InMemoryOpenTreeEntryRepository<T> {
    async fn store(&self, entry: &OpenTreeEntry) -> OpenTreeEntryRepositoryResult<()> {
        let known = self
            .taxa
            .find_by_id(entry.taxon())
            .await
            .map_err(OpenTreeEntryRepositoryError::persistence)?;
        if known.is_none() {
            return Err(OpenTreeEntryRepositoryError::TaxonNotFound(entry.taxon()));
        }

        let mut entries = self.entries.write().map_err(lock_error)?;
        if entries.contains_key(&entry.taxon()) {
            return Err(OpenTreeEntryRepositoryError::DuplicateTaxon(entry.taxon()));
        }
        entries.insert(entry.taxon(), entry.clone());
        Ok(())
    }

    async fn find_by_taxon(
        &self,
        taxon: TaxonId,
    ) -> OpenTreeEntryRepositoryResult<Option<OpenTreeEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.get(&taxon).cloned())
    }

    async fn list_taxa_without_entry(&self) -> OpenTreeEntryRepositoryResult<Vec<Taxon>> {
        let taxa = self
            .taxa
            .list()
            .await
            .map_err(OpenTreeEntryRepositoryError::persistence)?;
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(taxa
            .into_iter()
            .filter(|taxon| !entries.contains_key(&taxon.id()))
            .collect())
    }
}
