//! In-memory enricher repository for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::enricher::{
    domain::{EnricherId, EnricherIdentity, EnricherName, SubjectKey, SubjectTaskLink},
    ports::{EnricherRepository, EnricherRepositoryError, EnricherRepositoryResult},
};

/// Thread-safe in-memory enricher repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnricherRepository {
    state: Arc<RwLock<InMemoryEnricherState>>,
}

#[derive(Debug, Default)]
struct InMemoryEnricherState {
    enrichers: HashMap<EnricherId, EnricherIdentity>,
    name_index: HashMap<EnricherName, EnricherId>,
    links: Vec<SubjectTaskLink>,
}

impl InMemoryEnricherRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EnricherRepositoryResult<RwLockReadGuard<'_, InMemoryEnricherState>> {
        self.state.read().map_err(|err| {
            EnricherRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> EnricherRepositoryResult<RwLockWriteGuard<'_, InMemoryEnricherState>> {
        self.state.write().map_err(|err| {
            EnricherRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl EnricherRepository for InMemoryEnricherRepository {
    async fn find_by_name(
        &self,
        name: &EnricherName,
    ) -> EnricherRepositoryResult<Option<EnricherIdentity>> {
        let state = self.read()?;
        Ok(state
            .name_index
            .get(name)
            .and_then(|id| state.enrichers.get(id))
            .cloned())
    }

    async fn register(&self, identity: &EnricherIdentity) -> EnricherRepositoryResult<()> {
        let mut state = self.write()?;
        if state.name_index.contains_key(identity.name()) {
            return Err(EnricherRepositoryError::DuplicateName(identity.name().clone()));
        }
        state
            .name_index
            .insert(identity.name().clone(), identity.id());
        state.enrichers.insert(identity.id(), identity.clone());
        Ok(())
    }

    async fn update(&self, identity: &EnricherIdentity) -> EnricherRepositoryResult<()> {
        let mut state = self.write()?;
        let existing = state
            .enrichers
            .get_mut(&identity.id())
            .ok_or(EnricherRepositoryError::NotFound(identity.id()))?;
        *existing = identity.clone();
        Ok(())
    }

    async fn link_subject_task(&self, link: &SubjectTaskLink) -> EnricherRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.enrichers.contains_key(&link.enricher()) {
            return Err(EnricherRepositoryError::NotFound(link.enricher()));
        }
        state.links.push(link.clone());
        Ok(())
    }

    async fn latest_task_for_subject(
        &self,
        enricher: EnricherId,
        subject: SubjectKey,
    ) -> EnricherRepositoryResult<Option<SubjectTaskLink>> {
        let state = self.read()?;
        Ok(state
            .links
            .iter()
            .rev()
            .find(|link| link.enricher() == enricher && link.subject() == subject)
            .cloned())
    }
}
