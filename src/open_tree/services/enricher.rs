//! Enrichment provider resolving taxa against the Open Tree of Life.

use crate::enricher::{
    domain::EnrichableSubject,
    ports::{EnrichmentProvider, EnrichmentProviderError, EnrichmentProviderResult},
};
use crate::open_tree::{
    domain::{OpenTreeEntry, join_lineage, pivot_lineage, select_preferred_matches},
    ports::{OpenTreeEntryRepository, TaxonomyService},
};
use crate::task::domain::{FailureReason, Task};
use crate::taxon::domain::Taxon;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Registered enricher name; also used as its task type name.
pub const OPEN_TREE_ENRICHER_NAME: &str = "Open Tree of Life";

/// Source repository recorded with the registration.
pub const OPEN_TREE_REPOSITORY: &str = "https://tree.opentreeoflife.org";

/// Description stored with the task type.
pub const OPEN_TREE_TASK_TYPE_DESCRIPTION: &str =
    "Resolve a taxon name and its lineage against the Open Tree of Life taxonomy";

const DEFAULT_START_INTERVAL: Duration = Duration::from_secs(1);

/// Resolves each taxon without an entry and stores the accepted match.
pub struct OpenTreeEnricher<T, O, C>
where
    T: TaxonomyService,
    O: OpenTreeEntryRepository,
    C: Clock + Send + Sync,
{
    taxonomy: Arc<T>,
    entries: Arc<O>,
    clock: Arc<C>,
    start_interval: Duration,
}

impl<T, O, C> OpenTreeEnricher<T, O, C>
where
    T: TaxonomyService,
    O: OpenTreeEntryRepository,
    C: Clock + Send + Sync,
{
    /// Creates the provider with a one second start-attempt interval.
    #[must_use]
    pub const fn new(taxonomy: Arc<T>, entries: Arc<O>, clock: Arc<C>) -> Self {
        Self {
            taxonomy,
            entries,
            clock,
            start_interval: DEFAULT_START_INTERVAL,
        }
    }

    /// Overrides the interval between start-condition checks.
    #[must_use]
    pub const fn with_start_interval(mut self, interval: Duration) -> Self {
        self.start_interval = interval;
        self
    }

    async fn has_no_entry(&self, taxon: &Taxon) -> EnrichmentProviderResult<bool> {
        let existing = self
            .entries
            .find_by_taxon(taxon.id())
            .await
            .map_err(EnrichmentProviderError::new)?;
        Ok(existing.is_none())
    }

    async fn resolve(&self, taxon: &Taxon) -> Result<OpenTreeEntry, FailureReason> {
        let name = taxon.name().as_str().to_owned();
        let resolution = self
            .taxonomy
            .match_names(std::slice::from_ref(&name))
            .await
            .map_err(|err| FailureReason::new(format!("name resolution failed for {name}: {err}")))?;
        let version = resolution.taxonomy_version;

        let Some(matched) = select_preferred_matches(resolution.matches).into_iter().next() else {
            return Err(FailureReason::new(format!(
                "no Open Tree of Life match for {name}"
            )));
        };
        debug!(
            taxon = %name,
            ott_id = %matched.ott_id,
            is_synonym = matched.is_synonym,
            "selected name match"
        );

        let rows = self
            .taxonomy
            .lineage(matched.ott_id)
            .await
            .map_err(|err| {
                FailureReason::new(format!("lineage lookup failed for {}: {err}", matched.ott_id))
            })?;
        let lineages = pivot_lineage(&rows);
        let resolved = join_lineage(vec![matched], &lineages)
            .into_iter()
            .next()
            .ok_or_else(|| FailureReason::new(format!("no lineage joined for {name}")))?;

        Ok(OpenTreeEntry::new(taxon.id(), resolved, version, &*self.clock))
    }
}

#[async_trait]
impl<T, O, C> EnrichmentProvider for OpenTreeEnricher<T, O, C>
where
    T: TaxonomyService,
    O: OpenTreeEntryRepository,
    C: Clock + Send + Sync,
{
    fn name(&self) -> &str {
        OPEN_TREE_ENRICHER_NAME
    }

    fn repository(&self) -> &str {
        OPEN_TREE_REPOSITORY
    }

    fn task_type_name(&self) -> &str {
        OPEN_TREE_ENRICHER_NAME
    }

    fn task_type_description(&self) -> &str {
        OPEN_TREE_TASK_TYPE_DESCRIPTION
    }

    fn sleep_between_start_attempts(&self) -> Duration {
        self.start_interval
    }

    async fn can_enrich(&self, subject: &EnrichableSubject) -> EnrichmentProviderResult<bool> {
        match subject {
            EnrichableSubject::Taxon(taxon) => self.has_no_entry(taxon).await,
            EnrichableSubject::DataPayload(_) => Ok(false),
        }
    }

    async fn task_can_start(
        &self,
        subject: &EnrichableSubject,
        _task: &Task,
    ) -> EnrichmentProviderResult<bool> {
        self.can_enrich(subject).await
    }

    async fn new_elements_to_enrich(&self) -> EnrichmentProviderResult<Vec<EnrichableSubject>> {
        let taxa = self
            .entries
            .list_taxa_without_entry()
            .await
            .map_err(EnrichmentProviderError::new)?;
        Ok(taxa.into_iter().map(EnrichableSubject::from).collect())
    }

    async fn enrich(&self, subject: &EnrichableSubject, task: &Task) -> Result<(), FailureReason> {
        let EnrichableSubject::Taxon(taxon) = subject else {
            return Err(FailureReason::new(format!(
                "{OPEN_TREE_ENRICHER_NAME} only enriches taxa, got {}",
                subject.key()
            )));
        };

        let entry = self.resolve(taxon).await?;
        self.entries
            .store(&entry)
            .await
            .map_err(|err| FailureReason::new(format!("could not store entry: {err}")))?;
        info!(
            task_id = %task.id(),
            taxon = %taxon.name(),
            ott_id = %entry.ott_id(),
            resolved = entry.resolved_taxon_name(),
            "stored Open Tree of Life entry"
        );
        Ok(())
    }
}
