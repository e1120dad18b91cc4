//! Shared in-memory wiring for the integration tests.

use emikg_enrichers::{
    enricher::adapters::memory::InMemoryEnricherRepository,
    payload::{adapters::memory::InMemoryDataPayloadRepository, services::DataPayloadService},
    task::{
        adapters::memory::{InMemoryDocumentStore, InMemoryTaskRepository},
        services::TaskLifecycleService,
    },
    taxon::adapters::memory::InMemoryTaxonRepository,
};
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Task lifecycle service over in-memory adapters.
pub type Tasks = TaskLifecycleService<InMemoryTaskRepository, InMemoryDocumentStore, DefaultClock>;

/// Payload intake over in-memory adapters.
pub type Intake = DataPayloadService<
    InMemoryDataPayloadRepository,
    InMemoryTaskRepository,
    InMemoryDocumentStore,
    DefaultClock,
>;

/// Every in-memory repository a worker needs, sharing one task store.
pub struct World {
    /// Shared clock.
    pub clock: Arc<DefaultClock>,
    /// Document contents written by failing tasks.
    pub documents: Arc<InMemoryDocumentStore>,
    /// Task lifecycle service.
    pub tasks: Tasks,
    /// Enricher registrations and subject links.
    pub enrichers: Arc<InMemoryEnricherRepository>,
    /// Curated taxa.
    pub taxa: Arc<InMemoryTaxonRepository>,
    /// Uploaded payloads.
    pub payloads: Arc<InMemoryDataPayloadRepository>,
}

impl World {
    /// Returns a payload intake service writing below `/unsafe_data_payloads`.
    pub fn intake(&self) -> Intake {
        DataPayloadService::new(
            Arc::clone(&self.payloads),
            self.tasks.clone(),
            Utf8PathBuf::from("/unsafe_data_payloads"),
            Arc::clone(&self.clock),
        )
    }
}

/// Provides a fresh set of in-memory repositories.
#[fixture]
pub fn world() -> World {
    let clock = Arc::new(DefaultClock);
    let documents = Arc::new(InMemoryDocumentStore::new());
    World {
        tasks: TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&documents),
            Arc::clone(&clock),
        ),
        clock,
        documents,
        enrichers: Arc::new(InMemoryEnricherRepository::new()),
        taxa: Arc::new(InMemoryTaxonRepository::new()),
        payloads: Arc::new(InMemoryDataPayloadRepository::new()),
    }
}
