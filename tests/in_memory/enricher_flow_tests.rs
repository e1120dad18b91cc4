//! Worker polling behaviour with an Open Tree of Life provider over a
//! canned taxonomy.

use super::world::{World, world};
use async_trait::async_trait;
use emikg_enrichers::{
    enricher::{
        domain::{EnrichableSubject, PollBackoff, StartGatePolicy},
        ports::EnricherRepository,
        services::EnricherService,
    },
    open_tree::{
        adapters::memory::InMemoryOpenTreeEntryRepository,
        domain::{LineageRow, NameMatch, OttId, TaxonomicRank},
        ports::{
            NameResolution, OpenTreeEntryRepository, TaxonomyService, TaxonomyServiceError,
            TaxonomyServiceResult,
        },
        services::OpenTreeEnricher,
    },
    task::domain::{ActorId, TaskState},
    taxon::{
        adapters::memory::InMemoryTaxonRepository,
        domain::{Taxon, TaxonName},
        ports::TaxonRepository,
    },
};
use eyre::{OptionExt, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Taxonomy answering only for the names it was built with.
struct CannedTaxonomy {
    known: HashMap<String, u64>,
}

impl CannedTaxonomy {
    fn knowing(names: &[(&str, u64)]) -> Self {
        Self {
            known: names
                .iter()
                .map(|(name, ott)| ((*name).to_owned(), *ott))
                .collect(),
        }
    }
}

#[async_trait]
impl TaxonomyService for CannedTaxonomy {
    async fn match_names(&self, names: &[String]) -> TaxonomyServiceResult<NameResolution> {
        let matches = names
            .iter()
            .filter_map(|name| {
                self.known.get(name).map(|ott| NameMatch {
                    search_string: name.to_lowercase(),
                    matched_name: name.clone(),
                    ott_id: OttId::new(*ott),
                    score: 1.0,
                    is_synonym: false,
                    is_approximate_match: false,
                })
            })
            .collect();
        Ok(NameResolution {
            taxonomy_version: "3.6".to_owned(),
            matches,
        })
    }

    async fn lineage(&self, ott_id: OttId) -> TaxonomyServiceResult<Vec<LineageRow>> {
        let name = self
            .known
            .iter()
            .find(|(_, ott)| **ott == ott_id.value())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| TaxonomyServiceError::Status {
                status: 400,
                body: format!("unknown {ott_id}"),
            })?;
        Ok(vec![LineageRow {
            query: ott_id,
            rank: "species".to_owned(),
            name,
        }])
    }
}

type Entries = InMemoryOpenTreeEntryRepository<InMemoryTaxonRepository>;

fn open_tree(
    world: &World,
    taxonomy: CannedTaxonomy,
) -> (Arc<OpenTreeEnricher<CannedTaxonomy, Entries, DefaultClock>>, Arc<Entries>) {
    let entries = Arc::new(InMemoryOpenTreeEntryRepository::new(Arc::clone(&world.taxa)));
    let provider = OpenTreeEnricher::new(
        Arc::new(taxonomy),
        Arc::clone(&entries),
        Arc::clone(&world.clock),
    )
    .with_start_interval(Duration::from_millis(1));
    (Arc::new(provider), entries)
}

async fn add_taxon(world: &World, name: &str) -> eyre::Result<Taxon> {
    let taxon = Taxon::new(TaxonName::new(name)?, "", ActorId::new(), &DefaultClock);
    world.taxa.store(&taxon).await?;
    Ok(taxon)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failing_subject_does_not_stop_the_batch(world: World) -> eyre::Result<()> {
    let unknown = add_taxon(&world, "Nonexistentia fabulosa").await?;
    let human = add_taxon(&world, "Homo sapiens").await?;
    let (provider, entries) = open_tree(&world, CannedTaxonomy::knowing(&[("Homo sapiens", 770_315)]));
    let service = EnricherService::register(
        provider,
        Arc::clone(&world.enrichers),
        world.tasks.clone(),
        Arc::clone(&world.clock),
        StartGatePolicy::new(3, None),
    )
    .await?;

    ensure!(service.enrich_all().await?);

    let stored = entries
        .find_by_taxon(human.id())
        .await?
        .ok_or_eyre("the second taxon should be enriched")?;
    ensure!(stored.ranks().get(TaxonomicRank::Species) == Some("Homo sapiens"));
    let link = world
        .enrichers
        .latest_task_for_subject(service.identity().id(), EnrichableSubject::from(unknown).key())
        .await?
        .ok_or_eyre("the first taxon should have a task")?;
    let failed = world
        .tasks
        .find_by_id(link.task())
        .await?
        .ok_or_eyre("task should exist")?;
    ensure!(failed.state() == TaskState::Failure);
    ensure!(failed.owner() == service.identity().actor_id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_subjects_wait_for_a_restart(world: World) -> eyre::Result<()> {
    let unknown = add_taxon(&world, "Nonexistentia fabulosa").await?;
    let (provider, _entries) = open_tree(&world, CannedTaxonomy::knowing(&[]));
    let service = EnricherService::register(
        provider,
        Arc::clone(&world.enrichers),
        world.tasks.clone(),
        Arc::clone(&world.clock),
        StartGatePolicy::new(3, None),
    )
    .await?;
    let key = EnrichableSubject::from(unknown).key();

    ensure!(!service.enrich_all().await?);
    let first = world
        .enrichers
        .latest_task_for_subject(service.identity().id(), key)
        .await?
        .ok_or_eyre("subject should be linked")?;
    ensure!(!service.enrich_all().await?);
    let documents_before = world.tasks.documents(first.task()).await?.len();

    world.tasks.restart(first.task()).await?;
    ensure!(!service.enrich_all().await?);

    let second = world
        .enrichers
        .latest_task_for_subject(service.identity().id(), key)
        .await?
        .ok_or_eyre("subject should still be linked")?;
    ensure!(second.task() == first.task());
    ensure!(documents_before == 1);
    ensure!(world.tasks.documents(first.task()).await?.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registering_twice_reuses_the_identity(world: World) -> eyre::Result<()> {
    let (first_provider, _) = open_tree(&world, CannedTaxonomy::knowing(&[]));
    let (second_provider, _) = open_tree(&world, CannedTaxonomy::knowing(&[]));

    let first = EnricherService::register(
        first_provider,
        Arc::clone(&world.enrichers),
        world.tasks.clone(),
        Arc::clone(&world.clock),
        StartGatePolicy::default(),
    )
    .await?;
    let second = EnricherService::register(
        second_provider,
        Arc::clone(&world.enrichers),
        world.tasks.clone(),
        Arc::clone(&world.clock),
        StartGatePolicy::default(),
    )
    .await?;

    ensure!(first.identity().id() == second.identity().id());
    ensure!(first.task_type().id() == second.task_type().id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn service_stops_when_shutdown_resolves(world: World) -> eyre::Result<()> {
    add_taxon(&world, "Homo sapiens").await?;
    let (provider, entries) = open_tree(&world, CannedTaxonomy::knowing(&[("Homo sapiens", 770_315)]));
    let mut service = EnricherService::register(
        provider,
        Arc::clone(&world.enrichers),
        world.tasks.clone(),
        Arc::clone(&world.clock),
        StartGatePolicy::default(),
    )
    .await?;

    tokio::time::timeout(
        Duration::from_secs(5),
        service.start_service(
            PollBackoff::new(Duration::from_secs(1), Duration::from_secs(60)),
            std::future::ready(()),
        ),
    )
    .await??;

    ensure!(entries.list_taxa_without_entry().await?.is_empty());
    let identity = world
        .enrichers
        .find_by_name(service.identity().name())
        .await?
        .ok_or_eyre("enricher should be registered")?;
    ensure!(identity.last_ping_at().is_some());
    Ok(())
}

#[rstest]
fn backoff_doubles_on_idle_cycles_and_halves_on_success() {
    let mut backoff = PollBackoff::new(Duration::from_secs(1), Duration::from_secs(60));

    let pauses: Vec<u64> = [false, false, true, false]
        .into_iter()
        .map(|any_success| backoff.record_cycle(any_success).as_secs())
        .collect();

    assert_eq!(pauses, vec![2, 4, 2, 4]);
}
