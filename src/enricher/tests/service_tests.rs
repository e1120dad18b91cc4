//! Service orchestration tests for the generic enrichment worker.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::enricher::{
    adapters::memory::InMemoryEnricherRepository,
    domain::{EnrichableSubject, PollBackoff, StartGatePolicy},
    ports::{EnricherRepository, EnrichmentProvider, EnrichmentProviderResult},
    services::{EnricherError, EnricherService},
};
use crate::task::{
    adapters::memory::{InMemoryDocumentStore, InMemoryTaskRepository},
    domain::{ActorId, FailureReason, Task, TaskState},
    services::TaskLifecycleService,
};
use crate::taxon::domain::{Taxon, TaxonId, TaxonName};
use async_trait::async_trait;
use eyre::{OptionExt, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

/// Provider whose answers are scripted per taxon.
#[derive(Default)]
struct ScriptedProvider {
    subjects: Vec<Taxon>,
    rejected: HashSet<TaxonId>,
    failing: HashSet<TaxonId>,
    never_ready: bool,
}

fn taxon_id(subject: &EnrichableSubject) -> Option<TaxonId> {
    match subject {
        EnrichableSubject::Taxon(taxon) => Some(taxon.id()),
        EnrichableSubject::DataPayload(_) => None,
    }
}

#[async_trait]
impl EnrichmentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn repository(&self) -> &str {
        "https://example.org/scripted"
    }

    fn task_type_name(&self) -> &str {
        "Scripted enrichment"
    }

    fn sleep_between_start_attempts(&self) -> Duration {
        Duration::from_millis(1)
    }

    async fn can_enrich(&self, subject: &EnrichableSubject) -> EnrichmentProviderResult<bool> {
        Ok(taxon_id(subject).is_some_and(|id| !self.rejected.contains(&id)))
    }

    async fn task_can_start(
        &self,
        _subject: &EnrichableSubject,
        _task: &Task,
    ) -> EnrichmentProviderResult<bool> {
        Ok(!self.never_ready)
    }

    async fn new_elements_to_enrich(&self) -> EnrichmentProviderResult<Vec<EnrichableSubject>> {
        Ok(self.subjects.iter().cloned().map(EnrichableSubject::from).collect())
    }

    async fn enrich(&self, subject: &EnrichableSubject, _task: &Task) -> Result<(), FailureReason> {
        let id = taxon_id(subject).ok_or_else(|| FailureReason::new("not a taxon"))?;
        if self.failing.contains(&id) {
            return Err(FailureReason::new("scripted failure"));
        }
        Ok(())
    }
}

type TestService = EnricherService<
    ScriptedProvider,
    InMemoryEnricherRepository,
    InMemoryTaskRepository,
    InMemoryDocumentStore,
    DefaultClock,
>;

struct Harness {
    enrichers: Arc<InMemoryEnricherRepository>,
    tasks: TaskLifecycleService<InMemoryTaskRepository, InMemoryDocumentStore, DefaultClock>,
}

#[fixture]
fn harness() -> Harness {
    Harness {
        enrichers: Arc::new(InMemoryEnricherRepository::new()),
        tasks: TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(DefaultClock),
        ),
    }
}

impl Harness {
    async fn service(&self, provider: ScriptedProvider) -> Result<TestService, EnricherError> {
        EnricherService::register(
            Arc::new(provider),
            Arc::clone(&self.enrichers),
            self.tasks.clone(),
            Arc::new(DefaultClock),
            StartGatePolicy::new(3, None),
        )
        .await
    }
}

fn taxon(name: &str) -> Taxon {
    Taxon::new(
        TaxonName::new(name).expect("valid taxon name"),
        "",
        ActorId::new(),
        &DefaultClock,
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registration_is_idempotent_by_name(harness: Harness) -> eyre::Result<()> {
    let first = harness.service(ScriptedProvider::default()).await?;
    let second = harness.service(ScriptedProvider::default()).await?;

    ensure!(first.identity().id() == second.identity().id());
    ensure!(first.task_type().id() == second.task_type().id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ping_updates_last_ping(harness: Harness) -> eyre::Result<()> {
    let mut service = harness.service(ScriptedProvider::default()).await?;

    service.ping().await?;

    let stored = harness
        .enrichers
        .find_by_name(service.identity().name())
        .await?
        .ok_or_eyre("enricher should be registered")?;
    ensure!(stored.last_ping_at().is_some());
    ensure!(stored.last_ping_at() == service.identity().last_ping_at());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_applicable_subject_is_rejected_before_task_creation(
    harness: Harness,
) -> eyre::Result<()> {
    let rejected = taxon("Canis lupus");
    let provider = ScriptedProvider {
        rejected: HashSet::from([rejected.id()]),
        ..ScriptedProvider::default()
    };
    let service = harness.service(provider).await?;
    let subject = EnrichableSubject::from(rejected);

    let result = service.enrich(&subject).await;

    ensure!(matches!(result, Err(EnricherError::NotApplicable { .. })));
    let link = harness
        .enrichers
        .latest_task_for_subject(service.identity().id(), subject.key())
        .await?;
    ensure!(link.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_enrichment_records_task_path(harness: Harness) -> eyre::Result<()> {
    let subject = EnrichableSubject::from(taxon("Homo sapiens"));
    let service = harness.service(ScriptedProvider::default()).await?;

    let succeeded = service.enrich(&subject).await?;

    ensure!(succeeded);
    let link = harness
        .enrichers
        .latest_task_for_subject(service.identity().id(), subject.key())
        .await?
        .ok_or_eyre("task should be linked")?;
    let task = harness
        .tasks
        .find_by_id(link.task())
        .await?
        .ok_or_eyre("task should exist")?;
    ensure!(task.state() == TaskState::Success);
    ensure!(task.owner() == service.identity().actor_id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_continues_after_failed_subject(harness: Harness) -> eyre::Result<()> {
    let failing = taxon("Pan troglodytes");
    let passing = taxon("Homo sapiens");
    let provider = ScriptedProvider {
        subjects: vec![failing.clone(), passing.clone()],
        failing: HashSet::from([failing.id()]),
        ..ScriptedProvider::default()
    };
    let service = harness.service(provider).await?;

    let any_success = service.enrich_all().await?;

    ensure!(any_success);
    let failed_link = harness
        .enrichers
        .latest_task_for_subject(
            service.identity().id(),
            EnrichableSubject::from(failing).key(),
        )
        .await?
        .ok_or_eyre("failed subject should be linked")?;
    let failed_task = harness
        .tasks
        .find_by_id(failed_link.task())
        .await?
        .ok_or_eyre("task should exist")?;
    ensure!(failed_task.state() == TaskState::Failure);
    let documents = harness.tasks.documents(failed_link.task()).await?;
    ensure!(documents.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finished_subjects_are_skipped_until_restarted(harness: Harness) -> eyre::Result<()> {
    let subject = taxon("Homo sapiens");
    let provider = ScriptedProvider {
        subjects: vec![subject.clone()],
        ..ScriptedProvider::default()
    };
    let service = harness.service(provider).await?;
    ensure!(service.enrich_all().await?);

    ensure!(!service.enrich_all().await?);

    let link = harness
        .enrichers
        .latest_task_for_subject(
            service.identity().id(),
            EnrichableSubject::from(subject).key(),
        )
        .await?
        .ok_or_eyre("subject should be linked")?;
    harness.tasks.restart(link.task()).await?;
    ensure!(service.enrich_all().await?);
    let task = harness
        .tasks
        .find_by_id(link.task())
        .await?
        .ok_or_eyre("task should exist")?;
    ensure!(task.state() == TaskState::Success);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stalled_start_marks_task_failed(harness: Harness) -> eyre::Result<()> {
    let subject = EnrichableSubject::from(taxon("Homo sapiens"));
    let provider = ScriptedProvider {
        never_ready: true,
        ..ScriptedProvider::default()
    };
    let service = harness.service(provider).await?;

    let result = service.enrich(&subject).await;

    let Err(EnricherError::Stalled {
        task: stalled_id,
        attempts,
    }) = &result
    else {
        eyre::bail!("expected a stall, got {result:?}");
    };
    ensure!(*attempts == 3);
    let stalled = harness
        .tasks
        .find_by_id(*stalled_id)
        .await?
        .ok_or_eyre("task should exist")?;
    ensure!(stalled.state() == TaskState::Failure);
    let documents = harness.tasks.documents(*stalled_id).await?;
    ensure!(documents.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_cycle_adapts_backoff(harness: Harness) -> eyre::Result<()> {
    let provider = ScriptedProvider {
        subjects: vec![taxon("Homo sapiens")],
        ..ScriptedProvider::default()
    };
    let mut service = harness.service(provider).await?;
    let mut backoff = PollBackoff::new(Duration::from_secs(1), Duration::from_secs(60));

    let after_success = service.run_cycle(&mut backoff).await?;
    let after_idle = service.run_cycle(&mut backoff).await?;

    // The only subject succeeds in the first cycle, leaving the second idle.
    ensure!(after_success == Duration::from_secs(1));
    ensure!(after_idle == Duration::from_secs(2));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_service_stops_on_shutdown(harness: Harness) -> eyre::Result<()> {
    let subject = taxon("Homo sapiens");
    let provider = ScriptedProvider {
        subjects: vec![subject.clone()],
        ..ScriptedProvider::default()
    };
    let mut service = harness.service(provider).await?;

    service
        .start_service(PollBackoff::default(), async {})
        .await?;

    let link = harness
        .enrichers
        .latest_task_for_subject(
            service.identity().id(),
            EnrichableSubject::from(subject).key(),
        )
        .await?;
    ensure!(link.is_some());
    Ok(())
}
