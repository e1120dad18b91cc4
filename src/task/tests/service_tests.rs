//! Service orchestration tests for task lifecycle operations.

use std::sync::Arc;

use crate::task::{
    adapters::memory::{InMemoryDocumentStore, InMemoryTaskRepository},
    domain::{ActorId, DerivedTask, DerivedTaskId, FailureReason, TaskState, TransitionOutcome},
    ports::{TaskRepository, TaskRepositoryError},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use eyre::{OptionExt, ensure};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

type TestService = TaskLifecycleService<InMemoryTaskRepository, InMemoryDocumentStore, DefaultClock>;

struct Harness {
    service: TestService,
    store: InMemoryDocumentStore,
}

#[fixture]
fn harness() -> Harness {
    let store = InMemoryDocumentStore::new();
    let service = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
    );
    Harness { service, store }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ensure_task_type_is_find_or_create(harness: Harness) -> eyre::Result<()> {
    let first = harness
        .service
        .ensure_task_type("Open Tree of Life", "taxonomy lookup")
        .await?;
    let second = harness
        .service
        .ensure_task_type(" Open Tree of Life ", "ignored on reuse")
        .await?;

    ensure!(first == second);
    ensure!(second.description() == "taxonomy lookup");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_pending_and_retrievable(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let owner = ActorId::new();

    let task = harness.service.create_task(owner, task_type.id()).await?;
    let fetched = harness
        .service
        .find_by_id(task.id())
        .await?
        .ok_or_eyre("task should be stored")?;

    ensure!(fetched == task);
    ensure!(fetched.state() == TaskState::Pending);
    ensure!(fetched.owner() == owner);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fail_writes_exactly_one_reason_document(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let task = harness
        .service
        .create_task(ActorId::new(), task_type.id())
        .await?;
    harness.service.start(task.id()).await?;
    let reason = FailureReason::new("remote service unavailable").with_detail("HTTP 503");

    let first = harness.service.fail(task.id(), Some(&reason)).await?;
    let failed_at = harness
        .service
        .find_by_id(task.id())
        .await?
        .ok_or_eyre("task should exist")?
        .updated_at();
    let second = harness.service.fail(task.id(), Some(&reason)).await?;

    ensure!(first == TransitionOutcome::Changed);
    ensure!(second == TransitionOutcome::Unchanged);
    let documents = harness.service.documents(task.id()).await?;
    ensure!(documents.len() == 1);
    let document = documents.first().ok_or_eyre("document should exist")?;
    let contents = harness
        .store
        .contents(document.path())?
        .ok_or_eyre("document contents should be written")?;
    ensure!(contents == "remote service unavailable\n\nHTTP 503\n");
    let refetched = harness
        .service
        .find_by_id(task.id())
        .await?
        .ok_or_eyre("task should exist")?;
    ensure!(refetched.state() == TaskState::Failure);
    ensure!(refetched.updated_at() == failed_at);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fail_without_reason_writes_no_document(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let task = harness
        .service
        .create_task(ActorId::new(), task_type.id())
        .await?;
    harness.service.start(task.id()).await?;

    harness.service.fail(task.id(), None).await?;

    ensure!(harness.service.documents(task.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn succeed_requires_started_task(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let task = harness
        .service
        .create_task(ActorId::new(), task_type.id())
        .await?;

    let result = harness.service.succeed(task.id()).await;

    ensure!(matches!(result, Err(TaskLifecycleError::Domain(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restart_makes_failed_task_pending_again(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let task = harness
        .service
        .create_task(ActorId::new(), task_type.id())
        .await?;
    harness.service.start(task.id()).await?;
    harness.service.fail(task.id(), None).await?;

    let restarted = harness.service.restart(task.id()).await?;

    ensure!(restarted.state() == TaskState::Pending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn spawned_children_are_listed_in_creation_order(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let owner = ActorId::new();
    let parent = harness.service.create_task(owner, task_type.id()).await?;

    let first = harness
        .service
        .spawn_derived(parent.id(), owner, task_type.id())
        .await?;
    let second = harness
        .service
        .spawn_derived(parent.id(), owner, task_type.id())
        .await?;

    let children: Vec<_> = harness
        .service
        .derived_tasks(parent.id())
        .await?
        .iter()
        .map(crate::task::domain::Task::id)
        .collect();
    ensure!(children == vec![first.id(), second.id()]);
    let found_parent = harness
        .service
        .parent_task(second.id())
        .await?
        .ok_or_eyre("child should have a parent")?;
    ensure!(found_parent.id() == parent.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn spawn_derived_rejects_missing_parent(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let missing = crate::task::domain::TaskId::new();

    let result = harness
        .service
        .spawn_derived(missing, ActorId::new(), task_type.id())
        .await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Repository(TaskRepositoryError::NotFound(id))) if id == missing
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_task_cascades_to_edges_and_documents(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let owner = ActorId::new();
    let parent = harness.service.create_task(owner, task_type.id()).await?;
    let child = harness
        .service
        .spawn_derived(parent.id(), owner, task_type.id())
        .await?;
    harness
        .service
        .attach_document(&parent, "output", "result", "42")
        .await?;

    harness.service.delete_task(parent.id()).await?;

    ensure!(harness.service.find_by_id(parent.id()).await?.is_none());
    ensure!(harness.service.parent_task(child.id()).await?.is_none());
    ensure!(harness.service.documents(parent.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn derived_pair_is_stored_once(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let owner = ActorId::new();
    let parent = harness.service.create_task(owner, task_type.id()).await?;
    let child = harness
        .service
        .spawn_derived(parent.id(), owner, task_type.id())
        .await?;

    let again = DerivedTask::new(parent.id(), child.id(), &DefaultClock)?;
    let result = harness.service.repository().store_derived(&again).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateDerivedTask { parent: p, child: c })
            if p == parent.id() && c == child.id()
    ));
    ensure!(harness.service.derived_tasks(parent.id()).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repository_rejects_self_referential_edge(harness: Harness) -> eyre::Result<()> {
    let task_type = harness.service.ensure_task_type("Example", "").await?;
    let task = harness
        .service
        .create_task(ActorId::new(), task_type.id())
        .await?;

    let self_loop =
        DerivedTask::from_persisted(DerivedTaskId::new(), task.id(), task.id(), DefaultClock.utc());
    let result = harness.service.repository().store_derived(&self_loop).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::SelfReferentialDerivedTask(id)) if id == task.id()
    ));
    ensure!(harness.service.parent_task(task.id()).await?.is_none());
    ensure!(harness.service.derived_tasks(task.id()).await?.is_empty());
    Ok(())
}
