//! Task lifecycle behaviour across the service boundary.

use super::world::{World, world};
use camino::Utf8Path;
use emikg_enrichers::task::{
    adapters::{filesystem::DirectoryDocumentStore, memory::InMemoryTaskRepository},
    domain::{ActorId, FailureReason, TaskDomainError, TaskState, TransitionOutcome},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use eyre::{OptionExt, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restart_appends_pending_after_each_terminal_state(world: World) -> eyre::Result<()> {
    let task_type = world.tasks.ensure_task_type("Open Tree of Life", "").await?;
    let task = world.tasks.create_task(ActorId::new(), task_type.id()).await?;
    let mut seen = vec![task.state()];

    seen.push(world.tasks.start(task.id()).await?.state());
    seen.push(world.tasks.succeed(task.id()).await?.state());
    seen.push(world.tasks.restart(task.id()).await?.state());
    seen.push(world.tasks.start(task.id()).await?.state());
    world
        .tasks
        .fail(task.id(), Some(&FailureReason::new("service unavailable")))
        .await?;
    seen.push(
        world
            .tasks
            .find_by_id(task.id())
            .await?
            .ok_or_eyre("task should exist")?
            .state(),
    );
    seen.push(world.tasks.restart(task.id()).await?.state());

    ensure!(
        seen == vec![
            TaskState::Pending,
            TaskState::Started,
            TaskState::Success,
            TaskState::Pending,
            TaskState::Started,
            TaskState::Failure,
            TaskState::Pending,
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_twice_is_the_same_as_failing_once(world: World) -> eyre::Result<()> {
    let task_type = world.tasks.ensure_task_type("Massive ID", "").await?;
    let task = world.tasks.create_task(ActorId::new(), task_type.id()).await?;
    world.tasks.start(task.id()).await?;
    let reason = FailureReason::new("exit status 1").with_detail("Traceback ...");

    let first = world.tasks.fail(task.id(), Some(&reason)).await?;
    let after_first = world
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or_eyre("task should exist")?;
    let second = world.tasks.fail(task.id(), Some(&reason)).await?;
    let after_second = world
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or_eyre("task should exist")?;

    ensure!(first == TransitionOutcome::Changed);
    ensure!(second == TransitionOutcome::Unchanged);
    ensure!(after_first.updated_at() == after_second.updated_at());
    let documents = world.tasks.documents(task.id()).await?;
    ensure!(documents.len() == 1);
    let document = documents.first().ok_or_eyre("failure document")?;
    let contents = world
        .documents
        .contents(document.path())?
        .ok_or_eyre("document contents")?;
    ensure!(contents.contains("Traceback ..."));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn success_cannot_jump_to_failure(world: World) -> eyre::Result<()> {
    let task_type = world.tasks.ensure_task_type("Taxonomy enhancement", "").await?;
    let task = world.tasks.create_task(ActorId::new(), task_type.id()).await?;
    world.tasks.start(task.id()).await?;
    world.tasks.succeed(task.id()).await?;

    let result = world.tasks.fail(task.id(), None).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(TaskDomainError::InvalidStateTransition { .. }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_parent_removes_its_edges(world: World) -> eyre::Result<()> {
    let task_type = world.tasks.ensure_task_type("Data organization", "").await?;
    let owner = ActorId::new();
    let parent = world.tasks.create_task(owner, task_type.id()).await?;
    let child = world
        .tasks
        .spawn_derived(parent.id(), owner, task_type.id())
        .await?;

    let found_parent = world
        .tasks
        .parent_task(child.id())
        .await?
        .ok_or_eyre("child should have a parent")?;
    ensure!(found_parent.id() == parent.id());

    world.tasks.delete_task(parent.id()).await?;

    ensure!(world.tasks.parent_task(child.id()).await?.is_none());
    ensure!(world.tasks.find_by_id(child.id()).await?.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_reasons_land_in_the_document_directory() -> eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Utf8Path::from_path(dir.path()).ok_or_eyre("temp dir should be UTF-8")?;
    let tasks = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(DirectoryDocumentStore::open(root)?),
        Arc::new(DefaultClock),
    );
    let task_type = tasks.ensure_task_type("SIRIUS formula prediction", "").await?;
    let task = tasks.create_task(ActorId::new(), task_type.id()).await?;
    tasks.start(task.id()).await?;

    tasks
        .fail(task.id(), Some(&FailureReason::new("out of memory")))
        .await?;

    let documents = tasks.documents(task.id()).await?;
    let document = documents.first().ok_or_eyre("failure document")?;
    let written = std::fs::read_to_string(root.join(document.path()))?;
    ensure!(written == "out of memory\n");
    Ok(())
}
