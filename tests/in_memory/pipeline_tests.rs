//! Dirty Pipeline runs over submitted payloads, including a restart after a
//! failed stage.

use super::world::{World, world};
use emikg_enrichers::{
    dirty_pipeline::{
        adapters::scripted::ScriptedStageRunner, domain::default_stages,
        services::DirtyPipelineEnricher,
    },
    enricher::{domain::StartGatePolicy, services::EnricherService},
    payload::ports::DataPayloadRepository,
    task::domain::{ActorId, TaskState},
};
use eyre::{OptionExt, ensure};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

async fn run_pipeline(world: &World, runner: ScriptedStageRunner) -> eyre::Result<bool> {
    let provider = DirtyPipelineEnricher::new(
        Arc::clone(&world.payloads),
        world.tasks.clone(),
        Arc::new(runner),
        Arc::clone(&world.clock),
        default_stages(),
    )
    .await?
    .with_start_interval(Duration::from_millis(1));
    let service = EnricherService::register(
        Arc::new(provider),
        Arc::clone(&world.enrichers),
        world.tasks.clone(),
        Arc::clone(&world.clock),
        StartGatePolicy::new(3, None),
    )
    .await?;
    Ok(service.enrich_all().await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restarted_run_completes_after_a_failed_stage(world: World) -> eyre::Result<()> {
    let payload = world.intake().submit(ActorId::new()).await?;

    let failing = ScriptedStageRunner::new().failing_stage("massive_id", 1, "timeout");
    ensure!(!run_pipeline(&world, failing).await?);
    ensure!(world.tasks.derived_tasks(payload.task()).await?.len() == 5);

    world.tasks.restart(payload.task()).await?;
    ensure!(run_pipeline(&world, ScriptedStageRunner::new()).await?);

    let run = world
        .tasks
        .find_by_id(payload.task())
        .await?
        .ok_or_eyre("payload task should exist")?;
    ensure!(run.state() == TaskState::Success);
    let stages = world.tasks.derived_tasks(payload.task()).await?;
    ensure!(stages.len() == 23);
    let successes = stages
        .iter()
        .filter(|stage| stage.state() == TaskState::Success)
        .count();
    ensure!(successes == 22);
    ensure!(world.payloads.has_pipeline_entry(payload.id()).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_submitted_payload_is_processed(world: World) -> eyre::Result<()> {
    let intake = world.intake();
    let first = intake.submit(ActorId::new()).await?;
    let second = intake.submit(ActorId::new()).await?;
    let runner = ScriptedStageRunner::new();

    ensure!(run_pipeline(&world, runner.clone()).await?);

    ensure!(runner.invocations().len() == 36);
    ensure!(world.payloads.list_without_pipeline_entry().await?.is_empty());
    for payload in [first, second] {
        let run = world
            .tasks
            .find_by_id(payload.task())
            .await?
            .ok_or_eyre("payload task should exist")?;
        ensure!(run.state() == TaskState::Success);
    }
    Ok(())
}
