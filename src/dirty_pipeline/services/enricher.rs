//! Enrichment provider running the stage chain on each data payload.

use crate::dirty_pipeline::{
    domain::{DirtyPipelineDomainError, PipelineStage, StageContext, validate_stages},
    ports::StageRunner,
};
use crate::enricher::{
    domain::EnrichableSubject,
    ports::{EnrichmentProvider, EnrichmentProviderError, EnrichmentProviderResult},
};
use crate::payload::{
    domain::{DataPayload, PipelineEntry},
    ports::DataPayloadRepository,
    services::{PAYLOAD_TASK_TYPE_DESCRIPTION, PAYLOAD_TASK_TYPE_NAME},
};
use crate::task::{
    domain::{FailureReason, Task, TaskTypeId},
    ports::{DocumentStore, TaskRepository},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Registered enricher name; also used as its repository.
pub const DIRTY_PIPELINE_NAME: &str = "Dirty Pipeline";

const DEFAULT_START_INTERVAL: Duration = Duration::from_secs(10);

/// Errors raised while setting up the pipeline.
#[derive(Debug, Error)]
pub enum DirtyPipelineError {
    /// The stage list is invalid.
    #[error(transparent)]
    Domain(#[from] DirtyPipelineDomainError),

    /// A stage task type could not be registered.
    #[error(transparent)]
    Task(#[from] TaskLifecycleError),
}

/// Result type for pipeline setup.
pub type DirtyPipelineResult<T> = Result<T, DirtyPipelineError>;

/// Runs every stage on payloads without a pipeline entry.
///
/// The run is recorded on the payload's own processing task, with one
/// derived task per stage.
pub struct DirtyPipelineEnricher<P, R, S, C, X>
where
    P: DataPayloadRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
    X: StageRunner,
{
    payloads: Arc<P>,
    tasks: TaskLifecycleService<R, S, C>,
    runner: Arc<X>,
    clock: Arc<C>,
    stages: Vec<PipelineStage>,
    stage_task_types: HashMap<String, TaskTypeId>,
    start_interval: Duration,
}

impl<P, R, S, C, X> DirtyPipelineEnricher<P, R, S, C, X>
where
    P: DataPayloadRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
    X: StageRunner,
{
    /// Validates `stages` and registers one task type per stage.
    ///
    /// # Errors
    ///
    /// Returns [`DirtyPipelineError::Domain`] for an invalid stage list and
    /// [`DirtyPipelineError::Task`] when a task type cannot be registered.
    pub async fn new(
        payloads: Arc<P>,
        tasks: TaskLifecycleService<R, S, C>,
        runner: Arc<X>,
        clock: Arc<C>,
        stages: Vec<PipelineStage>,
    ) -> DirtyPipelineResult<Self> {
        validate_stages(&stages)?;
        let mut stage_task_types = HashMap::with_capacity(stages.len());
        for stage in &stages {
            let task_type = tasks
                .ensure_task_type(&stage.task_type, &stage.description)
                .await?;
            stage_task_types.insert(stage.name.clone(), task_type.id());
        }
        info!(stages = stages.len(), "pipeline stages registered");

        Ok(Self {
            payloads,
            tasks,
            runner,
            clock,
            stages,
            stage_task_types,
            start_interval: DEFAULT_START_INTERVAL,
        })
    }

    /// Overrides the interval between start-condition checks.
    #[must_use]
    pub const fn with_start_interval(mut self, interval: Duration) -> Self {
        self.start_interval = interval;
        self
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    async fn has_no_entry(&self, payload: &DataPayload) -> EnrichmentProviderResult<bool> {
        let recorded = self
            .payloads
            .has_pipeline_entry(payload.id())
            .await
            .map_err(EnrichmentProviderError::new)?;
        Ok(!recorded)
    }

    async fn run_stage(
        &self,
        stage: &PipelineStage,
        payload: &DataPayload,
        parent: &Task,
    ) -> Result<(), FailureReason> {
        let task_type = self
            .stage_task_types
            .get(&stage.name)
            .copied()
            .ok_or_else(|| FailureReason::new(format!("stage {} has no task type", stage.name)))?;
        let child = self
            .tasks
            .spawn_derived(parent.id(), parent.owner(), task_type)
            .await
            .map_err(|err| bookkeeping_failure(stage, &err))?;
        self.tasks
            .start(child.id())
            .await
            .map_err(|err| bookkeeping_failure(stage, &err))?;

        let context = StageContext::new(payload.clone(), child.id(), parent.id());
        let outcome = match stage.render(&context) {
            Ok(invocation) => match self.runner.run(&invocation).await {
                Ok(output) if output.succeeded() => Ok(()),
                Ok(output) => Err(output.failure_reason(&invocation)),
                Err(err) => Err(FailureReason::new(format!("stage {} {err}", stage.name))),
            },
            Err(err) => Err(FailureReason::new(err.to_string())),
        };

        match outcome {
            Ok(()) => {
                self.tasks
                    .succeed(child.id())
                    .await
                    .map_err(|err| bookkeeping_failure(stage, &err))?;
                info!(stage = %stage.name, task_id = %child.id(), "stage succeeded");
                Ok(())
            }
            Err(reason) => {
                warn!(
                    stage = %stage.name,
                    task_id = %child.id(),
                    reason = reason.summary(),
                    "stage failed, aborting pipeline"
                );
                if let Err(err) = self.tasks.fail(child.id(), Some(&reason)).await {
                    warn!(task_id = %child.id(), error = %err, "could not record stage failure");
                }
                Err(reason)
            }
        }
    }
}

fn bookkeeping_failure(stage: &PipelineStage, err: &TaskLifecycleError) -> FailureReason {
    FailureReason::new(format!("task bookkeeping failed at stage {}: {err}", stage.name))
}

#[async_trait]
impl<P, R, S, C, X> EnrichmentProvider for DirtyPipelineEnricher<P, R, S, C, X>
where
    P: DataPayloadRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
    X: StageRunner,
{
    fn name(&self) -> &str {
        DIRTY_PIPELINE_NAME
    }

    fn repository(&self) -> &str {
        DIRTY_PIPELINE_NAME
    }

    fn task_type_name(&self) -> &str {
        PAYLOAD_TASK_TYPE_NAME
    }

    fn task_type_description(&self) -> &str {
        PAYLOAD_TASK_TYPE_DESCRIPTION
    }

    fn sleep_between_start_attempts(&self) -> Duration {
        self.start_interval
    }

    async fn can_enrich(&self, subject: &EnrichableSubject) -> EnrichmentProviderResult<bool> {
        match subject {
            EnrichableSubject::DataPayload(payload) => self.has_no_entry(payload).await,
            EnrichableSubject::Taxon(_) => Ok(false),
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
        let payloads = self
            .payloads
            .list_without_pipeline_entry()
            .await
            .map_err(EnrichmentProviderError::new)?;
        Ok(payloads.into_iter().map(EnrichableSubject::from).collect())
    }

    async fn enrich(&self, subject: &EnrichableSubject, task: &Task) -> Result<(), FailureReason> {
        let EnrichableSubject::DataPayload(payload) = subject else {
            return Err(FailureReason::new(format!(
                "{DIRTY_PIPELINE_NAME} only processes data payloads, got {}",
                subject.key()
            )));
        };

        for (position, stage) in self.stages.iter().enumerate() {
            self.run_stage(stage, payload, task).await.map_err(|reason| {
                let summary = format!(
                    "pipeline aborted at stage {} of {} ({}): {}",
                    position.saturating_add(1),
                    self.stages.len(),
                    stage.name,
                    reason.summary()
                );
                reason.with_summary(summary)
            })?;
        }

        let entry = PipelineEntry::new(payload.id(), &*self.clock);
        self.payloads
            .record_pipeline_entry(&entry)
            .await
            .map_err(|err| FailureReason::new(format!("could not record pipeline entry: {err}")))?;
        info!(payload_id = %payload.id(), task_id = %task.id(), "pipeline completed");
        Ok(())
    }
}
