//! Generic enrichment worker driving a provider through the task lifecycle.

use crate::enricher::{
    domain::{
        EnricherDomainError, EnricherIdentity, EnricherName, EnrichableSubject, PollBackoff,
        StartGatePolicy, SubjectKey, SubjectTaskLink,
    },
    ports::{
        EnricherRepository, EnricherRepositoryError, EnrichmentProvider, EnrichmentProviderError,
    },
};
use crate::task::{
    domain::{FailureReason, Task, TaskId, TaskState, TaskType},
    ports::{DocumentStore, TaskRepository},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors returned by enricher operations.
#[derive(Debug, Error)]
pub enum EnricherError {
    /// The subject is not something this enricher handles.
    #[error("enricher {enricher} cannot enrich {subject}")]
    NotApplicable {
        /// Enricher that rejected the subject.
        enricher: EnricherName,
        /// Rejected subject.
        subject: SubjectKey,
    },

    /// The start condition never held within the start-gate policy.
    #[error("task {task} stalled after {attempts} start attempts")]
    Stalled {
        /// Task marked failed as stalled.
        task: TaskId,
        /// Number of start checks performed.
        attempts: u32,
    },

    /// Enricher identity validation failed.
    #[error(transparent)]
    Domain(#[from] EnricherDomainError),

    /// Enricher persistence failed.
    #[error(transparent)]
    Repository(#[from] EnricherRepositoryError),

    /// Task bookkeeping failed.
    #[error(transparent)]
    Task(#[from] TaskLifecycleError),

    /// The provider failed to inspect or discover subjects.
    #[error(transparent)]
    Provider(#[from] EnrichmentProviderError),
}

impl EnricherError {
    /// Returns whether the error only concerns one subject, so a batch may
    /// carry on with the next one.
    #[must_use]
    pub const fn is_subject_scoped(&self) -> bool {
        matches!(
            self,
            Self::NotApplicable { .. }
                | Self::Stalled { .. }
                | Self::Task(TaskLifecycleError::Domain(_))
        )
    }
}

/// Result type for enricher operations.
pub type EnricherResult<T> = Result<T, EnricherError>;

/// Registered enricher bound to a provider.
///
/// Tasks it creates are owned by the enricher's bot actor and typed with the
/// provider's task type.
pub struct EnricherService<P, E, R, S, C>
where
    P: EnrichmentProvider,
    E: EnricherRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    provider: Arc<P>,
    enrichers: Arc<E>,
    tasks: TaskLifecycleService<R, S, C>,
    clock: Arc<C>,
    identity: EnricherIdentity,
    task_type: TaskType,
    start_gate: StartGatePolicy,
}

impl<P, E, R, S, C> EnricherService<P, E, R, S, C>
where
    P: EnrichmentProvider,
    E: EnricherRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    /// Registers the provider's enricher, reusing an existing registration
    /// with the same name.
    ///
    /// Two workers registering the same name concurrently end up sharing one
    /// identity.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherError::Domain`] for an invalid name and
    /// [`EnricherError::Repository`] or [`EnricherError::Task`] when
    /// persistence fails.
    pub async fn register(
        provider: Arc<P>,
        enrichers: Arc<E>,
        tasks: TaskLifecycleService<R, S, C>,
        clock: Arc<C>,
        start_gate: StartGatePolicy,
    ) -> EnricherResult<Self> {
        let name = EnricherName::new(provider.name())?;
        let identity = match enrichers.find_by_name(&name).await? {
            Some(existing) => existing,
            None => {
                let candidate = EnricherIdentity::new(name.clone(), provider.repository(), &*clock);
                match enrichers.register(&candidate).await {
                    Ok(()) => {
                        info!(enricher = %name, enricher_id = %candidate.id(), "registered enricher");
                        candidate
                    }
                    Err(EnricherRepositoryError::DuplicateName(duplicate)) => enrichers
                        .find_by_name(&name)
                        .await?
                        .ok_or(EnricherRepositoryError::DuplicateName(duplicate))?,
                    Err(err) => return Err(err.into()),
                }
            }
        };
        let task_type = tasks
            .ensure_task_type(provider.task_type_name(), provider.task_type_description())
            .await?;

        Ok(Self {
            provider,
            enrichers,
            tasks,
            clock,
            identity,
            task_type,
            start_gate,
        })
    }

    /// Returns the registered identity.
    #[must_use]
    pub const fn identity(&self) -> &EnricherIdentity {
        &self.identity
    }

    /// Returns the task type recording this enricher's attempts.
    #[must_use]
    pub const fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    /// Returns the task lifecycle service used for bookkeeping.
    #[must_use]
    pub const fn tasks(&self) -> &TaskLifecycleService<R, S, C> {
        &self.tasks
    }

    /// Records liveness.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherError::Repository`] when the update fails.
    pub async fn ping(&mut self) -> EnricherResult<()> {
        let mut pinged = self.identity.clone();
        pinged.ping(&*self.clock);
        self.enrichers.update(&pinged).await?;
        self.identity = pinged;
        Ok(())
    }

    /// Enriches one subject and returns whether it succeeded.
    ///
    /// A provider failure is not an error: the task is marked failed with
    /// the provider's reason and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherError::NotApplicable`] before any task exists when
    /// the provider rejects the subject, [`EnricherError::Stalled`] when the
    /// start gate gives up, and infrastructure errors otherwise.
    pub async fn enrich(&self, subject: &EnrichableSubject) -> EnricherResult<bool> {
        if !self.provider.can_enrich(subject).await? {
            return Err(EnricherError::NotApplicable {
                enricher: self.identity.name().clone(),
                subject: subject.key(),
            });
        }

        let task = self.pending_task_for(subject).await?;
        self.await_start_gate(subject, &task).await?;
        let started = self.tasks.start(task.id()).await?;

        match self.provider.enrich(subject, &started).await {
            Ok(()) => {
                self.tasks.succeed(started.id()).await?;
                Ok(true)
            }
            Err(reason) => {
                warn!(
                    enricher = %self.identity.name(),
                    subject = %subject.key(),
                    task_id = %started.id(),
                    reason = reason.summary(),
                    "enrichment failed"
                );
                self.tasks.fail(started.id(), Some(&reason)).await?;
                Ok(false)
            }
        }
    }

    /// Enriches every newly discovered subject and returns whether any
    /// succeeded.
    ///
    /// Subjects whose latest task is running or finished are skipped; failed
    /// subjects only come back once their task is restarted.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherError::Provider`] when discovery fails and
    /// infrastructure errors that are not scoped to a single subject.
    pub async fn enrich_all(&self) -> EnricherResult<bool> {
        let candidates = self.provider.new_elements_to_enrich().await?;
        let mut any_success = false;
        let mut attempted = 0_usize;

        for subject in &candidates {
            if self.already_handled(subject).await? {
                continue;
            }
            attempted += 1;
            match self.enrich(subject).await {
                Ok(succeeded) => any_success |= succeeded,
                Err(err) if err.is_subject_scoped() => {
                    warn!(
                        enricher = %self.identity.name(),
                        subject = %subject.key(),
                        error = %err,
                        "skipping subject"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            enricher = %self.identity.name(),
            discovered = candidates.len(),
            attempted,
            any_success,
            "enrichment cycle finished"
        );
        Ok(any_success)
    }

    /// Runs one polling cycle and returns how long to sleep before the next.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::ping`] and [`Self::enrich_all`].
    pub async fn run_cycle(&mut self, backoff: &mut PollBackoff) -> EnricherResult<Duration> {
        self.ping().await?;
        let any_success = self.enrich_all().await?;
        let pause = backoff.record_cycle(any_success);
        debug!(enricher = %self.identity.name(), pause_secs = pause.as_secs(), "backing off");
        Ok(pause)
    }

    /// Polls until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not scoped to a single subject.
    pub async fn start_service(
        &mut self,
        mut backoff: PollBackoff,
        shutdown: impl Future<Output = ()>,
    ) -> EnricherResult<()> {
        tokio::pin!(shutdown);
        info!(enricher = %self.identity.name(), "enricher service started");
        loop {
            let pause = self.run_cycle(&mut backoff).await?;
            tokio::select! {
                () = &mut shutdown => {
                    info!(enricher = %self.identity.name(), "enricher service stopped");
                    return Ok(());
                }
                () = tokio::time::sleep(pause) => {}
            }
        }
    }

    async fn already_handled(&self, subject: &EnrichableSubject) -> EnricherResult<bool> {
        let Some(link) = self
            .enrichers
            .latest_task_for_subject(self.identity.id(), subject.key())
            .await?
        else {
            return Ok(false);
        };
        let state = self.tasks.find_by_id(link.task()).await?.map(|task| task.state());
        Ok(matches!(
            state,
            Some(TaskState::Started | TaskState::Success | TaskState::Failure)
        ))
    }

    async fn pending_task_for(&self, subject: &EnrichableSubject) -> EnricherResult<Task> {
        let key = subject.key();
        let linked = match self
            .enrichers
            .latest_task_for_subject(self.identity.id(), key)
            .await?
        {
            Some(link) => self.reusable_task(link.task()).await?,
            None => None,
        };
        if let Some(task) = linked {
            debug!(subject = %key, task_id = %task.id(), "reusing linked task");
            return Ok(task);
        }

        let associated = match subject.associated_task() {
            Some(id) => self.reusable_task(id).await?,
            None => None,
        };
        let task = match associated {
            Some(existing) => existing,
            None => {
                self.tasks
                    .create_task(self.identity.actor_id(), self.task_type.id())
                    .await?
            }
        };
        let link = SubjectTaskLink::new(self.identity.id(), key, task.id(), &*self.clock);
        self.enrichers.link_subject_task(&link).await?;
        Ok(task)
    }

    async fn reusable_task(&self, id: TaskId) -> EnricherResult<Option<Task>> {
        Ok(self.tasks.find_by_id(id).await?.filter(|task| {
            task.state() == TaskState::Pending && task.task_type() == self.task_type.id()
        }))
    }

    async fn await_start_gate(&self, subject: &EnrichableSubject, task: &Task) -> EnricherResult<()> {
        let began = Instant::now();
        let interval = self.provider.sleep_between_start_attempts();
        let mut attempts = 0_u32;

        loop {
            attempts += 1;
            if self.provider.task_can_start(subject, task).await? {
                return Ok(());
            }
            let deadline_passed = self
                .start_gate
                .deadline()
                .is_some_and(|deadline| began.elapsed() >= deadline);
            if attempts >= self.start_gate.max_attempts() || deadline_passed {
                break;
            }
            debug!(task_id = %task.id(), attempts, "start condition not met, waiting");
            tokio::time::sleep(interval).await;
        }

        let reason = FailureReason::new(format!(
            "stalled: start condition not met after {attempts} attempts"
        ));
        self.tasks.fail(task.id(), Some(&reason)).await?;
        warn!(task_id = %task.id(), attempts, "task stalled before starting");
        Err(EnricherError::Stalled {
            task: task.id(),
            attempts,
        })
    }
}
