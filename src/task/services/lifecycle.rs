//! Service layer for task creation, state transitions, and related records.

use crate::task::{
    domain::{
        ActorId, DerivedTask, Document, DocumentId, DocumentName, FailureReason, Task,
        TaskDomainError, TaskId, TaskRelatedDocument, TaskType, TaskTypeId, TaskTypeName,
        TransitionOutcome,
    },
    ports::{DocumentStore, DocumentStoreError, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

const FAILURE_DOCUMENT_NAME: &str = "Failure reason";

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Document contents could not be written.
    #[error(transparent)]
    DocumentStore(#[from] DocumentStoreError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every transition is loaded, validated by the domain, and written back in
/// one step. Failure reasons and produced outputs become [`Document`]s linked
/// to the task.
pub struct TaskLifecycleService<R, S, C>
where
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    documents: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> Clone for TaskLifecycleService<R, S, C>
where
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            documents: Arc::clone(&self.documents),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, S, C> TaskLifecycleService<R, S, C>
where
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, documents: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            repository,
            documents,
            clock,
        }
    }

    /// Returns the repository backing this service.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Creates a pending task of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task cannot be
    /// stored.
    pub async fn create_task(
        &self,
        owner: ActorId,
        task_type: TaskTypeId,
    ) -> TaskLifecycleResult<Task> {
        let task = Task::new(owner, task_type, &*self.clock);
        self.repository.store(&task).await?;
        debug!(task_id = %task.id(), %owner, "created task");
        Ok(task)
    }

    /// Looks up a task type by name, creating it on first use.
    ///
    /// When two writers race on the same name the loser reuses the row the
    /// winner stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an invalid name and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn ensure_task_type(
        &self,
        name: &str,
        description: &str,
    ) -> TaskLifecycleResult<TaskType> {
        let type_name = TaskTypeName::new(name)?;
        if let Some(existing) = self.repository.find_task_type_by_name(&type_name).await? {
            return Ok(existing);
        }

        let task_type = TaskType::new(type_name.clone(), description, &*self.clock);
        match self.repository.store_task_type(&task_type).await {
            Ok(()) => {
                info!(task_type = %type_name, "registered task type");
                Ok(task_type)
            }
            Err(TaskRepositoryError::DuplicateTaskTypeName(duplicate)) => self
                .repository
                .find_task_type_by_name(&type_name)
                .await?
                .ok_or_else(|| TaskRepositoryError::DuplicateTaskTypeName(duplicate).into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Moves a pending task to started.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an illegal transition and
    /// [`TaskLifecycleError::Repository`] when the task is missing or cannot
    /// be written.
    pub async fn start(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.load(id).await?;
        task.start(&*self.clock)?;
        self.repository.update(&task).await?;
        debug!(task_id = %id, "task started");
        Ok(task)
    }

    /// Moves a started task to success.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an illegal transition and
    /// [`TaskLifecycleError::Repository`] when the task is missing or cannot
    /// be written.
    pub async fn succeed(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.load(id).await?;
        task.succeed(&*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %id, "task succeeded");
        Ok(task)
    }

    /// Moves a task to failure, recording `reason` as a linked document.
    ///
    /// Failing an already failed task writes nothing and returns
    /// [`TransitionOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an illegal transition,
    /// [`TaskLifecycleError::DocumentStore`] when the reason cannot be
    /// written, and [`TaskLifecycleError::Repository`] for persistence
    /// failures.
    pub async fn fail(
        &self,
        id: TaskId,
        reason: Option<&FailureReason>,
    ) -> TaskLifecycleResult<TransitionOutcome> {
        let mut task = self.load(id).await?;
        let outcome = task.fail(&*self.clock)?;
        if outcome == TransitionOutcome::Unchanged {
            debug!(task_id = %id, "task already failed");
            return Ok(outcome);
        }
        self.repository.update(&task).await?;
        info!(
            task_id = %id,
            reason = reason.map_or("", FailureReason::summary),
            "task failed"
        );

        if let Some(failure) = reason {
            self.attach_document(
                &task,
                FAILURE_DOCUMENT_NAME,
                failure.summary(),
                &failure.to_document_text(),
            )
            .await?;
        }
        Ok(outcome)
    }

    /// Resets a finished task to pending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the task has not finished
    /// and [`TaskLifecycleError::Repository`] for persistence failures.
    pub async fn restart(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.load(id).await?;
        task.restart(&*self.clock)?;
        self.repository.update(&task).await?;
        info!(task_id = %id, "task restarted");
        Ok(task)
    }

    /// Creates a pending child task of `parent` and records the edge.
    ///
    /// The child and the edge are separate writes. A failure between them
    /// leaves an unlinked pending task behind.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the parent is missing
    /// or persistence fails.
    pub async fn spawn_derived(
        &self,
        parent: TaskId,
        owner: ActorId,
        task_type: TaskTypeId,
    ) -> TaskLifecycleResult<Task> {
        self.load(parent).await?;
        let child = self.create_task(owner, task_type).await?;
        let edge = DerivedTask::new(parent, child.id(), &*self.clock)?;
        self.repository.store_derived(&edge).await?;
        debug!(parent = %parent, child = %child.id(), "spawned derived task");
        Ok(child)
    }

    /// Lists tasks derived from `parent`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn derived_tasks(&self, parent: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.derived_tasks(parent).await?)
    }

    /// Returns the task `child` was derived from, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn parent_task(&self, child: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.parent_task(child).await?)
    }

    /// Lists documents produced by a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn documents(&self, task: TaskId) -> TaskLifecycleResult<Vec<Document>> {
        Ok(self.repository.documents_for_task(task).await?)
    }

    /// Writes `contents` as a new document owned by the task's owner and
    /// links it to the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty name,
    /// [`TaskLifecycleError::DocumentStore`] when writing fails, and
    /// [`TaskLifecycleError::Repository`] for persistence failures.
    pub async fn attach_document(
        &self,
        task: &Task,
        name: &str,
        description: &str,
        contents: &str,
    ) -> TaskLifecycleResult<Document> {
        let document_name = DocumentName::new(name)?;
        let document_id = DocumentId::new();
        let path = self
            .documents
            .write(&format!("{document_id}.txt"), contents)
            .await?;
        let document = Document::new(
            document_id,
            document_name,
            description,
            path,
            task.owner(),
            &*self.clock,
        );
        self.repository.store_document(&document).await?;
        self.repository
            .link_document(TaskRelatedDocument {
                task: task.id(),
                document: document_id,
            })
            .await?;
        debug!(task_id = %task.id(), %document_id, "attached document");
        Ok(document)
    }

    /// Deletes a task together with its derived edges and document links.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the task is missing or
    /// deletion fails.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<()> {
        self.repository.delete(id).await?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    async fn load(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| TaskRepositoryError::NotFound(id).into())
    }
}
