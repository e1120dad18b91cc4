//! Repository port for tasks, task types, derived-task edges and documents.

use crate::postgres::BlockingError;
use crate::task::domain::{
    DerivedTask, Document, DocumentId, Task, TaskId, TaskRelatedDocument, TaskType, TaskTypeName,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every method commits independently; no operation spans several records
/// atomically.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists the state and timestamps of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Deletes a task together with its derived-task edges and document
    /// links.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Stores a new task type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTaskTypeName`] when the name
    /// is already taken.
    async fn store_task_type(&self, task_type: &TaskType) -> TaskRepositoryResult<()>;

    /// Finds a task type by its unique name.
    async fn find_task_type_by_name(
        &self,
        name: &TaskTypeName,
    ) -> TaskRepositoryResult<Option<TaskType>>;

    /// Stores a derived-task edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::SelfReferentialDerivedTask`] when the
    /// parent and child are the same task,
    /// [`TaskRepositoryError::DuplicateDerivedTask`] when the pair already
    /// exists, or [`TaskRepositoryError::NotFound`] when either task is
    /// missing.
    async fn store_derived(&self, edge: &DerivedTask) -> TaskRepositoryResult<()>;

    /// Returns the tasks derived from `parent`, oldest edge first.
    async fn derived_tasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the parent of a derived task, if any.
    async fn parent_task(&self, child: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Stores a document record.
    async fn store_document(&self, document: &Document) -> TaskRepositoryResult<()>;

    /// Links a stored document to the task that produced it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateDocumentLink`] when the pair
    /// already exists.
    async fn link_document(&self, link: TaskRelatedDocument) -> TaskRepositoryResult<()>;

    /// Returns the documents produced by a task, oldest first.
    async fn documents_for_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<Document>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task type with the same name already exists.
    #[error("duplicate task type name: {0}")]
    DuplicateTaskTypeName(TaskTypeName),

    /// The derived-task pair already exists.
    #[error("task {child} is already derived from {parent}")]
    DuplicateDerivedTask {
        /// Parent task.
        parent: TaskId,
        /// Derived task.
        child: TaskId,
    },

    /// The derived-task edge points a task at itself.
    #[error("task {0} cannot be derived from itself")]
    SelfReferentialDerivedTask(TaskId),

    /// The document is already linked to the task.
    #[error("document {document} is already linked to task {task}")]
    DuplicateDocumentLink {
        /// Producing task.
        task: TaskId,
        /// Produced document.
        document: DocumentId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<BlockingError> for TaskRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}
