//! Error types for task domain validation and parsing.

use super::{TaskId, TaskState};
use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested state transition is not permitted.
    #[error("invalid state transition for task {task_id}: {from} -> {to}")]
    InvalidStateTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current state.
        from: TaskState,
        /// Requested state.
        to: TaskState,
    },

    /// The task type name is empty after trimming.
    #[error("task type name must not be empty")]
    EmptyTaskTypeName,

    /// The task type name exceeds the storage limit.
    #[error("task type name exceeds 80 character limit: {0}")]
    TaskTypeNameTooLong(String),

    /// A derived-task edge would make a task its own parent.
    #[error("task {0} cannot be derived from itself")]
    SelfReferentialDerivedTask(TaskId),

    /// The document name is empty after trimming.
    #[error("document name must not be empty")]
    EmptyDocumentName,
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
