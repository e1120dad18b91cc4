//! Domain model for enrichment task tracking.
//!
//! A task is the durable record of one attempted unit of work. Tasks are
//! typed, may spawn derived sub-tasks for multi-stage pipelines, and may
//! produce documents (outputs or formatted failure reasons). All
//! infrastructure concerns stay outside of this boundary.

mod derived;
mod document;
mod error;
mod ids;
mod task;
mod task_type;

pub use derived::DerivedTask;
pub use document::{Document, DocumentName, FailureReason, TaskRelatedDocument};
pub use error::{ParseTaskStateError, TaskDomainError};
pub use ids::{ActorId, DerivedTaskId, DocumentId, TaskId, TaskTypeId};
pub use task::{PersistedTaskData, Task, TaskState, TransitionOutcome};
pub use task_type::{TaskType, TaskTypeName};
