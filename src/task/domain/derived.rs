//! Parent/child edges chaining the stages of one pipeline run.

use super::{DerivedTaskId, TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Directed edge from a parent task to a task it spawned.
///
/// Edges are never mutated. The `(parent, child)` pair is unique and a task
/// is never its own parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedTask {
    id: DerivedTaskId,
    parent: TaskId,
    child: TaskId,
    created_at: DateTime<Utc>,
}

impl DerivedTask {
    /// Creates a new edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfReferentialDerivedTask`] when `parent`
    /// and `child` are the same task.
    pub fn new(parent: TaskId, child: TaskId, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        if parent == child {
            return Err(TaskDomainError::SelfReferentialDerivedTask(parent));
        }
        Ok(Self {
            id: DerivedTaskId::new(),
            parent,
            child,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an edge from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: DerivedTaskId,
        parent: TaskId,
        child: TaskId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            parent,
            child,
            created_at,
        }
    }

    /// Returns the edge identifier.
    #[must_use]
    pub const fn id(&self) -> DerivedTaskId {
        self.id
    }

    /// Returns the parent task.
    #[must_use]
    pub const fn parent(&self) -> TaskId {
        self.parent
    }

    /// Returns the derived task.
    #[must_use]
    pub const fn child(&self) -> TaskId {
        self.child
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
