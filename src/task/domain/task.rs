//! Task aggregate root and its status machine.

use super::{ActorId, ParseTaskStateError, TaskDomainError, TaskId, TaskTypeId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
///
/// Tasks move along `Pending -> Started -> {Success, Failure}`. A terminal
/// task only leaves its state through an explicit restart back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Task has been created but work has not started.
    Pending,
    /// Task is being executed.
    Started,
    /// Task finished successfully.
    Success,
    /// Task finished with a failure.
    Failure,
}

impl TaskState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    /// Returns whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Returns whether a transition from `self` to `target` is permitted.
    ///
    /// `Pending -> Failure` covers tasks abandoned before they could start.
    /// `Failure -> Failure` is not a transition: [`Task::fail`] treats it as
    /// a no-op instead.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Started | Self::Failure)
                | (Self::Started, Self::Success | Self::Failure)
                | (Self::Success | Self::Failure, Self::Pending)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "PENDING" => Ok(Self::Pending),
            "STARTED" => Ok(Self::Started),
            "SUCCESS" => Ok(Self::Success),
            "FAILURE" => Ok(Self::Failure),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Whether a lifecycle call changed the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The state was written.
    Changed,
    /// The task was already in the requested state; nothing was written.
    Unchanged,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: ActorId,
    task_type: TaskTypeId,
    state: TaskState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning actor.
    pub owner: ActorId,
    /// Persisted task type.
    pub task_type: TaskTypeId,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task.
    #[must_use]
    pub fn new(owner: ActorId, task_type: TaskTypeId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            owner,
            task_type,
            state: TaskState::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            task_type: data.task_type,
            state: data.state,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning actor.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Returns the task type identifier.
    #[must_use]
    pub const fn task_type(&self) -> TaskTypeId {
        self.task_type
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the task as started.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// pending.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Started, clock)
    }

    /// Marks the task as successfully finished.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// started.
    pub fn succeed(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Success, clock)
    }

    /// Marks the task as failed.
    ///
    /// Failing an already failed task leaves it untouched and reports
    /// [`TransitionOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the task has
    /// already succeeded.
    pub fn fail(&mut self, clock: &impl Clock) -> Result<TransitionOutcome, TaskDomainError> {
        if self.state == TaskState::Failure {
            return Ok(TransitionOutcome::Unchanged);
        }
        self.transition_to(TaskState::Failure, clock)?;
        Ok(TransitionOutcome::Changed)
    }

    /// Resets a finished task to pending so it can be picked up again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the task is
    /// still pending or running.
    pub fn restart(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Pending, clock)
    }

    fn transition_to(
        &mut self,
        target: TaskState,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.state.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        self.updated_at = clock.utc();
        Ok(())
    }
}
