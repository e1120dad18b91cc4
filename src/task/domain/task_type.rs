//! Task types classify units of work (for example one per pipeline stage).

use super::{TaskDomainError, TaskTypeId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a task type name, matching the `VARCHAR(80)` column.
const MAX_NAME_LENGTH: usize = 80;

/// Validated, trimmed task type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTypeName(String);

impl TaskTypeName {
    /// Creates a validated task type name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskTypeName`] when the value is empty
    /// after trimming or [`TaskDomainError::TaskTypeNameTooLong`] when it
    /// exceeds 80 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyTaskTypeName);
        }
        if normalized.chars().count() > MAX_NAME_LENGTH {
            return Err(TaskDomainError::TaskTypeNameTooLong(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of unit of work, created lazily on first use and immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    id: TaskTypeId,
    name: TaskTypeName,
    description: String,
    created_at: DateTime<Utc>,
}

impl TaskType {
    /// Creates a new task type.
    #[must_use]
    pub fn new(name: TaskTypeName, description: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: TaskTypeId::new(),
            name,
            description: description.into(),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a task type from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TaskTypeId,
        name: TaskTypeName,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
        }
    }

    /// Returns the task type identifier.
    #[must_use]
    pub const fn id(&self) -> TaskTypeId {
        self.id
    }

    /// Returns the task type name.
    #[must_use]
    pub const fn name(&self) -> &TaskTypeName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
