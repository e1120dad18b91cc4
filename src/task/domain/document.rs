//! Documents produced by task execution.

use super::{ActorId, DocumentId, TaskDomainError, TaskId};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;

/// Validated, trimmed document name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentName(String);

impl DocumentName {
    /// Creates a validated document name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDocumentName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyDocumentName);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File produced by a task: an output artefact or a formatted failure log.
///
/// Documents are read-only after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    name: DocumentName,
    description: String,
    path: Utf8PathBuf,
    owner: ActorId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a document record for contents already written to `path`.
    #[must_use]
    pub fn new(
        id: DocumentId,
        name: DocumentName,
        description: impl Into<String>,
        path: Utf8PathBuf,
        owner: ActorId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            name,
            description: description.into(),
            path,
            owner,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a document from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: DocumentId,
        name: DocumentName,
        description: String,
        path: Utf8PathBuf,
        owner: ActorId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            path,
            owner,
            created_at,
            updated_at,
        }
    }

    /// Returns the document identifier.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the document name.
    #[must_use]
    pub const fn name(&self) -> &DocumentName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the storage path relative to the document root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the owning actor.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Link between a task and a document it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskRelatedDocument {
    /// Producing task.
    pub task: TaskId,
    /// Produced document.
    pub document: DocumentId,
}

/// Human-readable reason for a failed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    summary: String,
    detail: Option<String>,
}

impl FailureReason {
    /// Creates a reason with a one-line summary.
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: None,
        }
    }

    /// Attaches longer diagnostic output such as captured process streams.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Replaces the summary and keeps the detail.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Returns the one-line summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the diagnostic detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Formats the reason as the body of a failure document.
    #[must_use]
    pub fn to_document_text(&self) -> String {
        self.detail.as_ref().map_or_else(
            || format!("{}\n", self.summary),
            |detail| format!("{}\n\n{}\n", self.summary, detail),
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}
