//! Subjects an enricher can work on and their links to tasks.

use super::{EnricherId, ParseSubjectKindError};
use crate::payload::domain::DataPayload;
use crate::task::domain::TaskId;
use crate::taxon::domain::Taxon;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;
use uuid::Uuid;

/// Kind of record a subject refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubjectKind {
    /// A curated taxon.
    Taxon,
    /// An uploaded data payload.
    DataPayload,
}

impl SubjectKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Taxon => "taxon",
            Self::DataPayload => "data_payload",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SubjectKind {
    type Error = ParseSubjectKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "taxon" => Ok(Self::Taxon),
            "data_payload" => Ok(Self::DataPayload),
            _ => Err(ParseSubjectKindError(value.to_owned())),
        }
    }
}

/// Storage key identifying a subject independently of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectKey {
    /// Kind of record.
    pub kind: SubjectKind,
    /// Record identifier.
    pub id: Uuid,
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Record handed to an enricher for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichableSubject {
    /// A taxon to resolve against a taxonomy.
    Taxon(Taxon),
    /// A payload to push through the cleaning pipeline.
    DataPayload(DataPayload),
}

impl EnrichableSubject {
    /// Returns the storage key of the subject.
    #[must_use]
    pub const fn key(&self) -> SubjectKey {
        match self {
            Self::Taxon(taxon) => SubjectKey {
                kind: SubjectKind::Taxon,
                id: taxon.id().into_inner(),
            },
            Self::DataPayload(payload) => SubjectKey {
                kind: SubjectKind::DataPayload,
                id: payload.id().into_inner(),
            },
        }
    }

    /// Returns the task created alongside the subject, if it carries one.
    ///
    /// Uploaded payloads come with a pending processing task that the
    /// enricher picks up instead of creating its own.
    #[must_use]
    pub const fn associated_task(&self) -> Option<TaskId> {
        match self {
            Self::Taxon(_) => None,
            Self::DataPayload(payload) => Some(payload.task()),
        }
    }
}

impl From<Taxon> for EnrichableSubject {
    fn from(taxon: Taxon) -> Self {
        Self::Taxon(taxon)
    }
}

impl From<DataPayload> for EnrichableSubject {
    fn from(payload: DataPayload) -> Self {
        Self::DataPayload(payload)
    }
}

/// Record of the task an enricher used for a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTaskLink {
    enricher: EnricherId,
    subject: SubjectKey,
    task: TaskId,
    created_at: DateTime<Utc>,
}

impl SubjectTaskLink {
    /// Creates a new link.
    #[must_use]
    pub fn new(enricher: EnricherId, subject: SubjectKey, task: TaskId, clock: &impl Clock) -> Self {
        Self {
            enricher,
            subject,
            task,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a link from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        enricher: EnricherId,
        subject: SubjectKey,
        task: TaskId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            enricher,
            subject,
            task,
            created_at,
        }
    }

    /// Returns the enricher that created the link.
    #[must_use]
    pub const fn enricher(&self) -> EnricherId {
        self.enricher
    }

    /// Returns the subject key.
    #[must_use]
    pub const fn subject(&self) -> SubjectKey {
        self.subject
    }

    /// Returns the linked task.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns when the link was recorded.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
