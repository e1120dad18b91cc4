//! Data payload and pipeline bookkeeping records.

use crate::macros::uuid_identifier;
use crate::task::domain::{ActorId, TaskId};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;

uuid_identifier!(
    /// Unique identifier for an uploaded data payload.
    PayloadId
);

uuid_identifier!(
    /// Unique identifier for a pipeline completion record.
    PipelineEntryId
);

/// Uploaded file awaiting the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPayload {
    id: PayloadId,
    owner: ActorId,
    task: TaskId,
    path: Utf8PathBuf,
    created_at: DateTime<Utc>,
}

impl DataPayload {
    /// Creates a payload stored under `payload_root/<id>`.
    #[must_use]
    pub fn new(owner: ActorId, task: TaskId, payload_root: &Utf8Path, clock: &impl Clock) -> Self {
        let id = PayloadId::new();
        Self {
            id,
            owner,
            task,
            path: payload_root.join(id.to_string()),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a payload from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: PayloadId,
        owner: ActorId,
        task: TaskId,
        path: Utf8PathBuf,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            task,
            path,
            created_at,
        }
    }

    /// Returns the payload identifier.
    #[must_use]
    pub const fn id(&self) -> PayloadId {
        self.id
    }

    /// Returns the uploading user.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Returns the processing task created with the upload.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// Returns the location of the uploaded file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Marker that the cleaning pipeline finished for a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEntry {
    id: PipelineEntryId,
    payload: PayloadId,
    created_at: DateTime<Utc>,
}

impl PipelineEntry {
    /// Creates a completion record for `payload`.
    #[must_use]
    pub fn new(payload: PayloadId, clock: &impl Clock) -> Self {
        Self {
            id: PipelineEntryId::new(),
            payload,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: PipelineEntryId,
        payload: PayloadId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            payload,
            created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> PipelineEntryId {
        self.id
    }

    /// Returns the processed payload.
    #[must_use]
    pub const fn payload(&self) -> PayloadId {
        self.payload
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
