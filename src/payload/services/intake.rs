//! Records uploads together with the task that will track their processing.

use crate::payload::{
    domain::DataPayload,
    ports::{DataPayloadRepository, DataPayloadRepositoryError},
};
use crate::task::{
    domain::ActorId,
    ports::{DocumentStore, TaskRepository},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use camino::Utf8PathBuf;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Task type shared by every uploaded payload.
pub const PAYLOAD_TASK_TYPE_NAME: &str = "Data payload processing";

/// Description stored with [`PAYLOAD_TASK_TYPE_NAME`].
pub const PAYLOAD_TASK_TYPE_DESCRIPTION: &str = "Cleaning of an uploaded data payload";

/// Service-level errors for payload intake.
#[derive(Debug, Error)]
pub enum DataPayloadServiceError {
    /// Creating the processing task failed.
    #[error(transparent)]
    Task(#[from] TaskLifecycleError),
    /// Storing the payload failed.
    #[error(transparent)]
    Repository(#[from] DataPayloadRepositoryError),
}

/// Payload intake service.
pub struct DataPayloadService<P, R, S, C>
where
    P: DataPayloadRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    payloads: Arc<P>,
    tasks: TaskLifecycleService<R, S, C>,
    payload_root: Utf8PathBuf,
    clock: Arc<C>,
}

impl<P, R, S, C> Clone for DataPayloadService<P, R, S, C>
where
    P: DataPayloadRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            payloads: Arc::clone(&self.payloads),
            tasks: self.tasks.clone(),
            payload_root: self.payload_root.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, R, S, C> DataPayloadService<P, R, S, C>
where
    P: DataPayloadRepository,
    R: TaskRepository,
    S: DocumentStore,
    C: Clock + Send + Sync,
{
    /// Creates a new intake service storing payloads under `payload_root`.
    #[must_use]
    pub const fn new(
        payloads: Arc<P>,
        tasks: TaskLifecycleService<R, S, C>,
        payload_root: Utf8PathBuf,
        clock: Arc<C>,
    ) -> Self {
        Self {
            payloads,
            tasks,
            payload_root,
            clock,
        }
    }

    /// Registers an upload by `owner` with a pending processing task.
    ///
    /// # Errors
    ///
    /// Returns [`DataPayloadServiceError`] when the task or the payload
    /// cannot be stored.
    pub async fn submit(&self, owner: ActorId) -> Result<DataPayload, DataPayloadServiceError> {
        let task_type = self
            .tasks
            .ensure_task_type(PAYLOAD_TASK_TYPE_NAME, PAYLOAD_TASK_TYPE_DESCRIPTION)
            .await?;
        let task = self.tasks.create_task(owner, task_type.id()).await?;
        let payload = DataPayload::new(owner, task.id(), &self.payload_root, &*self.clock);
        self.payloads.store(&payload).await?;
        info!(payload_id = %payload.id(), task_id = %task.id(), "payload submitted");
        Ok(payload)
    }
}
