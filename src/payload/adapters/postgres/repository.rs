//! `PostgreSQL` repository implementation for data payloads.

use super::{
    models::{DataPayloadRow, NewPipelineEntryRow},
    schema::{data_payloads, dirty_pipeline_entries},
};
use crate::payload::{
    domain::{DataPayload, PayloadId, PipelineEntry},
    ports::{DataPayloadRepository, DataPayloadRepositoryError, DataPayloadRepositoryResult},
};
use crate::postgres::{self, PgPool};
use crate::task::domain::{ActorId, TaskId};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use diesel::dsl::{exists, not};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed payload repository.
#[derive(Debug, Clone)]
pub struct PostgresDataPayloadRepository {
    pool: PgPool,
}

impl PostgresDataPayloadRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DataPayloadRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DataPayloadRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        postgres::run_blocking(&self.pool, f).await
    }
}

#[async_trait]
impl DataPayloadRepository for PostgresDataPayloadRepository {
    async fn store(&self, payload: &DataPayload) -> DataPayloadRepositoryResult<()> {
        let payload_id = payload.id();
        let row = DataPayloadRow {
            id: payload_id.into_inner(),
            owner_id: payload.owner().into_inner(),
            task_id: payload.task().into_inner(),
            path: payload.path().to_string(),
            created_at: payload.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(data_payloads::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DataPayloadRepositoryError::DuplicatePayload(payload_id)
                    }
                    _ => DataPayloadRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: PayloadId) -> DataPayloadRepositoryResult<Option<DataPayload>> {
        self.run_blocking(move |connection| {
            let row = data_payloads::table
                .filter(data_payloads::id.eq(id.into_inner()))
                .select(DataPayloadRow::as_select())
                .first::<DataPayloadRow>(connection)
                .optional()
                .map_err(DataPayloadRepositoryError::persistence)?;
            Ok(row.map(row_to_payload))
        })
        .await
    }

    async fn list_without_pipeline_entry(&self) -> DataPayloadRepositoryResult<Vec<DataPayload>> {
        self.run_blocking(move |connection| {
            let rows = data_payloads::table
                .filter(not(exists(
                    dirty_pipeline_entries::table
                        .filter(dirty_pipeline_entries::payload_id.eq(data_payloads::id)),
                )))
                .order((data_payloads::created_at.asc(), data_payloads::id.asc()))
                .select(DataPayloadRow::as_select())
                .load::<DataPayloadRow>(connection)
                .map_err(DataPayloadRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_payload).collect())
        })
        .await
    }

    async fn has_pipeline_entry(&self, payload: PayloadId) -> DataPayloadRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            diesel::select(exists(
                dirty_pipeline_entries::table
                    .filter(dirty_pipeline_entries::payload_id.eq(payload.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(DataPayloadRepositoryError::persistence)
        })
        .await
    }

    async fn record_pipeline_entry(&self, entry: &PipelineEntry) -> DataPayloadRepositoryResult<()> {
        let payload_id = entry.payload();
        let row = NewPipelineEntryRow {
            id: entry.id().into_inner(),
            payload_id: payload_id.into_inner(),
            created_at: entry.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(dirty_pipeline_entries::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DataPayloadRepositoryError::DuplicatePipelineEntry(payload_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        DataPayloadRepositoryError::NotFound(payload_id)
                    }
                    _ => DataPayloadRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }
}

fn row_to_payload(row: DataPayloadRow) -> DataPayload {
    DataPayload::from_persisted(
        PayloadId::from_uuid(row.id),
        ActorId::from_uuid(row.owner_id),
        TaskId::from_uuid(row.task_id),
        Utf8PathBuf::from(row.path),
        row.created_at,
    )
}
