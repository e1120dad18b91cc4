//! Diesel row models for payload persistence.

use super::schema::{data_payloads, dirty_pipeline_entries};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for uploaded payloads.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = data_payloads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DataPayloadRow {
    /// Payload identifier.
    pub id: uuid::Uuid,
    /// Uploading user.
    pub owner_id: uuid::Uuid,
    /// Processing task.
    pub task_id: uuid::Uuid,
    /// File location.
    pub path: String,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for pipeline completion records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dirty_pipeline_entries)]
pub struct NewPipelineEntryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Processed payload.
    pub payload_id: uuid::Uuid,
    /// Completion timestamp.
    pub created_at: DateTime<Utc>,
}
