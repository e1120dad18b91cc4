//! Diesel row models for enricher persistence.

use super::schema::{enricher_subject_tasks, enrichers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for registered enrichers.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = enrichers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EnricherRow {
    /// Enricher identifier.
    pub id: uuid::Uuid,
    /// Unique name.
    pub name: String,
    /// Source repository.
    pub repository: String,
    /// Last liveness timestamp.
    pub last_ping_at: Option<DateTime<Utc>>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row for subject-to-task links.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = enricher_subject_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubjectTaskRow {
    /// Link identifier.
    pub id: uuid::Uuid,
    /// Owning enricher.
    pub enricher_id: uuid::Uuid,
    /// Subject kind.
    pub subject_kind: String,
    /// Subject identifier.
    pub subject_id: uuid::Uuid,
    /// Linked task.
    pub task_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
