//! Diesel row models for task persistence.

use super::schema::{derived_tasks, documents, task_related_documents, task_types, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning user or bot.
    pub owner_id: uuid::Uuid,
    /// Task type reference.
    pub task_type_id: uuid::Uuid,
    /// Lifecycle state.
    pub state: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row for task types.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskTypeRow {
    /// Task type identifier.
    pub id: uuid::Uuid,
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row for derived-task edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = derived_tasks)]
pub struct NewDerivedTaskRow {
    /// Edge identifier.
    pub id: uuid::Uuid,
    /// Parent task.
    pub parent_task_id: uuid::Uuid,
    /// Derived task.
    pub derived_task_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row for documents.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentRow {
    /// Document identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Path relative to the document root.
    pub path: String,
    /// Owning user or bot.
    pub owner_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row for task/document links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_related_documents)]
pub struct NewTaskRelatedDocumentRow {
    /// Link identifier.
    pub id: uuid::Uuid,
    /// Producing task.
    pub task_id: uuid::Uuid,
    /// Produced document.
    pub document_id: uuid::Uuid,
}
