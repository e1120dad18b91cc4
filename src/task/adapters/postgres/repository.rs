//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{DocumentRow, NewDerivedTaskRow, NewTaskRelatedDocumentRow, TaskRow, TaskTypeRow},
    schema::{derived_tasks, documents, task_related_documents, task_types, tasks},
};
use crate::postgres::{self, PgPool};
use crate::task::{
    domain::{
        ActorId, DerivedTask, Document, DocumentId, DocumentName, PersistedTaskData, Task,
        TaskId, TaskRelatedDocument, TaskState, TaskType, TaskTypeId, TaskTypeName,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        postgres::run_blocking(&self.pool, f).await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_task_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let state = task.state().as_str().to_owned();
        let updated_at = task.updated_at();
        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                    .set((tasks::state.eq(&state), tasks::updated_at.eq(updated_at)))
                    .execute(connection)
                    .map_err(TaskRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        // Derived edges and document links go with the task through
        // ON DELETE CASCADE.
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn store_task_type(&self, task_type: &TaskType) -> TaskRepositoryResult<()> {
        let name = task_type.name().clone();
        let row = TaskTypeRow {
            id: task_type.id().into_inner(),
            name: name.as_str().to_owned(),
            description: task_type.description().to_owned(),
            created_at: task_type.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_types::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTaskTypeName(name.clone())
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_task_type_by_name(
        &self,
        name: &TaskTypeName,
    ) -> TaskRepositoryResult<Option<TaskType>> {
        let lookup = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = task_types::table
                .filter(task_types::name.eq(&lookup))
                .select(TaskTypeRow::as_select())
                .first::<TaskTypeRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task_type).transpose()
        })
        .await
    }

    async fn store_derived(&self, edge: &DerivedTask) -> TaskRepositoryResult<()> {
        let parent = edge.parent();
        let child = edge.child();
        let row = NewDerivedTaskRow {
            id: edge.id().into_inner(),
            parent_task_id: parent.into_inner(),
            derived_task_id: child.into_inner(),
            created_at: edge.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(derived_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateDerivedTask { parent, child }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, ref info)
                        if is_constraint(info.as_ref(), "derived_tasks_no_self_loop") =>
                    {
                        TaskRepositoryError::SelfReferentialDerivedTask(parent)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
                        if is_constraint(info.as_ref(), "derived_tasks_parent_task_id_fkey") =>
                    {
                        TaskRepositoryError::NotFound(parent)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(child)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn derived_tasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let child_ids = derived_tasks::table
                .filter(derived_tasks::parent_task_id.eq(parent.into_inner()))
                .order((derived_tasks::created_at.asc(), derived_tasks::id.asc()))
                .select(derived_tasks::derived_task_id)
                .load::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let rows = tasks::table
                .filter(tasks::id.eq_any(&child_ids))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let mut loaded = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<Task>>>()?;
            loaded.sort_by_key(|task| {
                child_ids
                    .iter()
                    .position(|id| *id == task.id().into_inner())
                    .unwrap_or(usize::MAX)
            });
            Ok(loaded)
        })
        .await
    }

    async fn parent_task(&self, child: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let parent_id = derived_tasks::table
                .filter(derived_tasks::derived_task_id.eq(child.into_inner()))
                .select(derived_tasks::parent_task_id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            let Some(parent_id) = parent_id else {
                return Ok(None);
            };
            let row = tasks::table
                .filter(tasks::id.eq(parent_id))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn store_document(&self, document: &Document) -> TaskRepositoryResult<()> {
        let row = DocumentRow {
            id: document.id().into_inner(),
            name: document.name().as_str().to_owned(),
            description: document.description().to_owned(),
            path: document.path().as_str().to_owned(),
            owner_id: document.owner().into_inner(),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(documents::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn link_document(&self, link: TaskRelatedDocument) -> TaskRepositoryResult<()> {
        let row = NewTaskRelatedDocumentRow {
            id: uuid::Uuid::new_v4(),
            task_id: link.task.into_inner(),
            document_id: link.document.into_inner(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_related_documents::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateDocumentLink {
                            task: link.task,
                            document: link.document,
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskRepositoryError::NotFound(link.task)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn documents_for_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<Document>> {
        self.run_blocking(move |connection| {
            let document_ids = task_related_documents::table
                .filter(task_related_documents::task_id.eq(task.into_inner()))
                .select(task_related_documents::document_id)
                .load::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let rows = documents::table
                .filter(documents::id.eq_any(&document_ids))
                .order((documents::created_at.asc(), documents::id.asc()))
                .select(DocumentRow::as_select())
                .load::<DocumentRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_document).collect()
        })
        .await
    }
}

fn is_constraint(info: &dyn DatabaseErrorInformation, name: &str) -> bool {
    info.constraint_name()
        .is_some_and(|constraint| constraint == name)
}

fn to_task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        owner_id: task.owner().into_inner(),
        task_type_id: task.task_type().into_inner(),
        state: task.state().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        owner_id,
        task_type_id,
        state: persisted_state,
        created_at,
        updated_at,
    } = row;
    let state =
        TaskState::try_from(persisted_state.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        owner: ActorId::from_uuid(owner_id),
        task_type: TaskTypeId::from_uuid(task_type_id),
        state,
        created_at,
        updated_at,
    }))
}

fn row_to_task_type(row: TaskTypeRow) -> TaskRepositoryResult<TaskType> {
    let name = TaskTypeName::new(row.name).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskType::from_persisted(
        TaskTypeId::from_uuid(row.id),
        name,
        row.description,
        row.created_at,
    ))
}

fn row_to_document(row: DocumentRow) -> TaskRepositoryResult<Document> {
    let name = DocumentName::new(row.name).map_err(TaskRepositoryError::persistence)?;
    Ok(Document::from_persisted(
        DocumentId::from_uuid(row.id),
        name,
        row.description,
        Utf8PathBuf::from(row.path),
        ActorId::from_uuid(row.owner_id),
        row.created_at,
        row.updated_at,
    ))
}
