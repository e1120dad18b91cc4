//! `PostgreSQL` repository implementation for enrichers.

use super::{
    models::{EnricherRow, SubjectTaskRow},
    schema::{enricher_subject_tasks, enrichers},
};
use crate::enricher::{
    domain::{
        EnricherId, EnricherIdentity, EnricherName, SubjectKey, SubjectKind, SubjectTaskLink,
    },
    ports::{EnricherRepository, EnricherRepositoryError, EnricherRepositoryResult},
};
use crate::postgres::{self, PgPool};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed enricher repository.
#[derive(Debug, Clone)]
pub struct PostgresEnricherRepository {
    pool: PgPool,
}

impl PostgresEnricherRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> EnricherRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> EnricherRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        postgres::run_blocking(&self.pool, f).await
    }
}

#[async_trait]
impl EnricherRepository for PostgresEnricherRepository {
    async fn find_by_name(
        &self,
        name: &EnricherName,
    ) -> EnricherRepositoryResult<Option<EnricherIdentity>> {
        let lookup = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = enrichers::table
                .filter(enrichers::name.eq(&lookup))
                .select(EnricherRow::as_select())
                .first::<EnricherRow>(connection)
                .optional()
                .map_err(EnricherRepositoryError::persistence)?;
            row.map(row_to_identity).transpose()
        })
        .await
    }

    async fn register(&self, identity: &EnricherIdentity) -> EnricherRepositoryResult<()> {
        let name = identity.name().clone();
        let row = identity_to_row(identity);
        self.run_blocking(move |connection| {
            diesel::insert_into(enrichers::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        EnricherRepositoryError::DuplicateName(name.clone())
                    }
                    _ => EnricherRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, identity: &EnricherIdentity) -> EnricherRepositoryResult<()> {
        let id = identity.id();
        let repository = identity.repository().to_owned();
        let last_ping_at = identity.last_ping_at();
        self.run_blocking(move |connection| {
            let updated = diesel::update(enrichers::table.filter(enrichers::id.eq(id.into_inner())))
                .set((
                    enrichers::repository.eq(&repository),
                    enrichers::last_ping_at.eq(last_ping_at),
                ))
                .execute(connection)
                .map_err(EnricherRepositoryError::persistence)?;
            if updated == 0 {
                return Err(EnricherRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn link_subject_task(&self, link: &SubjectTaskLink) -> EnricherRepositoryResult<()> {
        let enricher = link.enricher();
        let row = SubjectTaskRow {
            id: uuid::Uuid::new_v4(),
            enricher_id: enricher.into_inner(),
            subject_kind: link.subject().kind.as_str().to_owned(),
            subject_id: link.subject().id,
            task_id: link.task().into_inner(),
            created_at: link.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(enricher_subject_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        EnricherRepositoryError::NotFound(enricher)
                    }
                    _ => EnricherRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn latest_task_for_subject(
        &self,
        enricher: EnricherId,
        subject: SubjectKey,
    ) -> EnricherRepositoryResult<Option<SubjectTaskLink>> {
        self.run_blocking(move |connection| {
            let row = enricher_subject_tasks::table
                .filter(enricher_subject_tasks::enricher_id.eq(enricher.into_inner()))
                .filter(enricher_subject_tasks::subject_kind.eq(subject.kind.as_str()))
                .filter(enricher_subject_tasks::subject_id.eq(subject.id))
                .order(enricher_subject_tasks::created_at.desc())
                .select(SubjectTaskRow::as_select())
                .first::<SubjectTaskRow>(connection)
                .optional()
                .map_err(EnricherRepositoryError::persistence)?;
            row.map(row_to_link).transpose()
        })
        .await
    }
}

fn identity_to_row(identity: &EnricherIdentity) -> EnricherRow {
    EnricherRow {
        id: identity.id().into_inner(),
        name: identity.name().as_str().to_owned(),
        repository: identity.repository().to_owned(),
        last_ping_at: identity.last_ping_at(),
        created_at: identity.created_at(),
    }
}

fn row_to_identity(row: EnricherRow) -> EnricherRepositoryResult<EnricherIdentity> {
    let name = EnricherName::new(row.name).map_err(EnricherRepositoryError::persistence)?;
    Ok(EnricherIdentity::from_persisted(
        EnricherId::from_uuid(row.id),
        name,
        row.repository,
        row.last_ping_at,
        row.created_at,
    ))
}

fn row_to_link(row: SubjectTaskRow) -> EnricherRepositoryResult<SubjectTaskLink> {
    let kind = SubjectKind::try_from(row.subject_kind.as_str())
        .map_err(EnricherRepositoryError::persistence)?;
    Ok(SubjectTaskLink::from_persisted(
        EnricherId::from_uuid(row.enricher_id),
        SubjectKey {
            kind,
            id: row.subject_id,
        },
        TaskId::from_uuid(row.task_id),
        row.created_at,
    ))
}
