//! `PostgreSQL` repository implementation for Open Tree of Life entries.

use super::{models::OpenTreeEntryRow, schema::open_tree_of_life};
use crate::open_tree::{
    domain::OpenTreeEntry,
    ports::{OpenTreeEntryRepository, OpenTreeEntryRepositoryError, OpenTreeEntryRepositoryResult},
};
use crate::postgres::{self, PgPool};
use crate::taxon::{
    adapters::postgres::{TaxonRow, schema::taxa},
    domain::{Taxon, TaxonId},
};
use async_trait::async_trait;
use diesel::dsl::{exists, not};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed entry repository.
#[derive(Debug, Clone)]
pub struct PostgresOpenTreeEntryRepository {
    pool: PgPool,
}

impl PostgresOpenTreeEntryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> OpenTreeEntryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> OpenTreeEntryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        postgres::run_blocking(&self.pool, f).await
    }
}

#[async_trait]
impl OpenTreeEntryRepository for PostgresOpenTreeEntryRepository {
    async fn store(&self, entry: &OpenTreeEntry) -> OpenTreeEntryRepositoryResult<()> {
        let taxon_id = entry.taxon();
        let row = OpenTreeEntryRow::from_domain(entry)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(open_tree_of_life::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        OpenTreeEntryRepositoryError::DuplicateTaxon(taxon_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        OpenTreeEntryRepositoryError::TaxonNotFound(taxon_id)
                    }
                    _ => OpenTreeEntryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_taxon(
        &self,
        taxon: TaxonId,
    ) -> OpenTreeEntryRepositoryResult<Option<OpenTreeEntry>> {
        self.run_blocking(move |connection| {
            let row = open_tree_of_life::table
                .filter(open_tree_of_life::taxon_id.eq(taxon.into_inner()))
                .select(OpenTreeEntryRow::as_select())
                .first::<OpenTreeEntryRow>(connection)
                .optional()
                .map_err(OpenTreeEntryRepositoryError::persistence)?;
            row.map(OpenTreeEntryRow::into_domain).transpose()
        })
        .await
    }

    async fn list_taxa_without_entry(&self) -> OpenTreeEntryRepositoryResult<Vec<Taxon>> {
        self.run_blocking(move |connection| {
            taxa_without_entry()
                .select(TaxonRow::as_select())
                .load::<TaxonRow>(connection)
                .map_err(OpenTreeEntryRepositoryError::persistence)?
                .into_iter()
                .map(|row| row.into_domain().map_err(OpenTreeEntryRepositoryError::persistence))
                .collect()
        })
        .await
    }
}

fn taxa_without_entry() -> taxa::BoxedQuery<'static, Pg> {
    taxa::table
        .filter(not(exists(
            open_tree_of_life::table.filter(open_tree_of_life::taxon_id.eq(taxa::id)),
        )))
        .order((taxa::created_at.asc(), taxa::id.asc()))
        .into_boxed()
}
