//! `PostgreSQL` repository implementation for taxa.

use super::{models::TaxonRow, schema::taxa};
use crate::postgres::{self, PgPool};
use crate::taxon::{
    domain::{Taxon, TaxonId},
    ports::{TaxonRepository, TaxonRepositoryError, TaxonRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed taxon repository.
#[derive(Debug, Clone)]
pub struct PostgresTaxonRepository {
    pool: PgPool,
}

impl PostgresTaxonRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaxonRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaxonRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        postgres::run_blocking(&self.pool, f).await
    }
}

#[async_trait]
impl TaxonRepository for PostgresTaxonRepository {
    async fn store(&self, taxon: &Taxon) -> TaxonRepositoryResult<()> {
        let taxon_id = taxon.id();
        let row = TaxonRow::from_domain(taxon);
        self.run_blocking(move |connection| {
            diesel::insert_into(taxa::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaxonRepositoryError::DuplicateTaxon(taxon_id)
                    }
                    _ => TaxonRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaxonId) -> TaxonRepositoryResult<Option<Taxon>> {
        self.run_blocking(move |connection| {
            let row = taxa::table
                .filter(taxa::id.eq(id.into_inner()))
                .select(TaxonRow::as_select())
                .first::<TaxonRow>(connection)
                .optional()
                .map_err(TaxonRepositoryError::persistence)?;
            row.map(TaxonRow::into_domain).transpose()
        })
        .await
    }

    async fn list(&self) -> TaxonRepositoryResult<Vec<Taxon>> {
        self.run_blocking(move |connection| {
            taxa::table
                .order((taxa::created_at.asc(), taxa::id.asc()))
                .select(TaxonRow::as_select())
                .load::<TaxonRow>(connection)
                .map_err(TaxonRepositoryError::persistence)?
                .into_iter()
                .map(TaxonRow::into_domain)
                .collect()
        })
        .await
    }
}
