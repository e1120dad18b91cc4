//! Diesel row models for taxon persistence.

use super::schema::taxa;
use crate::task::domain::ActorId;
use crate::taxon::{
    domain::{Taxon, TaxonId, TaxonName},
    ports::{TaxonRepositoryError, TaxonRepositoryResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for taxon records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = taxa)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaxonRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub author_id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
}

impl TaxonRow {
    pub(crate) fn from_domain(taxon: &Taxon) -> Self {
        Self {
            id: taxon.id().into_inner(),
            name: taxon.name().as_str().to_owned(),
            description: taxon.description().to_owned(),
            author_id: taxon.author().into_inner(),
            created_at: taxon.created_at(),
        }
    }

    pub(crate) fn into_domain(self) -> TaxonRepositoryResult<Taxon> {
        let name = TaxonName::new(self.name).map_err(TaxonRepositoryError::persistence)?;
        Ok(Taxon::from_persisted(
            TaxonId::from_uuid(self.id),
            name,
            self.description,
            ActorId::from_uuid(self.author_id),
            self.created_at,
        ))
    }
}
