//! Diesel row models for Open Tree of Life entries.

use super::schema::open_tree_of_life;
use crate::open_tree::{
    domain::{OpenTreeEntry, OpenTreeEntryId, OttId, PersistedOpenTreeEntry, RankNames, TaxonomicRank},
    ports::{OpenTreeEntryRepositoryError, OpenTreeEntryRepositoryResult},
};
use crate::taxon::domain::TaxonId;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for Open Tree of Life entries with one column per kept rank.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = open_tree_of_life)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct OpenTreeEntryRow {
    pub id: uuid::Uuid,
    pub taxon_id: uuid::Uuid,
    pub ott_id: i64,
    pub domain: Option<String>,
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class_name: Option<String>,
    pub order_name: Option<String>,
    pub family: Option<String>,
    pub tribe: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
    pub version: String,
    pub resolved_taxon_name: String,
    pub is_synonym: bool,
    pub is_approximated_match: bool,
    pub created_at: DateTime<Utc>,
}

impl OpenTreeEntryRow {
    pub(super) fn from_domain(entry: &OpenTreeEntry) -> OpenTreeEntryRepositoryResult<Self> {
        let ott_id =
            i64::try_from(entry.ott_id().value()).map_err(OpenTreeEntryRepositoryError::persistence)?;
        let ranks = entry.ranks();
        let rank = |which: TaxonomicRank| ranks.get(which).map(str::to_owned);
        Ok(Self {
            id: entry.id().into_inner(),
            taxon_id: entry.taxon().into_inner(),
            ott_id,
            domain: rank(TaxonomicRank::Domain),
            kingdom: rank(TaxonomicRank::Kingdom),
            phylum: rank(TaxonomicRank::Phylum),
            class_name: rank(TaxonomicRank::Class),
            order_name: rank(TaxonomicRank::Order),
            family: rank(TaxonomicRank::Family),
            tribe: rank(TaxonomicRank::Tribe),
            genus: rank(TaxonomicRank::Genus),
            species: rank(TaxonomicRank::Species),
            version: entry.version().to_owned(),
            resolved_taxon_name: entry.resolved_taxon_name().to_owned(),
            is_synonym: entry.is_synonym(),
            is_approximated_match: entry.is_approximated_match(),
            created_at: entry.created_at(),
        })
    }

    pub(super) fn into_domain(self) -> OpenTreeEntryRepositoryResult<OpenTreeEntry> {
        let ott_id = u64::try_from(self.ott_id).map_err(OpenTreeEntryRepositoryError::persistence)?;
        let ranks: RankNames = [
            (TaxonomicRank::Domain, self.domain),
            (TaxonomicRank::Kingdom, self.kingdom),
            (TaxonomicRank::Phylum, self.phylum),
            (TaxonomicRank::Class, self.class_name),
            (TaxonomicRank::Order, self.order_name),
            (TaxonomicRank::Family, self.family),
            (TaxonomicRank::Tribe, self.tribe),
            (TaxonomicRank::Genus, self.genus),
            (TaxonomicRank::Species, self.species),
        ]
        .into_iter()
        .filter_map(|(rank, name)| name.map(|value| (rank, value)))
        .collect();

        Ok(OpenTreeEntry::from_persisted(PersistedOpenTreeEntry {
            id: OpenTreeEntryId::from_uuid(self.id),
            taxon: TaxonId::from_uuid(self.taxon_id),
            ott_id: OttId::new(ott_id),
            ranks,
            version: self.version,
            resolved_taxon_name: self.resolved_taxon_name,
            is_synonym: self.is_synonym,
            is_approximated_match: self.is_approximated_match,
            created_at: self.created_at,
        }))
    }
}
