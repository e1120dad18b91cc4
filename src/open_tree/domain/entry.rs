//! Persisted Open Tree of Life enrichment of one taxon.

use super::{OttId, RankNames, ResolvedTaxon};
use crate::macros::uuid_identifier;
use crate::taxon::domain::TaxonId;
use chrono::{DateTime, Utc};
use mockable::Clock;

uuid_identifier!(
    /// Unique identifier for an Open Tree of Life entry.
    OpenTreeEntryId
);

/// Accepted Open Tree of Life resolution for a taxon. At most one exists per
/// taxon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTreeEntry {
    id: OpenTreeEntryId,
    taxon: TaxonId,
    ott_id: OttId,
    ranks: RankNames,
    version: String,
    resolved_taxon_name: String,
    is_synonym: bool,
    is_approximated_match: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOpenTreeEntry {
    /// Entry identifier.
    pub id: OpenTreeEntryId,
    /// Enriched taxon.
    pub taxon: TaxonId,
    /// Matched taxonomy identifier.
    pub ott_id: OttId,
    /// Names per rank.
    pub ranks: RankNames,
    /// Taxonomy version the match came from.
    pub version: String,
    /// Name the taxon resolved to.
    pub resolved_taxon_name: String,
    /// Whether the resolved name is a synonym.
    pub is_synonym: bool,
    /// Whether the match was fuzzy.
    pub is_approximated_match: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl OpenTreeEntry {
    /// Creates an entry from a resolved match.
    #[must_use]
    pub fn new(
        taxon: TaxonId,
        resolved: ResolvedTaxon,
        version: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let ResolvedTaxon { matched, ranks } = resolved;
        Self {
            id: OpenTreeEntryId::new(),
            taxon,
            ott_id: matched.ott_id,
            ranks,
            version: version.into(),
            resolved_taxon_name: matched.matched_name,
            is_synonym: matched.is_synonym,
            is_approximated_match: matched.is_approximate_match,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedOpenTreeEntry) -> Self {
        Self {
            id: data.id,
            taxon: data.taxon,
            ott_id: data.ott_id,
            ranks: data.ranks,
            version: data.version,
            resolved_taxon_name: data.resolved_taxon_name,
            is_synonym: data.is_synonym,
            is_approximated_match: data.is_approximated_match,
            created_at: data.created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> OpenTreeEntryId {
        self.id
    }

    /// Returns the enriched taxon.
    #[must_use]
    pub const fn taxon(&self) -> TaxonId {
        self.taxon
    }

    /// Returns the matched taxonomy identifier.
    #[must_use]
    pub const fn ott_id(&self) -> OttId {
        self.ott_id
    }

    /// Returns the names per rank.
    #[must_use]
    pub const fn ranks(&self) -> &RankNames {
        &self.ranks
    }

    /// Returns the taxonomy version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the name the taxon resolved to.
    #[must_use]
    pub fn resolved_taxon_name(&self) -> &str {
        &self.resolved_taxon_name
    }

    /// Returns whether the resolved name is a synonym.
    #[must_use]
    pub const fn is_synonym(&self) -> bool {
        self.is_synonym
    }

    /// Returns whether the match was fuzzy.
    #[must_use]
    pub const fn is_approximated_match(&self) -> bool {
        self.is_approximated_match
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
