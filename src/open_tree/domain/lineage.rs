//! Taxonomic ranks and the long-to-wide lineage pivot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Open Tree Taxonomy identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OttId(u64);

impl OttId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OttId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ott{}", self.0)
    }
}

/// Ranks kept from a lineage, from most general to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomicRank {
    /// Domain, such as Eukaryota.
    Domain,
    /// Kingdom.
    Kingdom,
    /// Phylum.
    Phylum,
    /// Class.
    Class,
    /// Order.
    Order,
    /// Family.
    Family,
    /// Tribe.
    Tribe,
    /// Genus.
    Genus,
    /// Species.
    Species,
}

impl TaxonomicRank {
    /// Every kept rank in lineage order.
    pub const ALL: [Self; 9] = [
        Self::Domain,
        Self::Kingdom,
        Self::Phylum,
        Self::Class,
        Self::Order,
        Self::Family,
        Self::Tribe,
        Self::Genus,
        Self::Species,
    ];

    /// Returns the lowercase rank name used by the taxonomy service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Kingdom => "kingdom",
            Self::Phylum => "phylum",
            Self::Class => "class",
            Self::Order => "order",
            Self::Family => "family",
            Self::Tribe => "tribe",
            Self::Genus => "genus",
            Self::Species => "species",
        }
    }

    /// Parses a rank name, returning `None` for ranks that are not kept
    /// (`no rank`, `superfamily`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_str() == normalized)
    }
}

impl fmt::Display for TaxonomicRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name per taxonomic rank; ranks absent from the lineage stay absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankNames(BTreeMap<TaxonomicRank, String>);

impl RankNames {
    /// Creates an empty rank map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the name recorded for `rank`.
    #[must_use]
    pub fn get(&self, rank: TaxonomicRank) -> Option<&str> {
        self.0.get(&rank).map(String::as_str)
    }

    /// Records `name` for `rank` unless the rank already has one.
    pub fn insert_first(&mut self, rank: TaxonomicRank, name: impl Into<String>) {
        if let Entry::Vacant(slot) = self.0.entry(rank) {
            slot.insert(name.into());
        }
    }

    /// Returns whether no rank has a name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over recorded ranks in lineage order.
    pub fn iter(&self) -> impl Iterator<Item = (TaxonomicRank, &str)> {
        self.0.iter().map(|(rank, name)| (*rank, name.as_str()))
    }
}

impl FromIterator<(TaxonomicRank, String)> for RankNames {
    fn from_iter<I: IntoIterator<Item = (TaxonomicRank, String)>>(iter: I) -> Self {
        let mut names = Self::new();
        for (rank, name) in iter {
            names.insert_first(rank, name);
        }
        names
    }
}

/// One ancestor of a queried identifier in long format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageRow {
    /// Identifier whose lineage this row belongs to.
    pub query: OttId,
    /// Rank name as reported by the service.
    pub rank: String,
    /// Taxon name at that rank.
    pub name: String,
}

/// Pivots long lineage rows into one [`RankNames`] per queried identifier.
///
/// Rows with ranks that are not kept are ignored. When a rank repeats for
/// the same identifier the first row wins.
#[must_use]
pub fn pivot_lineage(rows: &[LineageRow]) -> BTreeMap<OttId, RankNames> {
    let mut pivoted: BTreeMap<OttId, RankNames> = BTreeMap::new();
    for row in rows {
        let Some(rank) = TaxonomicRank::parse(&row.rank) else {
            continue;
        };
        pivoted
            .entry(row.query)
            .or_default()
            .insert_first(rank, row.name.clone());
    }
    pivoted
}
