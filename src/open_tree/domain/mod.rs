//! Domain model for Open Tree of Life resolution results.

mod entry;
mod lineage;
mod matching;

pub use entry::{OpenTreeEntry, OpenTreeEntryId, PersistedOpenTreeEntry};
pub use lineage::{LineageRow, OttId, RankNames, TaxonomicRank, pivot_lineage};
pub use matching::{NameMatch, ResolvedTaxon, join_lineage, select_preferred_matches};
