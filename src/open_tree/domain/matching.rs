//! Name-match selection and the lineage join.

use super::{OttId, RankNames};
use std::collections::BTreeMap;

/// Candidate returned by the name-resolution service.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    /// Query string as normalised by the service.
    pub search_string: String,
    /// Name the query resolved to.
    pub matched_name: String,
    /// Identifier of the matched taxon.
    pub ott_id: OttId,
    /// Match confidence reported by the service.
    pub score: f64,
    /// Whether `matched_name` is a synonym of the accepted name.
    pub is_synonym: bool,
    /// Whether the match was fuzzy.
    pub is_approximate_match: bool,
}

/// Keeps one match per search string, preferring accepted names.
///
/// Matches are ordered by `(search_string, is_synonym)` with a stable sort,
/// so among equally ranked rows the service's order decides.
#[must_use]
pub fn select_preferred_matches(mut matches: Vec<NameMatch>) -> Vec<NameMatch> {
    matches.sort_by(|left, right| {
        (left.search_string.as_str(), left.is_synonym)
            .cmp(&(right.search_string.as_str(), right.is_synonym))
    });
    matches.dedup_by(|later, earlier| later.search_string == earlier.search_string);
    matches
}

/// Preferred match together with its pivoted lineage.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTaxon {
    /// Selected name match.
    pub matched: NameMatch,
    /// Rank names for the matched identifier; empty when no lineage was
    /// found.
    pub ranks: RankNames,
}

/// Left-joins pivoted lineages onto the preferred matches.
///
/// Every match is kept; identifiers without a lineage get empty rank names.
#[must_use]
pub fn join_lineage(
    matches: Vec<NameMatch>,
    lineages: &BTreeMap<OttId, RankNames>,
) -> Vec<ResolvedTaxon> {
    matches
        .into_iter()
        .map(|matched| {
            let ranks = lineages.get(&matched.ott_id).cloned().unwrap_or_default();
            ResolvedTaxon { matched, ranks }
        })
        .collect()
}
