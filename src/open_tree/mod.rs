//! Open Tree of Life enrichment of taxa.
//!
//! A taxon name is resolved against the Open Tree of Life name service,
//! synonym matches lose against accepted names, and the lineage of the
//! chosen identifier is pivoted into one name per taxonomic rank before it
//! is stored as an [`domain::OpenTreeEntry`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
