//! `PostgreSQL` adapter for taxon persistence.

mod models;
mod repository;
pub(crate) mod schema;

pub(crate) use models::TaxonRow;
pub use repository::PostgresTaxonRepository;
