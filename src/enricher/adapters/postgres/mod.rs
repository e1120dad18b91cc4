//! `PostgreSQL` adapter for enricher persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresEnricherRepository;
