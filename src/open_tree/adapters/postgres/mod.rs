//! `PostgreSQL` adapter for Open Tree of Life entries.

mod models;
mod repository;
mod schema;

pub use repository::PostgresOpenTreeEntryRepository;
