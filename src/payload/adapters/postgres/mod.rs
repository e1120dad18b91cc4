//! `PostgreSQL` adapter for payload persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresDataPayloadRepository;
