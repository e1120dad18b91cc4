//! Enrichment workers for the EMIKG knowledge base.
//!
//! The crate records every unit of enrichment work as a durable task and
//! drives it through a four-state lifecycle, while polling workers discover
//! subjects to enrich and call out to external services or processes.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: In-memory, `PostgreSQL`, HTTP, and process implementations
//! - **Services**: Orchestration over the ports
//!
//! # Modules
//!
//! - [`task`]: Tasks, task types, derived tasks, and documents
//! - [`taxon`]: Curated taxa awaiting taxonomic enrichment
//! - [`payload`]: Uploaded data payloads and their pipeline entries
//! - [`enricher`]: The generic polling worker and its provider contract
//! - [`open_tree`]: Open Tree of Life name resolution
//! - [`dirty_pipeline`]: The staged payload processing chain
//! - [`config`]: Worker configuration

pub mod config;
pub mod dirty_pipeline;
pub mod enricher;
mod macros;
pub mod open_tree;
pub mod payload;
pub mod postgres;
pub mod task;
pub mod taxon;
