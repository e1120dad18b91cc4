//! Task tracking for enrichment work.
//!
//! Every unit of work an enricher attempts is recorded as a [`domain::Task`]
//! moving through `PENDING`, `STARTED`, and finally `SUCCESS` or `FAILURE`.
//! Multi-stage work hangs derived tasks off a parent, and failures leave a
//! readable document behind. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
