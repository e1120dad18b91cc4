//! Port contracts for enrichers.

pub mod provider;
pub mod repository;

pub use provider::{EnrichmentProvider, EnrichmentProviderError, EnrichmentProviderResult};
pub use repository::{EnricherRepository, EnricherRepositoryError, EnricherRepositoryResult};
