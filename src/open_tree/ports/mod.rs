//! Port contracts for Open Tree of Life enrichment.

pub mod repository;
pub mod taxonomy;

pub use repository::{
    OpenTreeEntryRepository, OpenTreeEntryRepositoryError, OpenTreeEntryRepositoryResult,
};
pub use taxonomy::{NameResolution, TaxonomyService, TaxonomyServiceError, TaxonomyServiceResult};
