//! Read-only port to the external taxonomy service.

use crate::open_tree::domain::{LineageRow, NameMatch, OttId};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for taxonomy service calls.
pub type TaxonomyServiceResult<T> = Result<T, TaxonomyServiceError>;

/// Candidates returned for a batch of names.
#[derive(Debug, Clone, PartialEq)]
pub struct NameResolution {
    /// Version of the taxonomy the matches come from.
    pub taxonomy_version: String,
    /// Every candidate for every queried name, in service order.
    pub matches: Vec<NameMatch>,
}

/// Name resolution and lineage lookup.
#[async_trait]
pub trait TaxonomyService: Send + Sync {
    /// Resolves scientific names to candidate matches.
    async fn match_names(&self, names: &[String]) -> TaxonomyServiceResult<NameResolution>;

    /// Returns the lineage of `ott_id` as long rows, the taxon itself
    /// included.
    async fn lineage(&self, ott_id: OttId) -> TaxonomyServiceResult<Vec<LineageRow>>;
}

/// Errors returned by taxonomy service implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxonomyServiceError {
    /// The request could not be sent or the response not received.
    #[error("taxonomy service transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("taxonomy service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("taxonomy service response could not be decoded: {0}")]
    Decode(String),
}
