//! Error types for enricher domain validation.

use thiserror::Error;

/// Errors returned while constructing enricher domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnricherDomainError {
    /// The enricher name is empty after trimming.
    #[error("enricher name must not be empty")]
    EmptyEnricherName,

    /// The enricher name exceeds the storage limit.
    #[error("enricher name exceeds 80 character limit: {0}")]
    EnricherNameTooLong(String),
}

/// Error returned while parsing subject kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown subject kind: {0}")]
pub struct ParseSubjectKindError(pub String);
