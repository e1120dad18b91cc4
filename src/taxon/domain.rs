//! Taxon records owned by the curation layer.

use crate::macros::uuid_identifier;
use crate::task::domain::ActorId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

uuid_identifier!(
    /// Unique identifier for a taxon.
    TaxonId
);

/// Errors returned while constructing taxon values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxonDomainError {
    /// The scientific name is empty after trimming.
    #[error("taxon name must not be empty")]
    EmptyTaxonName,
}

/// Scientific name as entered by a curator, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonName(String);

impl TaxonName {
    /// Creates a validated taxon name.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonDomainError::EmptyTaxonName`] for blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, TaxonDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaxonDomainError::EmptyTaxonName);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A taxon whose name can be resolved against a reference taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    id: TaxonId,
    name: TaxonName,
    description: String,
    author: ActorId,
    created_at: DateTime<Utc>,
}

impl Taxon {
    /// Creates a new taxon.
    #[must_use]
    pub fn new(
        name: TaxonName,
        description: impl Into<String>,
        author: ActorId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaxonId::new(),
            name,
            description: description.into(),
            author,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a taxon from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TaxonId,
        name: TaxonName,
        description: String,
        author: ActorId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            author,
            created_at,
        }
    }

    /// Returns the taxon identifier.
    #[must_use]
    pub const fn id(&self) -> TaxonId {
        self.id
    }

    /// Returns the scientific name.
    #[must_use]
    pub const fn name(&self) -> &TaxonName {
        &self.name
    }

    /// Returns the free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the curator who created the taxon.
    #[must_use]
    pub const fn author(&self) -> ActorId {
        self.author
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
