//! Registered enricher identity.

use super::EnricherDomainError;
use crate::macros::uuid_identifier;
use crate::task::domain::ActorId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for an enricher name, matching the `VARCHAR(80)` column.
const MAX_NAME_LENGTH: usize = 80;

uuid_identifier!(
    /// Unique identifier for a registered enricher.
    EnricherId
);

/// Validated, trimmed enricher name. Names are unique across workers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnricherName(String);

impl EnricherName {
    /// Creates a validated enricher name.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherDomainError::EmptyEnricherName`] when the value is
    /// empty after trimming or [`EnricherDomainError::EnricherNameTooLong`]
    /// when it exceeds 80 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, EnricherDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(EnricherDomainError::EmptyEnricherName);
        }
        if normalized.chars().count() > MAX_NAME_LENGTH {
            return Err(EnricherDomainError::EnricherNameTooLong(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnricherName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persistent record of a registered enricher.
///
/// The enricher acts as a bot user: tasks it creates are owned by
/// [`EnricherIdentity::actor_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnricherIdentity {
    id: EnricherId,
    name: EnricherName,
    repository: String,
    last_ping_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl EnricherIdentity {
    /// Creates a new, never-pinged identity.
    #[must_use]
    pub fn new(name: EnricherName, repository: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: EnricherId::new(),
            name,
            repository: repository.into(),
            last_ping_at: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an identity from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: EnricherId,
        name: EnricherName,
        repository: String,
        last_ping_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            repository,
            last_ping_at,
            created_at,
        }
    }

    /// Returns the enricher identifier.
    #[must_use]
    pub const fn id(&self) -> EnricherId {
        self.id
    }

    /// Returns the actor that owns tasks created by this enricher.
    #[must_use]
    pub const fn actor_id(&self) -> ActorId {
        ActorId::from_uuid(self.id.into_inner())
    }

    /// Returns the unique name.
    #[must_use]
    pub const fn name(&self) -> &EnricherName {
        &self.name
    }

    /// Returns the source repository of the enricher implementation.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the last liveness timestamp.
    #[must_use]
    pub const fn last_ping_at(&self) -> Option<DateTime<Utc>> {
        self.last_ping_at
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records liveness at the current time.
    pub fn ping(&mut self, clock: &impl Clock) {
        self.last_ping_at = Some(clock.utc());
    }
}
