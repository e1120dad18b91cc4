//! Domain model for enricher identity, subjects, and scheduling.

mod backoff;
mod error;
mod identity;
mod subject;

pub use backoff::{PollBackoff, StartGatePolicy};
pub use error::{EnricherDomainError, ParseSubjectKindError};
pub use identity::{EnricherId, EnricherIdentity, EnricherName};
pub use subject::{EnrichableSubject, SubjectKey, SubjectKind, SubjectTaskLink};
