//! Contract implemented by each concrete enricher.

use crate::enricher::domain::EnrichableSubject;
use crate::task::domain::{FailureReason, Task};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for provider lookups.
pub type EnrichmentProviderResult<T> = Result<T, EnrichmentProviderError>;

/// Behaviour specific to one kind of enrichment.
///
/// The generic worker owns task bookkeeping; a provider only answers what it
/// can work on and performs the work itself.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Unique enricher name used for registration.
    fn name(&self) -> &str;

    /// Source repository of the implementation.
    fn repository(&self) -> &str;

    /// Name of the task type recording each attempt.
    fn task_type_name(&self) -> &str;

    /// Description stored with the task type on first use.
    fn task_type_description(&self) -> &str {
        ""
    }

    /// Interval between two checks of the start condition.
    fn sleep_between_start_attempts(&self) -> Duration;

    /// Returns whether `subject` is something this enricher handles and has
    /// not handled yet.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentProviderError`] when the lookup fails.
    async fn can_enrich(&self, subject: &EnrichableSubject) -> EnrichmentProviderResult<bool>;

    /// Returns whether work on `task` may begin now.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentProviderError`] when the check fails.
    async fn task_can_start(
        &self,
        _subject: &EnrichableSubject,
        _task: &Task,
    ) -> EnrichmentProviderResult<bool> {
        Ok(true)
    }

    /// Discovers subjects awaiting enrichment.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentProviderError`] when discovery fails.
    async fn new_elements_to_enrich(&self) -> EnrichmentProviderResult<Vec<EnrichableSubject>>;

    /// Performs the enrichment for a started task.
    ///
    /// # Errors
    ///
    /// Returns the [`FailureReason`] recorded on the failed task.
    async fn enrich(&self, subject: &EnrichableSubject, task: &Task) -> Result<(), FailureReason>;
}

/// Infrastructure failure inside a provider.
#[derive(Debug, Clone, Error)]
#[error("enrichment provider error: {0}")]
pub struct EnrichmentProviderError(Arc<dyn std::error::Error + Send + Sync>);

impl EnrichmentProviderError {
    /// Wraps an underlying error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
