//! Port executing one rendered stage invocation.

use crate::dirty_pipeline::domain::{StageInvocation, StageOutput};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for stage runners.
pub type StageRunnerResult<T> = Result<T, StageRunnerError>;

/// Executes external stage processes.
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Runs `invocation` to completion and captures its output.
    ///
    /// A non-zero exit is reported through [`StageOutput`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`StageRunnerError::Spawn`] when the process cannot be
    /// started or awaited.
    async fn run(&self, invocation: &StageInvocation) -> StageRunnerResult<StageOutput>;
}

/// Errors returned by stage runners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageRunnerError {
    /// The process could not be started or awaited.
    #[error("failed to run {program}: {reason}")]
    Spawn {
        /// Executable that failed.
        program: String,
        /// Operating system message.
        reason: String,
    },
}
