//! Validation errors for pipeline definitions.

use thiserror::Error;

/// Errors raised while validating or rendering pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirtyPipelineDomainError {
    /// The pipeline has no stages.
    #[error("the pipeline must contain at least one stage")]
    EmptyPipeline,

    /// Two stages share a name.
    #[error("duplicate pipeline stage: {0}")]
    DuplicateStage(String),

    /// A stage has no program to run.
    #[error("pipeline stage {0} has no program")]
    MissingProgram(String),

    /// An argument template could not be rendered.
    #[error("failed to render arguments of stage {stage}: {reason}")]
    TemplateRender {
        /// Stage whose arguments failed.
        stage: String,
        /// Renderer message.
        reason: String,
    },
}
