//! Domain model for pipeline stages and their process invocations.

mod error;
mod stage;
mod stages;

pub use error::DirtyPipelineDomainError;
pub use stage::{PipelineStage, StageContext, StageInvocation, StageOutput};
pub use stages::{default_stages, validate_stages};
