//! Services for the Dirty Pipeline enricher.

mod enricher;

pub use enricher::{
    DIRTY_PIPELINE_NAME, DirtyPipelineEnricher, DirtyPipelineError, DirtyPipelineResult,
};
