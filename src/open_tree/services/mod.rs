//! Services for Open Tree of Life enrichment.

mod enricher;

pub use enricher::{
    OPEN_TREE_ENRICHER_NAME, OPEN_TREE_REPOSITORY, OPEN_TREE_TASK_TYPE_DESCRIPTION,
    OpenTreeEnricher,
};
