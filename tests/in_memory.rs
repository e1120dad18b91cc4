//! In-memory integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `lifecycle_tests`: Task transitions, failure documents, derived tasks
//! - `enricher_flow_tests`: Polling, batch isolation, restart, shutdown
//! - `pipeline_tests`: Dirty Pipeline runs over submitted payloads

mod in_memory {
    pub mod world;

    mod enricher_flow_tests;
    mod lifecycle_tests;
    mod pipeline_tests;
}
