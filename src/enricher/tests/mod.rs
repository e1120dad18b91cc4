//! Unit tests for the enricher module.

mod service_tests;
