//! Unit tests for the Dirty Pipeline context.

mod domain_tests;
