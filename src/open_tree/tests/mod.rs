//! Unit tests for the Open Tree of Life context.
