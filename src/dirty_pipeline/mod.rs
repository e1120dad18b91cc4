//! Dirty Pipeline enrichment of uploaded data payloads.
//!
//! The pipeline is a fixed, ordered chain of external processes. Each stage
//! runs under its own derived task so that partial progress through a run
//! can be inspected and restarted, and the first failing stage aborts the
//! rest of the run.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
