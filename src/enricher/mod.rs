//! Polling workers that enrich subjects and record each attempt as a task.
//!
//! An enricher registers itself once by name, then repeatedly discovers
//! subjects it can enrich, runs them through the task lifecycle, and adapts
//! its polling interval to whether anything succeeded. Concrete enrichers
//! plug in through [`ports::EnrichmentProvider`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
