//! Taxa curated by users and enriched by external taxonomy services.

pub mod adapters;
pub mod domain;
pub mod ports;
