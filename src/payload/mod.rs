//! Uploaded data payloads awaiting processing by the cleaning pipeline.
//!
//! Each payload is created together with a pending "Data payload
//! processing" task so the pipeline enricher can reuse it.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
