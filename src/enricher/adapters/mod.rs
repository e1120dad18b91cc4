//! Adapter implementations for the enricher repository port.

pub mod memory;
pub mod postgres;
