//! Adapter implementations for the taxon port.

pub mod memory;
pub mod postgres;
