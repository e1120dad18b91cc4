//! Adapter implementations for the payload port.

pub mod memory;
pub mod postgres;
