//! Adapter implementations for the task ports.

pub mod filesystem;
pub mod memory;
pub mod postgres;
