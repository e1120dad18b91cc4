//! Adapter implementations for the stage runner port.

pub mod process;
pub mod scripted;
