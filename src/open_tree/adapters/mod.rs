//! Adapter implementations for the Open Tree of Life ports.

pub mod http;
pub mod memory;
pub mod postgres;
