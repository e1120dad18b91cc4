//! Port contracts for running pipeline stages.

mod runner;

pub use runner::{StageRunner, StageRunnerError, StageRunnerResult};
