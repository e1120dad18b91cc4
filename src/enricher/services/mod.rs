//! Application services for running enrichers.

mod shutdown;
mod worker;

pub use shutdown::listen_for_shutdown;
pub use worker::{EnricherError, EnricherResult, EnricherService};
