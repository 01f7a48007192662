//! Service orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Service, ServiceConfig};
pub use stats::ServiceStats;
