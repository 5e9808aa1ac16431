pub mod engine;
pub mod error;
pub mod monitors;
pub mod psi;

mod binning;
mod stats;

pub use engine::{MetricsEngine, ModelMonitoring, Monitor, MonitorKind};
pub use error::DriftError;
