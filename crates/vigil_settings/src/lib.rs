pub mod error;
pub mod monitoring;
pub mod server;

pub use error::ConfigError;
pub use monitoring::{DatasetSettings, DurationSettings, MonitoringConfig, ServiceOptions};
pub use server::{LogSettings, VigilServerConfig};
