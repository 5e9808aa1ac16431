pub mod error;
pub mod gauges;
pub mod service;

pub use error::ObservabilityError;
pub use gauges::{GaugeRegistry, PublishOutcome, DATASET_LABEL};
pub use service::{prometheus_handle, render_service_metrics, ServiceMetrics};
