pub mod clock;
pub mod dataset;
pub mod error;
pub mod schedule;
pub mod service;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dataset::{load_datasets, LoadedDataset};
pub use error::MonitorError;
pub use schedule::ScheduleGate;
pub use service::{IterateOutcome, MonitoringService};
pub use window::WindowBuffer;
