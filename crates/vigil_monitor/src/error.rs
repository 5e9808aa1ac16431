use thiserror::Error;
use vigil_dataframe::DataFrameError;
use vigil_drift::DriftError;
use vigil_settings::ConfigError;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Unknown monitor {monitor} configured for dataset {dataset}")]
    UnknownMonitor { dataset: String, monitor: String },

    #[error("Invalid calculation period: {0} seconds")]
    InvalidCalculationPeriod(u64),

    #[error("Window size must be greater than zero")]
    InvalidWindowSize,

    #[error("State lock poisoned for dataset {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    DriftError(#[from] DriftError),

    #[error(transparent)]
    DataFrameError(#[from] DataFrameError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}
