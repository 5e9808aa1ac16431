use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Unknown monitor: {0}")]
    UnknownMonitor(String),

    #[error("Column {0} not present in data")]
    MissingColumn(String),

    #[error("{0}")]
    EmptyArrayError(String),

    #[error("Insufficient Data Error: {0}")]
    InsufficientDataError(String),

    #[error("{0}")]
    InvalidParameterError(String),

    #[error(transparent)]
    TypeError(#[from] vigil_types::TypeError),
}
