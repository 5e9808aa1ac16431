use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservabilityError {
    #[error("Label schema conflict for {metric}: registered {registered:?}, got {received:?}")]
    LabelSchemaConflict {
        metric: String,
        registered: Vec<String>,
        received: Vec<String>,
    },

    #[error(transparent)]
    PrometheusError(#[from] prometheus::Error),

    #[error("Failed to acquire gauge registry lock")]
    LockError,

    #[error(transparent)]
    Utf8Error(#[from] std::string::FromUtf8Error),
}
