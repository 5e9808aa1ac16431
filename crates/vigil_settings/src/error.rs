use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file {path} could not be read: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    YamlError(#[from] serde_yaml::Error),

    #[error("window_size must be greater than zero")]
    InvalidWindowSize,

    #[error("metric_namespace {0:?} is not a valid Prometheus metric name prefix")]
    InvalidMetricNamespace(String),

    #[error(transparent)]
    RegexError(#[from] regex::Error),

    #[error("No datasets configured")]
    NoDatasets,

    #[error("Dataset {0} does not list any monitors")]
    NoMonitors(String),

    #[error("Dataset {dataset}: {message}")]
    InvalidDataset { dataset: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnvValue { key: String, value: String },
}
