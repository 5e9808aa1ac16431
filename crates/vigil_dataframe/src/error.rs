use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataFrameError {
    #[error("Failed to open reference file {path}: {source}")]
    OpenFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported reference file format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Reference for dataset {dataset} has {found} rows, at least {required} required")]
    InsufficientReference {
        dataset: String,
        found: usize,
        required: usize,
    },
}
