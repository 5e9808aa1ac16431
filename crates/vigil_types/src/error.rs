use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeError {
    #[error("Column '{column}' has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{0}' is not present in the data")]
    MissingColumn(String),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}
