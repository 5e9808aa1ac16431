use crate::error::DataFrameError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;
use vigil_types::{Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFormat {
    Parquet,
    Json,
}

impl ReferenceFormat {
    pub fn from_path(path: &Path) -> Result<Self, DataFrameError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("parquet") | Some("pq") => Ok(ReferenceFormat::Parquet),
            Some("json") => Ok(ReferenceFormat::Json),
            _ => Err(DataFrameError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn open(path: &Path) -> Result<File, DataFrameError> {
    File::open(path).map_err(|source| DataFrameError::OpenFileError {
        path: path.display().to_string(),
        source,
    })
}

/// Converts arrow batches into records through the arrow-json array writer.
fn batches_to_rows(batches: &[RecordBatch]) -> Result<Vec<Row>, DataFrameError> {
    let mut writer = arrow_json::ArrayWriter::new(Vec::new());
    for batch in batches {
        writer.write(batch)?;
    }
    writer.finish()?;

    let buffer = writer.into_inner();
    if buffer.is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_slice(&buffer)?)
}

fn read_parquet(path: &Path) -> Result<Table, DataFrameError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?.build()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    debug!("Read {} record batches from {}", batches.len(), path.display());

    Ok(Table::new(batches_to_rows(&batches)?))
}

fn read_json(path: &Path) -> Result<Table, DataFrameError> {
    let rows: Vec<Row> = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    Ok(Table::new(rows))
}

/// Loads a reference table, picking the reader from the file extension.
pub fn read_reference(path: &Path) -> Result<Table, DataFrameError> {
    match ReferenceFormat::from_path(path)? {
        ReferenceFormat::Parquet => read_parquet(path),
        ReferenceFormat::Json => read_json(path),
    }
}
