//! Fixtures shared by the vigil test suites.
//!
//! Everything here panics on failure; it is only meant to be called from tests.

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use serde_json::{json, Value};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vigil_types::Row;

const PICKUP_ZONES: [&str; 5] = ["74", "41", "75", "166", "95"];
const DROPOFF_ZONES: [&str; 5] = ["42", "75", "236", "263", "41"];

pub const NUMERICAL_FEATURES: [&str; 3] = ["passenger_count", "trip_distance", "fare_amount"];
pub const CATEGORICAL_FEATURES: [&str; 2] = ["PULocationID", "DOLocationID"];

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

fn format_time(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn to_row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

/// Deterministic green-taxi-like trip `i`.
pub fn taxi_row(i: usize) -> Row {
    let pickup = base_time() + Duration::minutes(7 * i as i64);
    let duration = 5.0 + ((i * 37) % 40) as f64;
    let dropoff = pickup + Duration::seconds((duration * 60.0) as i64);
    let trip_distance = 0.5 + ((i * 13) % 50) as f64 / 10.0;

    to_row(json!({
        "lpep_pickup_datetime": format_time(pickup),
        "lpep_dropoff_datetime": format_time(dropoff),
        "PULocationID": PICKUP_ZONES[i % 5],
        "DOLocationID": DROPOFF_ZONES[(i * 3) % 5],
        "passenger_count": ((i % 4) + 1) as f64,
        "trip_distance": trip_distance,
        "fare_amount": 2.5 + trip_distance * 2.5,
        "duration": duration,
        "prediction": duration * 0.95 + 0.5,
    }))
}

/// `count` trips starting at trip number `offset`.
pub fn taxi_rows(offset: usize, count: usize) -> Vec<Row> {
    (offset..offset + count).map(taxi_row).collect()
}

/// Trips whose numerical features are shifted far away from [`taxi_rows`]
/// and whose pickup zone never occurs there.
pub fn drifted_taxi_rows(offset: usize, count: usize) -> Vec<Row> {
    taxi_rows(offset, count)
        .into_iter()
        .map(|mut row| {
            for feature in NUMERICAL_FEATURES {
                let shifted = row[feature].as_f64().unwrap() * 10.0 + 100.0;
                row.insert(feature.to_string(), json!(shifted));
            }
            row.insert("PULocationID".to_string(), json!("1"));
            row
        })
        .collect()
}

pub fn taxi_schema() -> SchemaRef {
    let timestamp = DataType::Timestamp(TimeUnit::Microsecond, None);
    Arc::new(Schema::new(vec![
        Field::new("lpep_pickup_datetime", timestamp.clone(), true),
        Field::new("lpep_dropoff_datetime", timestamp, true),
        Field::new("PULocationID", DataType::Utf8, true),
        Field::new("DOLocationID", DataType::Utf8, true),
        Field::new("passenger_count", DataType::Float64, true),
        Field::new("trip_distance", DataType::Float64, true),
        Field::new("fare_amount", DataType::Float64, true),
        Field::new("duration", DataType::Float64, true),
        Field::new("prediction", DataType::Float64, true),
    ]))
}

/// Writes `rows` as a parquet file with the [`taxi_schema`].
pub fn write_parquet_reference(path: &Path, rows: &[Row]) {
    let schema = taxi_schema();

    let mut ndjson = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut ndjson, row).unwrap();
        ndjson.push(b'\n');
    }

    let reader = arrow_json::ReaderBuilder::new(schema.clone())
        .build(Cursor::new(ndjson))
        .unwrap();

    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    for batch in reader {
        writer.write(&batch.unwrap()).unwrap();
    }
    writer.close().unwrap();
}

pub fn write_json_reference(path: &Path, rows: &[Row]) {
    let file = File::create(path).unwrap();
    serde_json::to_writer(file, rows).unwrap();
}

/// Writes a single-dataset (`taxi`) monitoring config into `dir`.
pub fn write_config(
    dir: &Path,
    reference: &Path,
    window_size: usize,
    calculation_period_sec: u64,
    monitors: &[&str],
) -> PathBuf {
    let monitors = monitors
        .iter()
        .map(|m| format!("      - {m}"))
        .collect::<Vec<_>>()
        .join("\n");

    let config = format!(
        r#"service:
  datasets_path: {datasets_path}
  min_reference_size: 10
  use_reference: true
  moving_reference: false
  window_size: {window_size}
  calculation_period_sec: {calculation_period_sec}
datasets:
  taxi:
    reference_file: {reference}
    monitors:
{monitors}
    column_mapping:
      target: duration
      prediction: prediction
      numerical_features: [{numerical}]
      categorical_features: [{categorical}]
    duration:
      start: lpep_pickup_datetime
      end: lpep_dropoff_datetime
"#,
        datasets_path = dir.display(),
        reference = reference.display(),
        numerical = NUMERICAL_FEATURES.join(", "),
        categorical = CATEGORICAL_FEATURES.join(", "),
    );

    let path = dir.join("config.yaml");
    std::fs::write(&path, config).unwrap();
    path
}
