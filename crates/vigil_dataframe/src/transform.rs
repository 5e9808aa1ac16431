use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::info;
use vigil_settings::DurationSettings;
use vigil_types::Table;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses RFC 3339 strings, naive ISO timestamps or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Adds the duration column (minutes between `start` and `end`) and keeps
/// only rows inside the configured bounds.
pub fn apply_duration(mut table: Table, settings: &DurationSettings) -> Table {
    let before = table.len();

    for row in table.rows_mut() {
        let start = row.get(&settings.start).and_then(parse_timestamp);
        let end = row.get(&settings.end).and_then(parse_timestamp);

        let minutes = match (start, end) {
            (Some(start), Some(end)) => {
                Value::from((end - start).num_milliseconds() as f64 / 60_000.0)
            }
            _ => Value::Null,
        };
        row.insert(settings.column.clone(), minutes);
    }

    table.retain(|row| {
        row.get(&settings.column)
            .and_then(Value::as_f64)
            .is_some_and(|d| d >= settings.min_minutes && d <= settings.max_minutes)
    });

    info!(
        "Derived {} column: kept {} of {} rows",
        settings.column,
        table.len(),
        before
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vigil_types::Row;

    fn settings() -> DurationSettings {
        DurationSettings {
            start: "pickup".to_string(),
            end: "dropoff".to_string(),
            column: "duration".to_string(),
            min_minutes: 1.0,
            max_minutes: 60.0,
        }
    }

    fn row(pickup: Value, dropoff: Value) -> Row {
        let mut row = Row::new();
        row.insert("pickup".to_string(), pickup);
        row.insert("dropoff".to_string(), dropoff);
        row
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2021-01-01 00:15:56", "%Y-%m-%d %H:%M:%S")
            .unwrap();

        assert_eq!(parse_timestamp(&json!("2021-01-01T00:15:56")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2021-01-01 00:15:56")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2021-01-01T00:15:56Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!(1609460156000i64)), Some(expected));
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&Value::Null), None);
    }

    #[test]
    fn test_apply_duration_filters_bounds() {
        let table = Table::new(vec![
            // 10 minutes, kept
            row(json!("2021-01-01T00:00:00"), json!("2021-01-01T00:10:00")),
            // 30 seconds, too short
            row(json!("2021-01-01T00:00:00"), json!("2021-01-01T00:00:30")),
            // 2 hours, too long
            row(json!("2021-01-01T00:00:00"), json!("2021-01-01T02:00:00")),
            // unparseable, dropped
            row(json!("garbage"), json!("2021-01-01T00:10:00")),
            // exactly 60 minutes, kept
            row(json!("2021-01-01T00:00:00"), json!("2021-01-01T01:00:00")),
        ]);

        let table = apply_duration(table, &settings());
        assert_eq!(table.len(), 2);

        let durations = table.numeric_column("duration");
        approx::assert_relative_eq!(durations[0], 10.0);
        approx::assert_relative_eq!(durations[1], 60.0);
    }
}
