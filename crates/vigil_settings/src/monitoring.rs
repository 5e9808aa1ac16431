use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use vigil_types::ColumnMapping;

/// Prometheus metric name grammar; the namespace becomes the prefix of every gauge.
const METRIC_NAMESPACE_PATTERN: &str = r"^[a-zA-Z_:][a-zA-Z0-9_:]*$";

fn default_datasets_path() -> String {
    "datasets".to_string()
}

fn default_true() -> bool {
    true
}

fn default_calculation_period_sec() -> u64 {
    15
}

fn default_metric_namespace() -> String {
    "evidently".to_string()
}

fn default_duration_column() -> String {
    "duration".to_string()
}

fn default_min_minutes() -> f64 {
    1.0
}

fn default_max_minutes() -> f64 {
    60.0
}

/// The `service` block of the monitoring config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceOptions {
    #[serde(default = "default_datasets_path")]
    pub datasets_path: String,

    #[serde(default)]
    pub min_reference_size: usize,

    #[serde(default = "default_true")]
    pub use_reference: bool,

    #[serde(default)]
    pub moving_reference: bool,

    pub window_size: usize,

    #[serde(default = "default_calculation_period_sec")]
    pub calculation_period_sec: u64,

    /// Prefix of every published gauge, joined to the metric name with `:`.
    #[serde(default = "default_metric_namespace")]
    pub metric_namespace: String,
}

/// Derives a duration column (minutes) from two timestamp columns and keeps
/// reference rows whose duration falls inside `[min_minutes, max_minutes]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationSettings {
    pub start: String,
    pub end: String,

    #[serde(default = "default_duration_column")]
    pub column: String,

    #[serde(default = "default_min_minutes")]
    pub min_minutes: f64,

    #[serde(default = "default_max_minutes")]
    pub max_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSettings {
    pub reference_file: String,

    #[serde(default)]
    pub monitors: Vec<String>,

    #[serde(default)]
    pub column_mapping: ColumnMapping,

    #[serde(default)]
    pub duration: Option<DurationSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringConfig {
    pub service: ServiceOptions,
    pub datasets: BTreeMap<String, DatasetSettings>,
}

impl MonitoringConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading monitoring config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MonitoringConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the config without side effects, so it is safe to call more than once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }

        let namespace_pattern = Regex::new(METRIC_NAMESPACE_PATTERN)?;
        if !namespace_pattern.is_match(&self.service.metric_namespace) {
            return Err(ConfigError::InvalidMetricNamespace(
                self.service.metric_namespace.clone(),
            ));
        }

        if self.datasets.is_empty() {
            return Err(ConfigError::NoDatasets);
        }

        for (name, dataset) in &self.datasets {
            if dataset.monitors.is_empty() {
                return Err(ConfigError::NoMonitors(name.clone()));
            }

            if let Some(duration) = &dataset.duration {
                if duration.min_minutes > duration.max_minutes {
                    return Err(ConfigError::InvalidDataset {
                        dataset: name.clone(),
                        message: format!(
                            "duration.min_minutes ({}) is greater than duration.max_minutes ({})",
                            duration.min_minutes, duration.max_minutes
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Options that are accepted but have no effect, as messages for the startup log.
    pub fn unsupported_options(&self) -> Vec<&'static str> {
        let mut messages = Vec::new();

        if !self.service.use_reference {
            messages.push(
                "use_reference=false is not supported, the static reference is always used",
            );
        }

        if self.service.moving_reference {
            messages.push(
                "moving_reference=true is not supported, references are fixed at startup",
            );
        }

        messages
    }

    /// Location of a dataset's reference file.
    ///
    /// Paths are taken as given when they exist; relative paths that do not
    /// are looked up under `datasets_path`.
    pub fn reference_path(&self, dataset: &DatasetSettings) -> PathBuf {
        let path = PathBuf::from(&dataset.reference_file);
        if path.is_absolute() || path.exists() {
            return path;
        }

        let candidate = Path::new(&self.service.datasets_path).join(&path);
        if candidate.exists() {
            candidate
        } else {
            path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
service:
  datasets_path: datasets
  min_reference_size: 30
  use_reference: true
  moving_reference: false
  window_size: 5
  calculation_period_sec: 10
datasets:
  taxi:
    reference_file: ./datasets/green_tripdata_2021-01.parquet
    monitors:
      - data_drift
      - regression_performance
    column_mapping:
      target: duration
      numerical_features: [trip_distance, extra]
      categorical_features: [PULocationID, DOLocationID]
    duration:
      start: lpep_pickup_datetime
      end: lpep_dropoff_datetime
"#;

    #[test]
    fn test_parse_config() {
        let config = MonitoringConfig::from_yaml_str(CONFIG).unwrap();

        assert_eq!(config.service.window_size, 5);
        assert_eq!(config.service.calculation_period_sec, 10);
        assert_eq!(config.service.metric_namespace, "evidently");

        let taxi = &config.datasets["taxi"];
        assert_eq!(taxi.monitors, vec!["data_drift", "regression_performance"]);
        assert_eq!(taxi.column_mapping.target.as_deref(), Some("duration"));
        assert_eq!(taxi.column_mapping.prediction.as_deref(), Some("prediction"));

        let duration = taxi.duration.as_ref().unwrap();
        assert_eq!(duration.column, "duration");
        assert_eq!(duration.min_minutes, 1.0);
        assert_eq!(duration.max_minutes, 60.0);
    }

    #[test]
    fn test_defaults() {
        let config = MonitoringConfig::from_yaml_str(
            r#"
service:
  window_size: 3
datasets:
  taxi:
    reference_file: ref.parquet
    monitors: [data_drift]
"#,
        )
        .unwrap();

        assert_eq!(config.service.calculation_period_sec, 15);
        assert_eq!(config.service.datasets_path, "datasets");
        assert_eq!(config.service.min_reference_size, 0);
        assert!(config.service.use_reference);
        assert!(!config.service.moving_reference);
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = MonitoringConfig::from_yaml_str(
            r#"
service:
  window_size: 0
datasets:
  taxi:
    reference_file: ref.parquet
    monitors: [data_drift]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindowSize));
    }

    #[test]
    fn test_rejects_dataset_without_monitors() {
        let err = MonitoringConfig::from_yaml_str(
            r#"
service:
  window_size: 3
datasets:
  taxi:
    reference_file: ref.parquet
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoMonitors(name) if name == "taxi"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = MonitoringConfig::from_yaml_str(
            r#"
service:
  window_size: 3
  window_sise: 4
datasets: {}
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::YamlError(_)));
    }

    #[test]
    fn test_reference_path_falls_back_to_datasets_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ref.parquet"), b"").unwrap();

        let mut config = MonitoringConfig::from_yaml_str(
            r#"
service:
  window_size: 3
datasets:
  taxi:
    reference_file: ref.parquet
    monitors: [data_drift]
"#,
        )
        .unwrap();
        config.service.datasets_path = dir.path().display().to_string();

        let path = config.reference_path(&config.datasets["taxi"]);
        assert_eq!(path, dir.path().join("ref.parquet"));
    }

    #[test]
    fn test_rejects_invalid_metric_namespace() {
        let config = |namespace: &str| {
            format!(
                r#"
service:
  window_size: 3
  metric_namespace: "{namespace}"
datasets:
  taxi:
    reference_file: ref.parquet
    monitors: [data_drift]
"#
            )
        };

        let err = MonitoringConfig::from_yaml_str(&config("vigil-prod")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMetricNamespace(ns) if ns == "vigil-prod"));

        for invalid in ["", "1vigil", "vigil prod"] {
            assert!(MonitoringConfig::from_yaml_str(&config(invalid)).is_err());
        }

        for valid in ["vigil_prod", "evidently", "team:vigil", "_x1"] {
            let parsed = MonitoringConfig::from_yaml_str(&config(valid)).unwrap();
            assert_eq!(parsed.service.metric_namespace, valid);
        }
    }

    #[test]
    fn test_unsupported_options_reported_without_failing() {
        let mut config = MonitoringConfig::from_yaml_str(CONFIG).unwrap();
        assert!(config.unsupported_options().is_empty());

        config.service.use_reference = false;
        config.service.moving_reference = true;

        config.validate().unwrap();
        config.validate().unwrap();
        assert_eq!(config.unsupported_options().len(), 2);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = MonitoringConfig::from_path(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
