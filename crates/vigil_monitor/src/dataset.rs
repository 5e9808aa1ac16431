use crate::error::MonitorError;
use std::sync::Arc;
use tracing::{info, instrument};
use vigil_dataframe::{apply_duration, read_reference, DataFrameError};
use vigil_drift::{DriftError, MetricsEngine, ModelMonitoring};
use vigil_settings::{DatasetSettings, MonitoringConfig};
use vigil_types::{ColumnMapping, Table};

/// A configured dataset: its immutable reference and how to measure windows against it.
#[derive(Clone)]
pub struct LoadedDataset {
    pub name: String,
    pub reference: Arc<Table>,
    pub engine: Arc<dyn MetricsEngine>,
    pub column_mapping: ColumnMapping,
}

impl LoadedDataset {
    pub fn new(
        name: impl Into<String>,
        reference: Table,
        engine: Arc<dyn MetricsEngine>,
        column_mapping: ColumnMapping,
    ) -> Self {
        LoadedDataset {
            name: name.into(),
            reference: Arc::new(reference),
            engine,
            column_mapping,
        }
    }

    /// Builds the monitor pipeline and loads the reference of one configured dataset.
    #[instrument(skip(settings, config))]
    pub fn load(
        name: &str,
        settings: &DatasetSettings,
        config: &MonitoringConfig,
    ) -> Result<Self, MonitorError> {
        let engine = ModelMonitoring::from_names(&settings.monitors).map_err(|e| match e {
            DriftError::UnknownMonitor(monitor) => MonitorError::UnknownMonitor {
                dataset: name.to_string(),
                monitor,
            },
            other => other.into(),
        })?;

        let path = config.reference_path(settings);
        let mut reference = read_reference(&path)?;

        if let Some(duration) = &settings.duration {
            reference = apply_duration(reference, duration);
        }

        let required = config.service.min_reference_size;
        if reference.len() < required {
            return Err(DataFrameError::InsufficientReference {
                dataset: name.to_string(),
                found: reference.len(),
                required,
            }
            .into());
        }

        info!(
            "Loaded reference for {} from {}: {} rows, monitors {:?}",
            name,
            path.display(),
            reference.len(),
            engine.kinds()
        );

        Ok(LoadedDataset::new(
            name,
            reference,
            Arc::new(engine),
            settings.column_mapping.clone(),
        ))
    }
}

/// Loads every dataset of the config, failing on the first that cannot be loaded.
pub fn load_datasets(config: &MonitoringConfig) -> Result<Vec<LoadedDataset>, MonitorError> {
    config
        .datasets
        .iter()
        .map(|(name, settings)| LoadedDataset::load(name, settings, config))
        .collect()
}
