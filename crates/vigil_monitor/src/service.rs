use crate::clock::{Clock, SystemClock};
use crate::dataset::{load_datasets, LoadedDataset};
use crate::error::MonitorError;
use crate::schedule::ScheduleGate;
use crate::window::WindowBuffer;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, instrument, warn};
use vigil_observability::{GaugeRegistry, PublishOutcome, ServiceMetrics};
use vigil_settings::MonitoringConfig;
use vigil_types::{MetricObservation, Row, Table};

/// What a single `iterate` call ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum IterateOutcome {
    /// The window is still below `window_size`; nothing was computed.
    InsufficientData { size: usize, required: usize },
    /// The window absorbed the rows but the dataset is cooling down.
    CoolingDown { next_run_time: DateTime<Utc> },
    /// A pass ran and its observations were published.
    Computed {
        published: usize,
        skipped: usize,
        rejected: usize,
    },
    /// The engine failed; previously published values are untouched.
    ComputationFailed { error: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PublishSummary {
    published: usize,
    skipped: usize,
    rejected: usize,
}

struct DatasetState {
    window: WindowBuffer,
    gate: ScheduleGate,
}

struct DatasetEntry {
    dataset: LoadedDataset,
    state: Mutex<DatasetState>,
    metrics: ServiceMetrics,
}

/// Feeds incoming rows into per-dataset windows and publishes metrics for
/// full windows at most once per calculation period.
///
/// Calls for one dataset are serialised on that dataset's lock, which is held
/// for the whole call including the computation. Different datasets never
/// contend.
pub struct MonitoringService {
    window_size: usize,
    calculation_period: Duration,
    datasets: BTreeMap<String, DatasetEntry>,
    registry: Arc<GaugeRegistry>,
    clock: Arc<dyn Clock>,
}

impl MonitoringService {
    pub fn new(
        window_size: usize,
        calculation_period: Duration,
        registry: Arc<GaugeRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MonitorError> {
        if window_size == 0 {
            return Err(MonitorError::InvalidWindowSize);
        }

        Ok(MonitoringService {
            window_size,
            calculation_period,
            datasets: BTreeMap::new(),
            registry,
            clock,
        })
    }

    /// Builds the service from a validated config, loading every reference.
    pub fn from_config(config: &MonitoringConfig) -> Result<Self, MonitorError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &MonitoringConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        for message in config.unsupported_options() {
            warn!("{}", message);
        }

        let period_sec = config.service.calculation_period_sec;
        let calculation_period = i64::try_from(period_sec)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(MonitorError::InvalidCalculationPeriod(period_sec))?;

        let registry = Arc::new(GaugeRegistry::new(
            config.service.metric_namespace.as_str(),
        ));

        let mut service = Self::new(
            config.service.window_size,
            calculation_period,
            registry,
            clock,
        )?;

        for dataset in load_datasets(config)? {
            service.add_dataset(dataset);
        }

        info!(
            "Monitoring service ready: datasets {:?}, window size {}, calculation period {}s",
            service.dataset_names(),
            service.window_size,
            period_sec
        );

        Ok(service)
    }

    /// Registers a dataset with an empty window. Replaces any dataset of the same name.
    pub fn add_dataset(&mut self, dataset: LoadedDataset) {
        let entry = DatasetEntry {
            metrics: ServiceMetrics::new(dataset.name.as_str()),
            state: Mutex::new(DatasetState {
                window: WindowBuffer::new(self.window_size),
                gate: ScheduleGate::new(),
            }),
            dataset,
        };
        self.datasets.insert(entry.dataset.name.clone(), entry);
    }

    pub fn registry(&self) -> &Arc<GaugeRegistry> {
        &self.registry
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn calculation_period(&self) -> Duration {
        self.calculation_period
    }

    pub fn dataset_names(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }

    fn entry(&self, dataset_name: &str) -> Result<&DatasetEntry, MonitorError> {
        self.datasets
            .get(dataset_name)
            .ok_or_else(|| MonitorError::DatasetNotFound(dataset_name.to_string()))
    }

    fn lock<'a>(
        &self,
        dataset_name: &str,
        entry: &'a DatasetEntry,
    ) -> Result<std::sync::MutexGuard<'a, DatasetState>, MonitorError> {
        entry
            .state
            .lock()
            .map_err(|_| MonitorError::LockPoisoned(dataset_name.to_string()))
    }

    /// Current window contents of a dataset, oldest row first.
    pub fn window_snapshot(&self, dataset_name: &str) -> Result<Table, MonitorError> {
        let entry = self.entry(dataset_name)?;
        Ok(self.lock(dataset_name, entry)?.window.snapshot())
    }

    /// Next time a pass may run for a dataset, `None` if it never ran.
    pub fn next_run_time(&self, dataset_name: &str) -> Result<Option<DateTime<Utc>>, MonitorError> {
        let entry = self.entry(dataset_name)?;
        Ok(self.lock(dataset_name, entry)?.gate.next_run_time())
    }

    /// Ingests new rows for a dataset and runs a metrics pass when allowed
    ///
    /// # Arguments
    ///
    /// * `dataset_name` - Name of a configured dataset
    /// * `new_rows` - Rows in arrival order
    ///
    /// # Returns
    ///
    /// * `IterateOutcome` - Whether a pass ran and how it went. Engine failures are
    ///   reported here, not as an error.
    #[instrument(skip(self, new_rows), fields(rows = new_rows.len()))]
    pub fn iterate(
        &self,
        dataset_name: &str,
        new_rows: Vec<Row>,
    ) -> Result<IterateOutcome, MonitorError> {
        let entry = self.entry(dataset_name)?;
        let mut state = self.lock(dataset_name, entry)?;

        let received = new_rows.len();
        let evicted = state.window.append(new_rows);
        let size = state.window.size();
        debug!("Appended {} rows, evicted {}, window size {}", received, evicted, size);

        entry.metrics.rows_ingested(received);
        entry.metrics.window_rows(size);

        if size < self.window_size {
            info!(
                "Not enough data for measurement: {} of {}. Waiting for more data",
                size, self.window_size
            );
            return Ok(IterateOutcome::InsufficientData {
                size,
                required: self.window_size,
            });
        }

        let now = self.clock.now();
        if !state.gate.may_run(now) {
            let next_run_time = state.gate.next_run_time().unwrap_or(now);
            debug!("Skipping pass for {}, next run at {}", dataset_name, next_run_time);
            return Ok(IterateOutcome::CoolingDown { next_run_time });
        }

        let current = state.window.snapshot();
        let dataset = &entry.dataset;
        let outcome = match dataset
            .engine
            .compute(&dataset.reference, &current, &dataset.column_mapping)
        {
            Ok(observations) => {
                let summary = self.publish(dataset_name, &observations);
                entry.metrics.pass_computed();
                entry.metrics.observations_rejected(summary.rejected);
                IterateOutcome::Computed {
                    published: summary.published,
                    skipped: summary.skipped,
                    rejected: summary.rejected,
                }
            }
            Err(e) => {
                error!("Metrics computation failed for {}: {}", dataset_name, e);
                entry.metrics.pass_failed();
                IterateOutcome::ComputationFailed {
                    error: e.to_string(),
                }
            }
        };

        state.gate.mark_ran(now, self.calculation_period);
        if let Some(next_run_time) = state.gate.next_run_time() {
            info!("Next run for {} at {}", dataset_name, next_run_time);
        }

        Ok(outcome)
    }

    fn publish(&self, dataset_name: &str, observations: &[MetricObservation]) -> PublishSummary {
        let mut summary = PublishSummary::default();

        for observation in observations {
            match self.registry.publish(dataset_name, observation) {
                Ok(PublishOutcome::Published) => summary.published += 1,
                Ok(PublishOutcome::SkippedText) => summary.skipped += 1,
                Err(e) => {
                    warn!(
                        "Dropping observation {} for {}: {}",
                        observation.metric_name, dataset_name, e
                    );
                    summary.rejected += 1;
                }
            }
        }

        summary
    }
}
