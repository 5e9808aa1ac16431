use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::warn;

static PROMETHEUS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Installs the global `metrics` recorder once and returns its handle.
///
/// Returns `None` when another recorder was already installed in this process.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install service metrics recorder: {}", e);
                None
            }
        })
        .as_ref()
}

/// Renders the service's own counters, empty if no recorder is installed.
pub fn render_service_metrics() -> String {
    prometheus_handle()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Operational counters for one dataset.
pub struct ServiceMetrics {
    dataset_name: String,
}

impl ServiceMetrics {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
        }
    }

    pub fn rows_ingested(&self, rows: usize) {
        counter!("vigil_rows_ingested", "dataset_name" => self.dataset_name.clone())
            .increment(rows as u64);
    }

    pub fn pass_computed(&self) {
        counter!("vigil_passes", "dataset_name" => self.dataset_name.clone(), "outcome" => "computed")
            .increment(1);
    }

    pub fn pass_failed(&self) {
        counter!("vigil_passes", "dataset_name" => self.dataset_name.clone(), "outcome" => "failed")
            .increment(1);
    }

    pub fn observations_rejected(&self, count: usize) {
        if count > 0 {
            counter!("vigil_observations_rejected", "dataset_name" => self.dataset_name.clone())
                .increment(count as u64);
        }
    }

    pub fn window_rows(&self, rows: usize) {
        gauge!("vigil_window_rows", "dataset_name" => self.dataset_name.clone()).set(rows as f64);
    }
}
