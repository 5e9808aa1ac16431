use crate::error::ObservabilityError;
use prometheus::core::Collector;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument};
use vigil_types::{Labels, MetricObservation, MetricValue};

/// Label injected into every published gauge.
pub const DATASET_LABEL: &str = "dataset_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// Text observations are never exposed as gauges.
    SkippedText,
}

struct PublishedGauge {
    /// Sorted label keys fixed on first publish.
    label_schema: Vec<String>,
    vec: GaugeVec,
}

/// Lazily created, labelled gauges keyed by `<namespace>:<metric_name>`.
///
/// Each registry owns its own prometheus [`Registry`], so tests can build
/// isolated instances.
pub struct GaugeRegistry {
    namespace: String,
    registry: Registry,
    gauges: RwLock<HashMap<String, PublishedGauge>>,
}

impl GaugeRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        GaugeRegistry {
            namespace: namespace.into(),
            registry: Registry::new(),
            gauges: RwLock::new(HashMap::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn metric_key(&self, metric_name: &str) -> String {
        format!("{}:{}", self.namespace, metric_name)
    }

    fn full_labels(dataset_name: &str, labels: &Labels) -> Labels {
        let mut labels = labels.clone();
        labels.insert(DATASET_LABEL.to_string(), dataset_name.to_string());
        labels
    }

    /// Publishes one observation for `dataset_name`, last write wins.
    ///
    /// A known metric republished with a different label key set is rejected
    /// and the registered schema is left untouched.
    #[instrument(skip_all, fields(metric = %observation.metric_name))]
    pub fn publish(
        &self,
        dataset_name: &str,
        observation: &MetricObservation,
    ) -> Result<PublishOutcome, ObservabilityError> {
        let value = match &observation.value {
            MetricValue::Number(value) => *value,
            MetricValue::Text(_) => return Ok(PublishOutcome::SkippedText),
        };

        let key = self.metric_key(&observation.metric_name);
        let labels = Self::full_labels(dataset_name, &observation.labels);
        let keys: Vec<String> = labels.keys().cloned().collect();
        let values: Vec<&str> = labels.values().map(String::as_str).collect();

        {
            let gauges = self
                .gauges
                .read()
                .map_err(|_| ObservabilityError::LockError)?;
            if let Some(gauge) = gauges.get(&key) {
                return Self::set(&key, gauge, &keys, &values, value);
            }
        }

        let mut gauges = self
            .gauges
            .write()
            .map_err(|_| ObservabilityError::LockError)?;

        // another writer may have registered it between the two locks
        if !gauges.contains_key(&key) {
            let label_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
            let vec = GaugeVec::new(Opts::new(key.as_str(), key.as_str()), &label_refs)?;
            self.registry.register(Box::new(vec.clone()))?;
            debug!("Registered gauge {} with labels {:?}", key, keys);

            gauges.insert(
                key.clone(),
                PublishedGauge {
                    label_schema: keys.clone(),
                    vec,
                },
            );
        }

        match gauges.get(&key) {
            Some(gauge) => Self::set(&key, gauge, &keys, &values, value),
            None => Err(ObservabilityError::LockError),
        }
    }

    fn set(
        key: &str,
        gauge: &PublishedGauge,
        keys: &[String],
        values: &[&str],
        value: f64,
    ) -> Result<PublishOutcome, ObservabilityError> {
        if gauge.label_schema != keys {
            return Err(ObservabilityError::LabelSchemaConflict {
                metric: key.to_string(),
                registered: gauge.label_schema.clone(),
                received: keys.to_vec(),
            });
        }

        gauge.vec.get_metric_with_label_values(values)?.set(value);
        Ok(PublishOutcome::Published)
    }

    /// Registered label keys of a metric, `dataset_name` included.
    pub fn label_schema(&self, metric_name: &str) -> Option<Vec<String>> {
        let gauges = self.gauges.read().ok()?;
        gauges
            .get(&self.metric_key(metric_name))
            .map(|gauge| gauge.label_schema.clone())
    }

    /// Current value of a published series, if it exists.
    pub fn value(&self, dataset_name: &str, metric_name: &str, labels: &Labels) -> Option<f64> {
        let gauges = self.gauges.read().ok()?;
        let gauge = gauges.get(&self.metric_key(metric_name))?;
        let labels = Self::full_labels(dataset_name, labels);

        let families = gauge.vec.collect();
        let value = families
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                let pairs = metric.get_label();
                pairs.len() == labels.len()
                    && pairs.iter().all(|pair| {
                        labels.get(pair.get_name()).map(String::as_str) == Some(pair.get_value())
                    })
            })
            .map(|metric| metric.get_gauge().get_value());
        value
    }

    pub fn len(&self) -> usize {
        self.gauges.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text exposition of every registered gauge.
    pub fn render(&self) -> Result<String, ObservabilityError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        GaugeRegistry::new("evidently")
    }
}
