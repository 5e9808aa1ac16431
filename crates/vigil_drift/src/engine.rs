use crate::error::DriftError;
use crate::monitors::{
    ClassificationPerformanceMonitor, DataDriftMonitor, DataQualityMonitor,
    ProbClassificationPerformanceMonitor, RegressionPerformanceMonitor, TargetDriftMonitor,
};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;
use vigil_types::{ColumnMapping, MetricObservation, Table};

/// Computes metric observations for a window of data against its reference.
pub trait MetricsEngine: Send + Sync {
    fn compute(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError>;
}

/// One metric-computation module of a [`ModelMonitoring`] pipeline.
pub trait Monitor: Send + Sync {
    fn kind(&self) -> MonitorKind;

    fn metrics(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MonitorKind {
    CatTargetDrift,
    DataDrift,
    DataQuality,
    NumTargetDrift,
    RegressionPerformance,
    ClassificationPerformance,
    ProbClassificationPerformance,
}

impl MonitorKind {
    pub fn build(&self) -> Box<dyn Monitor> {
        match self {
            MonitorKind::CatTargetDrift => Box::new(TargetDriftMonitor::categorical()),
            MonitorKind::DataDrift => Box::new(DataDriftMonitor::default()),
            MonitorKind::DataQuality => Box::new(DataQualityMonitor),
            MonitorKind::NumTargetDrift => Box::new(TargetDriftMonitor::numerical()),
            MonitorKind::RegressionPerformance => Box::new(RegressionPerformanceMonitor),
            MonitorKind::ClassificationPerformance => Box::new(ClassificationPerformanceMonitor),
            MonitorKind::ProbClassificationPerformance => {
                Box::new(ProbClassificationPerformanceMonitor)
            }
        }
    }
}

/// Ordered set of monitors run as one computation pass.
pub struct ModelMonitoring {
    monitors: Vec<Box<dyn Monitor>>,
}

impl ModelMonitoring {
    pub fn new(monitors: Vec<Box<dyn Monitor>>) -> Self {
        ModelMonitoring { monitors }
    }

    /// Builds the pipeline from configured monitor names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, DriftError> {
        let monitors = names
            .iter()
            .map(|name| {
                MonitorKind::from_str(name.as_ref())
                    .map(|kind| kind.build())
                    .map_err(|_| DriftError::UnknownMonitor(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModelMonitoring::new(monitors))
    }

    pub fn kinds(&self) -> Vec<MonitorKind> {
        self.monitors.iter().map(|m| m.kind()).collect()
    }
}

impl MetricsEngine for ModelMonitoring {
    fn compute(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError> {
        let mut observations = Vec::new();
        for monitor in &self.monitors {
            let metrics = monitor.metrics(reference, current, column_mapping)?;
            debug!(
                "Monitor {} produced {} observations",
                monitor.kind(),
                metrics.len()
            );
            observations.extend(metrics);
        }
        Ok(observations)
    }
}
