use crate::engine::{Monitor, MonitorKind};
use crate::error::DriftError;
use crate::psi::{categorical_psi, numeric_psi, PSI_THRESHOLD};
use itertools::Itertools;
use rayon::prelude::*;
use vigil_types::{ColumnKind, ColumnMapping, MetricObservation, Table};

/// Per-feature PSI drift plus dataset-level drift summary.
pub struct DataDriftMonitor {
    pub num_bins: usize,
    pub psi_threshold: f64,
    /// Share of drifted features at which the whole dataset counts as drifted.
    pub dataset_drift_share: f64,
}

impl Default for DataDriftMonitor {
    fn default() -> Self {
        DataDriftMonitor {
            num_bins: 10,
            psi_threshold: PSI_THRESHOLD,
            dataset_drift_share: 0.5,
        }
    }
}

struct FeatureDrift {
    feature: String,
    kind: ColumnKind,
    psi: f64,
}

impl DataDriftMonitor {
    fn feature_drift(
        &self,
        feature: &str,
        kind: ColumnKind,
        reference: &Table,
        current: &Table,
    ) -> Result<FeatureDrift, DriftError> {
        reference.require_column(feature)?;
        current.require_column(feature)?;

        let psi = match kind {
            ColumnKind::Numerical => numeric_psi(
                feature,
                &reference.numeric_column(feature).view(),
                &current.numeric_column(feature).view(),
                self.num_bins,
            )?,
            _ => categorical_psi(
                feature,
                &reference.categorical_column(feature),
                &current.categorical_column(feature),
            )?,
        };

        Ok(FeatureDrift {
            feature: feature.to_string(),
            kind,
            psi,
        })
    }
}

impl Monitor for DataDriftMonitor {
    fn kind(&self) -> MonitorKind {
        MonitorKind::DataDrift
    }

    fn metrics(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError> {
        let features = column_mapping.resolve_features(reference);
        if features.is_empty() {
            return Err(DriftError::InvalidParameterError(
                "No features available for data drift".to_string(),
            ));
        }

        let drifts = features
            .iter()
            .collect_vec()
            .into_par_iter()
            .map(|(feature, kind)| self.feature_drift(feature, kind, reference, current))
            .collect::<Result<Vec<_>, _>>()?;

        let mut observations = Vec::with_capacity(drifts.len() * 2 + 3);
        let mut drifted = 0usize;

        for drift in &drifts {
            let is_drifted = drift.psi > self.psi_threshold;
            if is_drifted {
                drifted += 1;
            }

            observations.push(
                MetricObservation::new("data_drift:feature_psi", drift.psi)
                    .with_label("feature", drift.feature.as_str())
                    .with_label("feature_type", drift.kind.to_string()),
            );
            observations.push(
                MetricObservation::new(
                    "data_drift:feature_drift",
                    if is_drifted { 1.0 } else { 0.0 },
                )
                .with_label("feature", drift.feature.as_str())
                .with_label("feature_type", drift.kind.to_string()),
            );
        }

        let share = drifted as f64 / drifts.len() as f64;
        observations.push(MetricObservation::new(
            "data_drift:n_drifted_features",
            drifted as f64,
        ));
        observations.push(MetricObservation::new("data_drift_share", share));
        observations.push(MetricObservation::new(
            "data_drift:dataset_drift",
            if share >= self.dataset_drift_share {
                1.0
            } else {
                0.0
            },
        ));

        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{drifted_taxi_rows, taxi_rows, CATEGORICAL_FEATURES, NUMERICAL_FEATURES};

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            numerical_features: Some(NUMERICAL_FEATURES.iter().map(|s| s.to_string()).collect()),
            categorical_features: Some(
                CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
            ),
            ..Default::default()
        }
    }

    fn value(observations: &[MetricObservation], name: &str) -> f64 {
        observations
            .iter()
            .find(|o| o.metric_name == name)
            .and_then(|o| o.value.as_f64())
            .unwrap()
    }

    #[test]
    fn test_no_drift_on_same_distribution() {
        let reference = Table::new(taxi_rows(0, 400));
        let current = Table::new(taxi_rows(400, 400));

        let observations = DataDriftMonitor::default()
            .metrics(&reference, &current, &mapping())
            .unwrap();

        // two per feature plus three summaries
        assert_eq!(observations.len(), 5 * 2 + 3);
        assert_eq!(value(&observations, "data_drift_share"), 0.0);
        assert_eq!(value(&observations, "data_drift:dataset_drift"), 0.0);
    }

    #[test]
    fn test_detects_drift() {
        let reference = Table::new(taxi_rows(0, 400));
        let current = Table::new(drifted_taxi_rows(400, 100));

        let observations = DataDriftMonitor::default()
            .metrics(&reference, &current, &mapping())
            .unwrap();

        // three numerical features and PULocationID drift, DOLocationID does not
        assert_eq!(value(&observations, "data_drift:n_drifted_features"), 4.0);
        approx::assert_relative_eq!(value(&observations, "data_drift_share"), 0.8);
        assert_eq!(value(&observations, "data_drift:dataset_drift"), 1.0);

        let psi = observations
            .iter()
            .find(|o| {
                o.metric_name == "data_drift:feature_psi"
                    && o.labels.get("feature").map(String::as_str) == Some("trip_distance")
            })
            .unwrap();
        assert_eq!(psi.labels["feature_type"], "num");
        assert!(psi.value.as_f64().unwrap() > PSI_THRESHOLD);
    }

    #[test]
    fn test_missing_feature_in_current() {
        let reference = Table::new(taxi_rows(0, 100));
        let current: Table = taxi_rows(100, 20)
            .into_iter()
            .map(|mut row| {
                row.remove("trip_distance");
                row
            })
            .collect();

        let err = DataDriftMonitor::default()
            .metrics(&reference, &current, &mapping())
            .unwrap_err();
        assert!(matches!(err, DriftError::TypeError(_)));
    }
}
