use crate::engine::{Monitor, MonitorKind};
use crate::error::DriftError;
use crate::monitors::{samples, target_and_prediction};
use crate::stats;
use ndarray::Array1;
use vigil_types::{ColumnMapping, MetricObservation, Table};

/// Regression error metrics for reference and current samples.
pub struct RegressionPerformanceMonitor;

/// Rows where both target and prediction are finite numbers.
fn finite_pairs(table: &Table, target: &str, prediction: &str) -> Vec<(f64, f64)> {
    table
        .numeric_column(target)
        .iter()
        .zip(table.numeric_column(prediction).iter())
        .filter(|(t, p)| t.is_finite() && p.is_finite())
        .map(|(t, p)| (*t, *p))
        .collect()
}

fn quality(pairs: &[(f64, f64)]) -> Vec<(&'static str, f64)> {
    let errors = Array1::from_iter(pairs.iter().map(|(t, p)| p - t));
    let abs_errors = errors.mapv(f64::abs);

    let perc_errors: Array1<f64> = pairs
        .iter()
        .filter(|(t, _)| *t != 0.0)
        .map(|(t, p)| ((p - t) / t).abs() * 100.0)
        .collect();

    [
        ("mean_error", stats::mean(&errors.view())),
        ("mean_abs_error", stats::mean(&abs_errors.view())),
        ("mean_abs_perc_error", stats::mean(&perc_errors.view())),
        ("error_std", stats::std(&errors.view())),
    ]
    .into_iter()
    .filter_map(|(metric, value)| value.map(|v| (metric, v)))
    .collect()
}

impl Monitor for RegressionPerformanceMonitor {
    fn kind(&self) -> MonitorKind {
        MonitorKind::RegressionPerformance
    }

    fn metrics(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError> {
        let (target, prediction) = target_and_prediction(reference, current, column_mapping)?;
        let mut observations = Vec::new();

        for (sample, table) in samples(reference, current) {
            let pairs = finite_pairs(table, &target, &prediction);
            if pairs.is_empty() {
                return Err(DriftError::InsufficientDataError(format!(
                    "No numeric {target}/{prediction} pairs in {sample} data"
                )));
            }

            for (metric, value) in quality(&pairs) {
                observations.push(
                    MetricObservation::new("regression_performance:quality", value)
                        .with_label("metric", metric)
                        .with_label("sample", sample),
                );
            }
        }

        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn table(pairs: &[(f64, f64)]) -> Table {
        pairs
            .iter()
            .map(|(t, p)| {
                json!({"target": t, "prediction": p})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    fn metric(observations: &[MetricObservation], metric: &str, sample: &str) -> f64 {
        observations
            .iter()
            .find(|o| o.labels["metric"] == metric && o.labels["sample"] == sample)
            .and_then(|o| o.value.as_f64())
            .unwrap()
    }

    #[test]
    fn test_regression_quality() {
        let reference = table(&[(10.0, 10.0), (20.0, 20.0)]);
        let current = table(&[(10.0, 12.0), (20.0, 16.0), (0.0, 1.0)]);

        let observations = RegressionPerformanceMonitor
            .metrics(&reference, &current, &ColumnMapping::default())
            .unwrap();

        assert_eq!(observations.len(), 8);
        assert_relative_eq!(metric(&observations, "mean_error", "reference"), 0.0);

        // errors are 2, -4 and 1
        assert_relative_eq!(metric(&observations, "mean_error", "current"), -1.0 / 3.0);
        assert_relative_eq!(metric(&observations, "mean_abs_error", "current"), 7.0 / 3.0);
        // zero targets are left out of the percentage error
        assert_relative_eq!(
            metric(&observations, "mean_abs_perc_error", "current"),
            20.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            metric(&observations, "error_std", "current"),
            (((2.0f64 + 1.0 / 3.0).powi(2) + (-4.0f64 + 1.0 / 3.0).powi(2)
                + (1.0f64 + 1.0 / 3.0).powi(2))
                / 2.0)
                .sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_missing_prediction_column() {
        let reference = table(&[(1.0, 1.0)]);
        let current: Table = vec![json!({"target": 1.0}).as_object().cloned().unwrap()].into();

        let err = RegressionPerformanceMonitor
            .metrics(&reference, &current, &ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, DriftError::TypeError(_)));
    }

    #[test]
    fn test_no_numeric_pairs() {
        let reference = table(&[(1.0, 1.0)]);
        let current: Table = vec![json!({"target": "x", "prediction": null})
            .as_object()
            .cloned()
            .unwrap()]
        .into();

        let err = RegressionPerformanceMonitor
            .metrics(&reference, &current, &ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, DriftError::InsufficientDataError(_)));
    }
}
