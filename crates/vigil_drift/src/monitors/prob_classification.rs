use crate::engine::{Monitor, MonitorKind};
use crate::error::DriftError;
use crate::monitors::{samples, target_and_prediction};
use vigil_types::{category_key, ColumnMapping, MetricObservation, Table};

const LOG_LOSS_EPS: f64 = 1e-15;

/// Binary probabilistic classification quality. The prediction column holds
/// the probability of `pos_label`.
pub struct ProbClassificationPerformanceMonitor;

/// (is positive, predicted probability) for rows with a label and a finite probability.
fn scored_rows(table: &Table, target: &str, prediction: &str, pos_label: &str) -> Vec<(bool, f64)> {
    table
        .column(target)
        .zip(table.numeric_column(prediction).iter())
        .filter_map(|(label, probability)| {
            let label = category_key(label)?;
            probability
                .is_finite()
                .then_some((label == pos_label, *probability))
        })
        .collect()
}

fn accuracy(rows: &[(bool, f64)]) -> f64 {
    let correct = rows
        .iter()
        .filter(|(positive, p)| (*p >= 0.5) == *positive)
        .count();
    correct as f64 / rows.len() as f64
}

fn log_loss(rows: &[(bool, f64)]) -> f64 {
    let total: f64 = rows
        .iter()
        .map(|(positive, p)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if *positive {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / rows.len() as f64
}

fn brier_score(rows: &[(bool, f64)]) -> f64 {
    let total: f64 = rows
        .iter()
        .map(|(positive, p)| {
            let y = if *positive { 1.0 } else { 0.0 };
            (p - y).powi(2)
        })
        .sum();
    total / rows.len() as f64
}

/// Rank-based ROC AUC with averaged ranks for ties. `None` if only one class is present.
fn roc_auc(rows: &[(bool, f64)]) -> Option<f64> {
    let positives = rows.iter().filter(|(positive, _)| *positive).count();
    let negatives = rows.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut sorted: Vec<&(bool, f64)> = rows.iter().collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1].1 == sorted[i].1 {
            j += 1;
        }
        // ranks are 1-based
        let rank = (i + j) as f64 / 2.0 + 1.0;
        positive_rank_sum += rank * sorted[i..=j].iter().filter(|(p, _)| *p).count() as f64;
        i = j + 1;
    }

    let positives = positives as f64;
    let negatives = negatives as f64;
    Some((positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives))
}

impl Monitor for ProbClassificationPerformanceMonitor {
    fn kind(&self) -> MonitorKind {
        MonitorKind::ProbClassificationPerformance
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
            let rows = scored_rows(table, &target, &prediction, &column_mapping.pos_label);
            if rows.is_empty() {
                return Err(DriftError::InsufficientDataError(format!(
                    "No scored {target}/{prediction} rows in {sample} data"
                )));
            }

            let metrics = [
                ("accuracy", Some(accuracy(&rows))),
                ("log_loss", Some(log_loss(&rows))),
                ("brier_score", Some(brier_score(&rows))),
                ("roc_auc", roc_auc(&rows)),
            ];

            for (metric, value) in metrics {
                if let Some(value) = value {
                    observations.push(
                        MetricObservation::new("prob_classification_performance:quality", value)
                            .with_label("metric", metric)
                            .with_label("sample", sample),
                    );
                }
            }
        }

        Ok(observations)
    }
}
