use crate::engine::{Monitor, MonitorKind};
use crate::error::DriftError;
use crate::monitors::{samples, target_and_prediction};
use std::collections::BTreeSet;
use vigil_types::{ColumnMapping, MetricObservation, Table};

/// Label classification quality: accuracy plus per-class and macro
/// precision, recall and f1.
pub struct ClassificationPerformanceMonitor;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct ClassScores {
    precision: f64,
    recall: f64,
    f1: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn class_scores(pairs: &[(String, String)], class: &str) -> ClassScores {
    let mut true_positive = 0;
    let mut predicted = 0;
    let mut actual = 0;

    for (target, prediction) in pairs {
        let is_target = target == class;
        let is_prediction = prediction == class;
        if is_target {
            actual += 1;
        }
        if is_prediction {
            predicted += 1;
        }
        if is_target && is_prediction {
            true_positive += 1;
        }
    }

    let precision = ratio(true_positive, predicted);
    let recall = ratio(true_positive, actual);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassScores {
        precision,
        recall,
        f1,
    }
}

fn label_pairs(table: &Table, target: &str, prediction: &str) -> Vec<(String, String)> {
    table
        .categorical_column(target)
        .into_iter()
        .zip(table.categorical_column(prediction))
        .filter_map(|(t, p)| Some((t?, p?)))
        .collect()
}

fn sample_metrics(pairs: &[(String, String)], sample: &str) -> Vec<MetricObservation> {
    let classes: BTreeSet<&str> = pairs
        .iter()
        .flat_map(|(t, p)| [t.as_str(), p.as_str()])
        .collect();

    let correct = pairs.iter().filter(|(t, p)| t == p).count();
    let mut observations = vec![MetricObservation::new(
        "classification_performance:quality",
        ratio(correct, pairs.len()),
    )
    .with_label("metric", "accuracy")
    .with_label("sample", sample)];

    let mut macro_scores = ClassScores::default();
    for class in &classes {
        let scores = class_scores(pairs, class);
        macro_scores.precision += scores.precision;
        macro_scores.recall += scores.recall;
        macro_scores.f1 += scores.f1;

        for (metric, value) in [
            ("precision", scores.precision),
            ("recall", scores.recall),
            ("f1", scores.f1),
        ] {
            observations.push(
                MetricObservation::new("classification_performance:class_quality", value)
                    .with_label("class_name", *class)
                    .with_label("metric", metric)
                    .with_label("sample", sample),
            );
        }
    }

    let n_classes = classes.len() as f64;
    for (metric, value) in [
        ("precision", macro_scores.precision),
        ("recall", macro_scores.recall),
        ("f1", macro_scores.f1),
    ] {
        observations.push(
            MetricObservation::new("classification_performance:quality", value / n_classes)
                .with_label("metric", metric)
                .with_label("sample", sample),
        );
    }

    observations
}

impl Monitor for ClassificationPerformanceMonitor {
    fn kind(&self) -> MonitorKind {
        MonitorKind::ClassificationPerformance
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
            let pairs = label_pairs(table, &target, &prediction);
            if pairs.is_empty() {
                return Err(DriftError::InsufficientDataError(format!(
                    "No labelled {target}/{prediction} pairs in {sample} data"
                )));
            }
            observations.extend(sample_metrics(&pairs, sample));
        }

        Ok(observations)
    }
}
