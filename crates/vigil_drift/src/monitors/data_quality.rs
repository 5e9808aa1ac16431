use crate::engine::{Monitor, MonitorKind};
use crate::error::DriftError;
use crate::monitors::samples;
use crate::stats;
use std::collections::BTreeMap;
use vigil_types::{ColumnKind, ColumnMapping, MetricObservation, Table};

/// Column-level summary statistics for both samples.
pub struct DataQualityMonitor;

fn observation(
    name: &str,
    value: impl Into<vigil_types::MetricValue>,
    feature: &str,
    kind: ColumnKind,
    sample: &str,
) -> MetricObservation {
    MetricObservation::new(name, value)
        .with_label("feature", feature)
        .with_label("feature_type", kind.to_string())
        .with_label("sample", sample)
}

fn numerical_stats(table: &Table, feature: &str, sample: &str) -> Vec<MetricObservation> {
    let values = stats::finite(&table.numeric_column(feature).view());
    let view = values.view();

    [
        ("mean", stats::mean(&view)),
        ("std", stats::std(&view)),
        ("min", stats::min(&view)),
        ("max", stats::max(&view)),
    ]
    .into_iter()
    .filter_map(|(stat, value)| {
        value.map(|value| {
            observation(
                "data_quality:feature_stat",
                value,
                feature,
                ColumnKind::Numerical,
                sample,
            )
            .with_label("stat", stat)
        })
    })
    .collect()
}

fn categorical_stats(table: &Table, feature: &str, sample: &str) -> Vec<MetricObservation> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in table.categorical_column(feature).into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut observations = vec![observation(
        "data_quality:unique_count",
        counts.len() as f64,
        feature,
        ColumnKind::Categorical,
        sample,
    )];

    // ties resolve to the smallest category
    let most_common = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.clone());

    if let Some(value) = most_common {
        observations.push(observation(
            "data_quality:most_common_value",
            value,
            feature,
            ColumnKind::Categorical,
            sample,
        ));
    }

    observations
}

impl Monitor for DataQualityMonitor {
    fn kind(&self) -> MonitorKind {
        MonitorKind::DataQuality
    }

    fn metrics(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError> {
        let features = column_mapping.resolve_features(reference);
        let mut observations = Vec::new();

        for (sample, table) in samples(reference, current) {
            for (feature, kind) in features.iter() {
                table.require_column(feature)?;

                observations.push(observation(
                    "data_quality:missing_share",
                    table.missing_share(feature),
                    feature,
                    kind,
                    sample,
                ));

                match kind {
                    ColumnKind::Numerical => {
                        observations.extend(numerical_stats(table, feature, sample))
                    }
                    _ => observations.extend(categorical_stats(table, feature, sample)),
                }
            }
        }

        Ok(observations)
    }
}
