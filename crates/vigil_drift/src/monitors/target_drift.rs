use crate::engine::{Monitor, MonitorKind};
use crate::error::DriftError;
use crate::psi::{categorical_psi, numeric_psi, PSI_THRESHOLD};
use vigil_types::{ColumnMapping, MetricObservation, Table};

/// PSI drift of the target and prediction columns.
///
/// The numerical flavour bins by reference quantiles, the categorical one
/// compares class shares.
pub struct TargetDriftMonitor {
    categorical: bool,
    num_bins: usize,
}

impl TargetDriftMonitor {
    pub fn numerical() -> Self {
        TargetDriftMonitor {
            categorical: false,
            num_bins: 10,
        }
    }

    pub fn categorical() -> Self {
        TargetDriftMonitor {
            categorical: true,
            num_bins: 10,
        }
    }

    fn prefix(&self) -> &'static str {
        if self.categorical {
            "cat_target_drift"
        } else {
            "num_target_drift"
        }
    }

    fn column_psi(&self, column: &str, reference: &Table, current: &Table) -> Result<f64, DriftError> {
        if self.categorical {
            categorical_psi(
                column,
                &reference.categorical_column(column),
                &current.categorical_column(column),
            )
        } else {
            numeric_psi(
                column,
                &reference.numeric_column(column).view(),
                &current.numeric_column(column).view(),
                self.num_bins,
            )
        }
    }
}

impl Monitor for TargetDriftMonitor {
    fn kind(&self) -> MonitorKind {
        if self.categorical {
            MonitorKind::CatTargetDrift
        } else {
            MonitorKind::NumTargetDrift
        }
    }

    fn metrics(
        &self,
        reference: &Table,
        current: &Table,
        column_mapping: &ColumnMapping,
    ) -> Result<Vec<MetricObservation>, DriftError> {
        let columns: Vec<(&str, String)> = [
            ("target", column_mapping.target_in(reference)),
            ("prediction", column_mapping.prediction_in(reference)),
        ]
        .into_iter()
        .filter_map(|(role, column)| column.map(|c| (role, c)))
        .collect();

        if columns.is_empty() {
            return Err(DriftError::MissingColumn(
                "target or prediction (neither present in reference)".to_string(),
            ));
        }

        let prefix = self.prefix();
        let mut observations = Vec::with_capacity(columns.len() * 2);

        for (role, column) in columns {
            current.require_column(&column)?;
            let psi = self.column_psi(&column, reference, current)?;

            observations.push(
                MetricObservation::new(format!("{prefix}:psi"), psi)
                    .with_label("column", column.as_str())
                    .with_label("role", role),
            );
            observations.push(
                MetricObservation::new(
                    format!("{prefix}:drift"),
                    if psi > PSI_THRESHOLD { 1.0 } else { 0.0 },
                )
                .with_label("column", column.as_str())
                .with_label("role", role),
            );
        }

        Ok(observations)
    }
}
