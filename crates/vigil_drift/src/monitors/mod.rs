pub mod classification;
pub mod data_drift;
pub mod data_quality;
pub mod prob_classification;
pub mod regression;
pub mod target_drift;

pub use classification::ClassificationPerformanceMonitor;
pub use data_drift::DataDriftMonitor;
pub use data_quality::DataQualityMonitor;
pub use prob_classification::ProbClassificationPerformanceMonitor;
pub use regression::RegressionPerformanceMonitor;
pub use target_drift::TargetDriftMonitor;

use crate::error::DriftError;
use vigil_types::{ColumnMapping, Table};

pub const REFERENCE: &str = "reference";
pub const CURRENT: &str = "current";

/// Both samples, labelled the way quality metrics report them.
pub(crate) fn samples<'a>(reference: &'a Table, current: &'a Table) -> [(&'static str, &'a Table); 2] {
    [(REFERENCE, reference), (CURRENT, current)]
}

/// Target and prediction columns, both required in both samples.
pub(crate) fn target_and_prediction(
    reference: &Table,
    current: &Table,
    column_mapping: &ColumnMapping,
) -> Result<(String, String), DriftError> {
    let target = column_mapping
        .target
        .clone()
        .ok_or_else(|| DriftError::MissingColumn("target (not mapped)".to_string()))?;
    let prediction = column_mapping
        .prediction
        .clone()
        .ok_or_else(|| DriftError::MissingColumn("prediction (not mapped)".to_string()))?;

    for table in [reference, current] {
        table.require_column(&target)?;
        table.require_column(&prediction)?;
    }

    Ok((target, prediction))
}
