use crate::table::{ColumnKind, Table};
use serde::{Deserialize, Serialize};

fn default_target() -> Option<String> {
    Some("target".to_string())
}

fn default_prediction() -> Option<String> {
    Some("prediction".to_string())
}

fn default_datetime() -> Option<String> {
    Some("datetime".to_string())
}

fn default_pos_label() -> String {
    "1".to_string()
}

/// Declares which columns play which role for the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    #[serde(default = "default_target")]
    pub target: Option<String>,

    #[serde(default = "default_prediction")]
    pub prediction: Option<String>,

    #[serde(default = "default_datetime")]
    pub datetime: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub numerical_features: Option<Vec<String>>,

    #[serde(default)]
    pub categorical_features: Option<Vec<String>>,

    /// Never treated as drift features.
    #[serde(default)]
    pub datetime_features: Option<Vec<String>>,

    /// Never treated as drift features.
    #[serde(default)]
    pub text_features: Option<Vec<String>>,

    /// Positive class for probabilistic classification.
    #[serde(default = "default_pos_label")]
    pub pos_label: String,

    /// Accepted for compatibility with Evidently mappings; the monitor list decides the task.
    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub target_names: Option<Vec<serde_json::Value>>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            target: default_target(),
            prediction: default_prediction(),
            datetime: default_datetime(),
            id: None,
            numerical_features: None,
            categorical_features: None,
            datetime_features: None,
            text_features: None,
            pos_label: default_pos_label(),
            task: None,
            target_names: None,
        }
    }
}

/// Feature columns resolved against a concrete table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFeatures {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
}

impl ResolvedFeatures {
    pub fn iter(&self) -> impl Iterator<Item = (&String, ColumnKind)> {
        self.numerical
            .iter()
            .map(|f| (f, ColumnKind::Numerical))
            .chain(self.categorical.iter().map(|f| (f, ColumnKind::Categorical)))
    }

    pub fn len(&self) -> usize {
        self.numerical.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ColumnMapping {
    fn is_role_column(&self, column: &str) -> bool {
        let is_role = [&self.target, &self.prediction, &self.datetime, &self.id]
            .iter()
            .any(|role| role.as_deref() == Some(column));

        is_role
            || [&self.datetime_features, &self.text_features]
                .iter()
                .filter_map(|list| list.as_deref())
                .any(|list| list.iter().any(|c| c == column))
    }

    /// Resolves feature columns. Explicit lists win; otherwise every non-role
    /// column of `reference` is a feature, typed by its contents.
    pub fn resolve_features(&self, reference: &Table) -> ResolvedFeatures {
        let explicit = self.numerical_features.is_some() || self.categorical_features.is_some();
        if explicit {
            return ResolvedFeatures {
                numerical: self.numerical_features.clone().unwrap_or_default(),
                categorical: self.categorical_features.clone().unwrap_or_default(),
            };
        }

        let mut resolved = ResolvedFeatures::default();
        for column in reference.column_names() {
            if self.is_role_column(&column) {
                continue;
            }
            match reference.column_kind(&column) {
                ColumnKind::Numerical => resolved.numerical.push(column),
                ColumnKind::Categorical => resolved.categorical.push(column),
                ColumnKind::Empty => {}
            }
        }
        resolved
    }

    /// Target column, if configured and present in `table`.
    pub fn target_in(&self, table: &Table) -> Option<String> {
        self.target.clone().filter(|c| table.has_column(c))
    }

    /// Prediction column, if configured and present in `table`.
    pub fn prediction_in(&self, table: &Table) -> Option<String> {
        self.prediction.clone().filter(|c| table.has_column(c))
    }
}
