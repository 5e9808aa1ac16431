use crate::error::TypeError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// A single record, keyed by column name.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numerical,
    Categorical,
    /// Column is absent or every value is null.
    Empty,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numerical => write!(f, "num"),
            ColumnKind::Categorical => write!(f, "cat"),
            ColumnKind::Empty => write!(f, "empty"),
        }
    }
}

/// Converts a cell into the key used for categorical comparisons.
///
/// Integral floats collapse onto their integer spelling so that `1` and `1.0`
/// land in the same category.
pub fn category_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            if let Some(u) = n.as_u64() {
                return Some(u.to_string());
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                    Some(format!("{f:.0}"))
                }
                Some(f) => Some(f.to_string()),
                None => Some(n.to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

/// An ordered, row-oriented tabular snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Union of the column names of every row, sorted.
    pub fn column_names(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    pub fn column(&self, column: &str) -> impl Iterator<Item = &Value> + '_ {
        let column = column.to_string();
        self.rows
            .iter()
            .map(move |row| row.get(&column).unwrap_or(&Value::Null))
    }

    pub fn column_kind(&self, column: &str) -> ColumnKind {
        let mut seen = false;
        for value in self.column(column) {
            match value {
                Value::Null => continue,
                Value::Number(_) => seen = true,
                _ => return ColumnKind::Categorical,
            }
        }

        if seen {
            ColumnKind::Numerical
        } else {
            ColumnKind::Empty
        }
    }

    /// Numeric view of a column. Missing and non-numeric cells become `NaN`.
    pub fn numeric_column(&self, column: &str) -> Array1<f64> {
        self.column(column)
            .map(|value| value.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Categorical view of a column. Missing cells become `None`.
    pub fn categorical_column(&self, column: &str) -> Vec<Option<String>> {
        self.column(column).map(category_key).collect()
    }

    /// Share of rows where the column is missing or null.
    pub fn missing_share(&self, column: &str) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let missing = self.column(column).filter(|value| value.is_null()).count();
        missing as f64 / self.rows.len() as f64
    }

    pub fn require_column(&self, column: &str) -> Result<(), TypeError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(TypeError::MissingColumn(column.to_string()))
        }
    }

    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(predicate);
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Table::new(rows)
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Table::new(iter.into_iter().collect())
    }
}

/// Request payload accepted by the ingestion endpoint.
///
/// Either a column-oriented object (`{"col": [..], ..}`) or a list of records.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IncomingRows {
    Records(Vec<Row>),
    Columns(Map<String, Value>),
}

impl IncomingRows {
    pub fn into_rows(self) -> Result<Vec<Row>, TypeError> {
        match self {
            IncomingRows::Records(rows) => Ok(rows),
            IncomingRows::Columns(columns) => Self::pivot_columns(columns),
        }
    }

    fn pivot_columns(columns: Map<String, Value>) -> Result<Vec<Row>, TypeError> {
        let mut expected: Option<usize> = None;
        let mut lists = Vec::with_capacity(columns.len());

        for (name, values) in columns {
            // a scalar is treated as a single-row column
            let values = match values {
                Value::Array(values) => values,
                scalar => vec![scalar],
            };

            match expected {
                None => expected = Some(values.len()),
                Some(len) if len != values.len() => {
                    return Err(TypeError::ColumnLengthMismatch {
                        column: name,
                        expected: len,
                        found: values.len(),
                    });
                }
                _ => {}
            }
            lists.push((name, values));
        }

        let len = expected.unwrap_or(0);
        let mut rows = vec![Row::new(); len];
        for (name, values) in lists {
            for (row, value) in rows.iter_mut().zip(values) {
                row.insert(name.clone(), value);
            }
        }

        Ok(rows)
    }
}
