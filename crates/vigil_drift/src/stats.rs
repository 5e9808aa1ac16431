use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

pub fn finite(values: &ArrayView1<f64>) -> Array1<f64> {
    values.iter().copied().filter(|x| x.is_finite()).collect()
}

pub fn mean(values: &ArrayView1<f64>) -> Option<f64> {
    values.mean()
}

/// Sample standard deviation (`ddof = 1`), `0.0` for a single value.
pub fn std(values: &ArrayView1<f64>) -> Option<f64> {
    match values.len() {
        0 => None,
        1 => Some(0.0),
        _ => Some(values.std(1.0)),
    }
}

/// Smallest value; `None` when empty or when a NaN prevents ordering.
pub fn min(values: &ArrayView1<f64>) -> Option<f64> {
    values.min().ok().copied()
}

pub fn max(values: &ArrayView1<f64>) -> Option<f64> {
    values.max().ok().copied()
}
