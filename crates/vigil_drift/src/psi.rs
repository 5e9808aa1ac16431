use crate::binning::QuantileBinning;
use crate::error::DriftError;
use crate::stats::finite;
use ndarray::ArrayView1;
use std::collections::{BTreeMap, BTreeSet};

/// PSI above which a column counts as drifted.
pub const PSI_THRESHOLD: f64 = 0.25;

/// A numeric bin `(lower, upper]` with the reference share it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub proportion: f64,
}

fn compute_bin_count(array: &ArrayView1<f64>, lower: f64, upper: f64) -> usize {
    array
        .iter()
        .filter(|&&value| value > lower && value <= upper)
        .count()
}

pub fn compute_psi(proportion_pairs: &[(f64, f64)]) -> f64 {
    let epsilon = 1e-10;
    proportion_pairs
        .iter()
        .map(|(p, q)| {
            let p_adj = p + epsilon;
            let q_adj = q + epsilon;
            (p_adj - q_adj) * (p_adj / q_adj).ln()
        })
        .sum()
}

/// Quantile bins of the reference sample, open-ended on both sides.
pub fn create_numeric_bins(
    reference: &ArrayView1<f64>,
    num_bins: usize,
) -> Result<Vec<Bin>, DriftError> {
    let edges = QuantileBinning {
        num_quantiles: num_bins,
    }
    .compute_edges(reference)?;

    let total = reference.len() as f64;
    let bins = (0..=edges.len())
        .map(|i| {
            let lower = if i == 0 { f64::NEG_INFINITY } else { edges[i - 1] };
            let upper = if i == edges.len() {
                f64::INFINITY
            } else {
                edges[i]
            };
            Bin {
                lower_limit: lower,
                upper_limit: upper,
                proportion: compute_bin_count(reference, lower, upper) as f64 / total,
            }
        })
        .collect();

    Ok(bins)
}

/// PSI of a numeric column. Non-finite values are ignored on both sides.
pub fn numeric_psi(
    feature: &str,
    reference: &ArrayView1<f64>,
    current: &ArrayView1<f64>,
    num_bins: usize,
) -> Result<f64, DriftError> {
    let reference = finite(reference);
    let current = finite(current);

    if reference.is_empty() || current.is_empty() {
        return Err(DriftError::EmptyArrayError(format!(
            "Unable to compute PSI for {feature}: no finite values in reference or current data"
        )));
    }

    let bins = create_numeric_bins(&reference.view(), num_bins)?;
    let total = current.len() as f64;
    let pairs: Vec<(f64, f64)> = bins
        .iter()
        .map(|bin| {
            let count = compute_bin_count(&current.view(), bin.lower_limit, bin.upper_limit);
            (bin.proportion, count as f64 / total)
        })
        .collect();

    Ok(compute_psi(&pairs))
}

fn category_shares(values: &[Option<String>]) -> (BTreeMap<&str, f64>, usize) {
    let mut counts: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total = 0;
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0.0) += 1.0;
        total += 1;
    }
    counts.values_mut().for_each(|c| *c /= total.max(1) as f64);
    (counts, total)
}

/// PSI over the union of categories seen in either sample. Missing values are ignored.
pub fn categorical_psi(
    feature: &str,
    reference: &[Option<String>],
    current: &[Option<String>],
) -> Result<f64, DriftError> {
    let (reference_shares, reference_total) = category_shares(reference);
    let (current_shares, current_total) = category_shares(current);

    if reference_total == 0 || current_total == 0 {
        return Err(DriftError::EmptyArrayError(format!(
            "Unable to compute PSI for {feature}: no values in reference or current data"
        )));
    }

    let categories: BTreeSet<&str> = reference_shares
        .keys()
        .chain(current_shares.keys())
        .copied()
        .collect();

    let pairs: Vec<(f64, f64)> = categories
        .iter()
        .map(|category| {
            (
                reference_shares.get(category).copied().unwrap_or(0.0),
                current_shares.get(category).copied().unwrap_or(0.0),
            )
        })
        .collect();

    Ok(compute_psi(&pairs))
}
