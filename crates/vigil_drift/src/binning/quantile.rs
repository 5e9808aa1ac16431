use crate::error::DriftError;
use ndarray::ArrayView1;
use num_traits::{Float, FromPrimitive};

pub struct QuantileBinning {
    pub num_quantiles: usize,
}

impl Default for QuantileBinning {
    fn default() -> Self {
        QuantileBinning { num_quantiles: 10 }
    }
}

impl QuantileBinning {
    /// Inner bin edges at `i / num_quantiles` for `i in 1..num_quantiles`.
    ///
    /// Uses the R-7 definition (Hyndman & Fan type 7, the R and numpy default):
    /// `h = (n - 1) * p`, `Q(p) = x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`
    /// over the sorted sample `x`.
    pub fn compute_edges<F>(&self, arr: &ArrayView1<F>) -> Result<Vec<F>, DriftError>
    where
        F: Float + FromPrimitive,
    {
        if self.num_quantiles < 2 {
            return Err(DriftError::InvalidParameterError(
                "num_quantiles must be at least 2".to_string(),
            ));
        }

        if arr.len() < self.num_quantiles {
            return Err(DriftError::InsufficientDataError(format!(
                "Need at least {} data points for {} quantiles, got {}",
                self.num_quantiles,
                self.num_quantiles,
                arr.len()
            )));
        }

        let mut data: Vec<F> = arr.to_vec();
        data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = data.len();
        (1..self.num_quantiles)
            .map(|i| {
                let p = i as f64 / self.num_quantiles as f64;
                let h = (n - 1) as f64 * p;
                let lower = h.floor() as usize;
                let upper = std::cmp::min(lower + 1, n - 1);

                let fraction = F::from_f64(h - lower as f64).ok_or_else(|| {
                    DriftError::InvalidParameterError(format!("Invalid quantile fraction {h}"))
                })?;

                Ok(data[lower] + fraction * (data[upper] - data[lower]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_edges_match_r7() {
        let data = Array1::from_vec((1..=11).map(|x| x as f64).collect());
        let edges = QuantileBinning::default().compute_edges(&data.view()).unwrap();

        assert_eq!(edges.len(), 9);
        // (n - 1) * p = 10 * 0.1 = 1 -> x[1] = 2
        approx::assert_relative_eq!(edges[0], 2.0);
        approx::assert_relative_eq!(edges[4], 6.0);
        approx::assert_relative_eq!(edges[8], 10.0);
    }

    #[test]
    fn test_edges_interpolate() {
        let data = Array1::from_vec(vec![4.0, 1.0, 3.0, 2.0]);
        let binning = QuantileBinning { num_quantiles: 2 };
        let edges = binning.compute_edges(&data.view()).unwrap();

        // median of 1..4 is 2.5
        assert_eq!(edges, vec![2.5]);
    }

    #[test]
    fn test_insufficient_data() {
        let data = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let err = QuantileBinning::default()
            .compute_edges(&data.view())
            .unwrap_err();
        assert!(matches!(err, DriftError::InsufficientDataError(_)));
    }
}
