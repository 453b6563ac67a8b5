//! Annualized expected returns and covariance across aligned symbols.

use super::error::QuantfolioError;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;

/// Sample covariance needs two observations per symbol.
pub const MIN_ALIGNED_RETURNS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMoments {
    /// Row order of `mean_returns` and `covariance`.
    pub symbols: Vec<String>,
    pub mean_returns: DVector<f64>,
    /// Always square, 1x1 for a single asset.
    pub covariance: DMatrix<f64>,
}

impl ReturnMoments {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Estimates moments from equal-length return series (see `returns::align_returns`).
pub fn estimate_moments(
    aligned: &BTreeMap<String, Vec<f64>>,
    trading_days: f64,
) -> Result<ReturnMoments, QuantfolioError> {
    if aligned.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }

    let symbols: Vec<String> = aligned.keys().cloned().collect();
    let n_assets = symbols.len();
    let n_obs = aligned.values().map(Vec::len).min().unwrap_or(0);
    if aligned.values().any(|r| r.len() != n_obs) {
        return Err(QuantfolioError::invalid(
            "returns",
            "series must be aligned to equal length",
        ));
    }
    if n_obs < MIN_ALIGNED_RETURNS {
        return Err(QuantfolioError::insufficient(
            "covariance estimate",
            n_obs,
            MIN_ALIGNED_RETURNS,
        ));
    }

    // rows = symbols, columns = time
    let data = DMatrix::from_row_iterator(
        n_assets,
        n_obs,
        aligned.values().flat_map(|r| r.iter().copied()),
    );

    let row_means = DVector::from_iterator(n_assets, data.row_iter().map(|row| row.mean()));
    let mut centered = data;
    for (i, mut row) in centered.row_iter_mut().enumerate() {
        row.add_scalar_mut(-row_means[i]);
    }

    let covariance = (&centered * centered.transpose()) * (trading_days / (n_obs - 1) as f64);
    let mean_returns = row_means * trading_days;

    Ok(ReturnMoments {
        symbols,
        mean_returns,
        covariance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn aligned(entries: &[(&str, Vec<f64>)]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(s, v)| (s.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn single_asset_is_one_by_one() {
        let moments = estimate_moments(&aligned(&[("AAA", vec![0.01, 0.03])]), 252.0).unwrap();
        assert_eq!(moments.covariance.shape(), (1, 1));
        assert_abs_diff_eq!(moments.mean_returns[0], 0.02 * 252.0, epsilon = 1e-12);
        // sample variance of [0.01, 0.03] = 0.0002
        assert_abs_diff_eq!(moments.covariance[(0, 0)], 0.0002 * 252.0, epsilon = 1e-12);
    }

    #[test]
    fn two_asset_covariance() {
        let moments = estimate_moments(
            &aligned(&[
                ("AAA", vec![0.01, 0.02, 0.03]),
                ("BBB", vec![0.03, 0.02, 0.01]),
            ]),
            1.0,
        )
        .unwrap();

        assert_eq!(moments.symbols, vec!["AAA", "BBB"]);
        assert_abs_diff_eq!(moments.covariance[(0, 0)], 0.0001, epsilon = 1e-15);
        assert_abs_diff_eq!(moments.covariance[(1, 1)], 0.0001, epsilon = 1e-15);
        assert_abs_diff_eq!(moments.covariance[(0, 1)], -0.0001, epsilon = 1e-15);
        assert_abs_diff_eq!(moments.covariance[(1, 0)], -0.0001, epsilon = 1e-15);
    }

    #[test]
    fn too_few_observations() {
        let err = estimate_moments(&aligned(&[("AAA", vec![0.01])]), 252.0).unwrap_err();
        assert!(matches!(err, QuantfolioError::InsufficientData { have: 1, need: 2, .. }));
    }

    #[test]
    fn unequal_lengths_rejected() {
        let err = estimate_moments(
            &aligned(&[("AAA", vec![0.01, 0.02]), ("BBB", vec![0.01, 0.02, 0.03])]),
            252.0,
        )
        .unwrap_err();
        assert!(matches!(err, QuantfolioError::InvalidArgument { .. }));
    }

    #[test]
    fn empty_input_means_no_holdings() {
        let err = estimate_moments(&BTreeMap::new(), 252.0).unwrap_err();
        assert!(matches!(err, QuantfolioError::NoHoldings));
    }
}
