//! Price-to-return conversion and cross-symbol alignment.
//!
//! Returns are simple returns `(p[t] - p[t-1]) / p[t-1]`. When several symbols
//! are aligned, every series is cut to the shortest one, keeping the most
//! recent observations so the windows line up at the latest date.

use super::error::QuantfolioError;
use std::collections::BTreeMap;

pub const MIN_PRICE_POINTS: usize = 2;

pub fn simple_returns(prices: &[f64]) -> Result<Vec<f64>, QuantfolioError> {
    if prices.len() < MIN_PRICE_POINTS {
        return Err(QuantfolioError::insufficient(
            "return series",
            prices.len(),
            MIN_PRICE_POINTS,
        ));
    }
    if let Some(bad) = prices.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
        return Err(QuantfolioError::invalid(
            "prices",
            format!("price {} is not a positive finite number", bad),
        ));
    }

    Ok(prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Converts each price series to returns and truncates all of them to the
/// shortest length, retaining the trailing window.
pub fn align_returns(
    prices_by_symbol: &BTreeMap<String, Vec<f64>>,
) -> Result<BTreeMap<String, Vec<f64>>, QuantfolioError> {
    let mut returns = BTreeMap::new();
    for (symbol, prices) in prices_by_symbol {
        let series = simple_returns(prices).map_err(|e| match e {
            QuantfolioError::InsufficientData { have, need, .. } => {
                QuantfolioError::insufficient(format!("return series for {}", symbol), have, need)
            }
            other => other,
        })?;
        returns.insert(symbol.clone(), series);
    }

    Ok(truncate_to_common_tail(returns))
}

/// Cuts already-computed series to their common trailing length.
pub fn truncate_to_common_tail(series: BTreeMap<String, Vec<f64>>) -> BTreeMap<String, Vec<f64>> {
    let min_length = series.values().map(Vec::len).min().unwrap_or(0);
    series
        .into_iter()
        .map(|(symbol, values)| {
            let start = values.len() - min_length;
            (symbol, values[start..].to_vec())
        })
        .collect()
}

/// Weighted sum of aligned return series. Symbols without a weight contribute nothing.
pub fn portfolio_returns(
    aligned: &BTreeMap<String, Vec<f64>>,
    weights: &BTreeMap<String, f64>,
) -> Vec<f64> {
    let length = aligned.values().map(Vec::len).min().unwrap_or(0);
    let mut combined = vec![0.0; length];

    for (symbol, returns) in aligned {
        let Some(&weight) = weights.get(symbol) else {
            continue;
        };
        let start = returns.len() - length;
        for (acc, r) in combined.iter_mut().zip(&returns[start..]) {
            *acc += weight * r;
        }
    }

    combined
}
