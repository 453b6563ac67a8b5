//! Portfolio holdings and their market-value weights.

use super::error::QuantfolioError;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub average_cost: f64,
    pub current_price: f64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: f64, average_cost: f64, current_price: f64) -> Self {
        Holding {
            symbol: symbol.into(),
            quantity,
            average_cost,
            current_price,
        }
    }

    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }

    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.average_cost
    }

    /// (current - cost) / cost; 0 when the cost is unknown.
    pub fn unrealized_return(&self) -> f64 {
        if self.average_cost > 0.0 {
            (self.current_price - self.average_cost) / self.average_cost
        } else {
            0.0
        }
    }
}

pub fn total_market_value(holdings: &[Holding]) -> f64 {
    holdings.iter().map(Holding::market_value).sum()
}

/// Per-holding valuation line of a portfolio report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub symbol: String,
    pub market_value: f64,
    /// Share of total market value.
    pub weight: f64,
    pub unrealized_return: f64,
}

/// One line per holding, in input order. Duplicate symbols stay separate.
pub fn position_breakdown(holdings: &[Holding]) -> Result<Vec<PositionSummary>, QuantfolioError> {
    if holdings.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }
    let total = total_market_value(holdings);
    if !(total.is_finite() && total > 0.0) {
        return Err(QuantfolioError::invalid(
            "holdings",
            "total market value must be positive",
        ));
    }
    Ok(holdings
        .iter()
        .map(|h| PositionSummary {
            symbol: h.symbol.clone(),
            market_value: h.market_value(),
            weight: h.market_value() / total,
            unrealized_return: h.unrealized_return(),
        })
        .collect())
}

/// Each holding's share of total market value. Duplicate symbols are merged.
pub fn current_weights(holdings: &[Holding]) -> Result<BTreeMap<String, f64>, QuantfolioError> {
    if holdings.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }
    let total = total_market_value(holdings);
    if !(total.is_finite() && total > 0.0) {
        return Err(QuantfolioError::invalid(
            "holdings",
            "total market value must be positive",
        ));
    }

    let mut weights = BTreeMap::new();
    for holding in holdings {
        *weights.entry(holding.symbol.clone()).or_insert(0.0) += holding.market_value() / total;
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn market_value_and_return() {
        let h = Holding::new("AAPL", 10.0, 150.0, 180.0);
        assert_abs_diff_eq!(h.market_value(), 1800.0);
        assert_abs_diff_eq!(h.cost_basis(), 1500.0);
        assert_abs_diff_eq!(h.unrealized_return(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn zero_cost_has_zero_return() {
        assert_eq!(Holding::new("GIFT", 1.0, 0.0, 10.0).unrealized_return(), 0.0);
    }

    #[test]
    fn weights_sum_to_one() {
        let holdings = vec![
            Holding::new("AAPL", 10.0, 100.0, 100.0),
            Holding::new("MSFT", 5.0, 100.0, 600.0),
        ];
        let weights = current_weights(&holdings).unwrap();
        assert_abs_diff_eq!(weights["AAPL"], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(weights["MSFT"], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(weights.values().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn breakdown_keeps_each_lot() {
        let holdings = vec![
            Holding::new("AAPL", 10.0, 80.0, 100.0),
            Holding::new("AAPL", 10.0, 125.0, 100.0),
            Holding::new("MSFT", 2.0, 0.0, 500.0),
        ];
        let lines = position_breakdown(&holdings).unwrap();

        assert_eq!(lines.len(), 3);
        assert_abs_diff_eq!(lines[0].weight, 1000.0 / 3000.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lines[0].unrealized_return, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(lines[1].unrealized_return, -0.2, epsilon = 1e-12);
        assert_eq!(lines[2].unrealized_return, 0.0);
        assert_abs_diff_eq!(lines[2].market_value, 1000.0);
        assert!(matches!(position_breakdown(&[]), Err(QuantfolioError::NoHoldings)));
    }

    #[test]
    fn empty_holdings() {
        assert!(matches!(current_weights(&[]), Err(QuantfolioError::NoHoldings)));
    }

    #[test]
    fn worthless_holdings_rejected() {
        let holdings = vec![Holding::new("AAPL", 0.0, 100.0, 100.0)];
        assert!(matches!(
            current_weights(&holdings),
            Err(QuantfolioError::InvalidArgument { .. })
        ));
    }
}
