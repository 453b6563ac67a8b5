//! Historical price provider port.

use crate::domain::error::QuantfolioError;
use crate::domain::price_series::PriceSeries;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    SixMonths,
    OneYear,
}

impl HistoryPeriod {
    /// Approximate number of trading sessions in the period.
    pub fn sessions(&self) -> usize {
        match self {
            HistoryPeriod::SixMonths => 126,
            HistoryPeriod::OneYear => 252,
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryPeriod::SixMonths => write!(f, "6mo"),
            HistoryPeriod::OneYear => write!(f, "1y"),
        }
    }
}

pub trait MarketDataPort {
    fn price_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<PriceSeries, QuantfolioError>;

    /// Default implementation: last close of the six-month history.
    fn latest_price(&self, symbol: &str) -> Result<f64, QuantfolioError> {
        self.price_history(symbol, HistoryPeriod::SixMonths)?
            .last_close()
            .ok_or_else(|| QuantfolioError::DataSource {
                reason: format!("no prices for {symbol}"),
            })
    }
}
