//! Daily price history for a single symbol.

use super::error::QuantfolioError;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting non-increasing dates and non-positive closes.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, QuantfolioError> {
        let symbol = symbol.into();
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(QuantfolioError::DataSource {
                    reason: format!(
                        "{}: dates not strictly increasing at {}",
                        symbol, pair[1].date
                    ),
                });
            }
        }
        if let Some(bad) = points.iter().find(|p| !(p.close.is_finite() && p.close > 0.0)) {
            return Err(QuantfolioError::DataSource {
                reason: format!("{}: invalid close {} on {}", symbol, bad.close, bad.date),
            });
        }
        Ok(PriceSeries { symbol, points })
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Keeps only the most recent `count` points.
    pub fn tail(mut self, count: usize) -> Self {
        if self.points.len() > count {
            self.points.drain(..self.points.len() - count);
        }
        self
    }
}
