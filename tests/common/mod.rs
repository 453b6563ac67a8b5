#![allow(dead_code)]

use chrono::NaiveDate;
use quantfolio::domain::error::QuantfolioError;
use quantfolio::domain::holding::Holding;
use quantfolio::domain::price_series::{PricePoint, PriceSeries};
use quantfolio::domain::sentiment::Article;
use quantfolio::ports::market_data_port::{HistoryPeriod, MarketDataPort};
use quantfolio::ports::sentiment_port::SentimentPort;
use std::collections::HashMap;

pub struct MockMarketDataPort {
    pub data: HashMap<String, Vec<f64>>,
    pub errors: HashMap<String, String>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, closes: Vec<f64>) -> Self {
        self.data.insert(symbol.to_string(), closes);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn price_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<PriceSeries, QuantfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuantfolioError::DataSource {
                reason: reason.clone(),
            });
        }
        let closes = self
            .data
            .get(symbol)
            .ok_or_else(|| QuantfolioError::DataSource {
                reason: format!("no data available for {symbol}"),
            })?;
        Ok(make_series(symbol, closes).tail(period.sessions()))
    }
}

#[derive(Default)]
pub struct MockSentimentPort {
    pub stock: HashMap<String, Vec<f64>>,
    pub market: Vec<f64>,
}

impl MockSentimentPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock(mut self, symbol: &str, polarities: Vec<f64>) -> Self {
        self.stock.insert(symbol.to_string(), polarities);
        self
    }

    pub fn with_market(mut self, polarities: Vec<f64>) -> Self {
        self.market = polarities;
        self
    }
}

fn articles(symbol: Option<&str>, polarities: &[f64]) -> Vec<Article> {
    polarities
        .iter()
        .enumerate()
        .map(|(i, &polarity)| Article {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            symbol: symbol.map(str::to_string),
            polarity,
        })
        .collect()
}

impl SentimentPort for MockSentimentPort {
    fn stock_articles(&self, symbol: &str) -> Result<Vec<Article>, QuantfolioError> {
        Ok(self
            .stock
            .get(symbol)
            .map(|p| articles(Some(symbol), p))
            .unwrap_or_default())
    }

    fn market_articles(&self) -> Result<Vec<Article>, QuantfolioError> {
        Ok(articles(None, &self.market))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = date(2023, 1, 2);
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            close,
            volume: 1000,
        })
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}

/// Prices compounding at a repeating pattern of daily returns.
pub fn prices_from_returns(start: f64, returns: &[f64], count: usize) -> Vec<f64> {
    let mut price = start;
    let mut prices = vec![price];
    for i in 0..count {
        price *= 1.0 + returns[i % returns.len()];
        prices.push(price);
    }
    prices
}

pub fn rising_prices(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

pub fn holding(symbol: &str, quantity: f64, price: f64) -> Holding {
    Holding::new(symbol, quantity, price, price)
}
