//! Portfolio analysis pipelines over the market-data and sentiment ports.
//!
//! Each entry point fetches what it needs through the ports, then hands the
//! numbers to the pure calculators in the sibling modules. Symbols whose
//! history cannot be fetched are skipped with a warning; a pipeline only
//! fails on missing data when no symbol resolves at all.

use super::analytics_config::AnalyticsConfig;
use super::error::QuantfolioError;
use super::estimator::estimate_moments;
use super::forecast::{forecast_prices, ForecastPath};
use super::holding::{current_weights, total_market_value, Holding};
use super::optimizer::{optimize_weights, OptimizationResult};
use super::performance::{summarize, PerformanceSummary};
use super::price_series::PriceSeries;
use super::recommendation::{recommend, Recommendation};
use super::returns::{align_returns, portfolio_returns, simple_returns};
use super::risk::{compute_risk_metrics, compute_risk_metrics_against_market, RiskProfile};
use super::sentiment::{blend, SentimentLabel, SentimentReading};
use crate::ports::market_data_port::{HistoryPeriod, MarketDataPort};
use crate::ports::sentiment_port::SentimentPort;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub symbol: String,
    pub current_price: f64,
    /// Blended stock/market sentiment that drove the forecast.
    pub sentiment: SentimentReading,
    pub sentiment_label: SentimentLabel,
    pub forecast: ForecastPath,
}

/// Fetches price history for each symbol, skipping the ones that fail.
pub fn fetch_histories(
    port: &dyn MarketDataPort,
    symbols: &[String],
    period: HistoryPeriod,
) -> Result<BTreeMap<String, PriceSeries>, QuantfolioError> {
    if symbols.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }

    let mut histories = BTreeMap::new();
    for symbol in symbols {
        match port.price_history(symbol, period) {
            Ok(series) => {
                debug!(symbol = %symbol, points = series.len(), %period, "fetched history");
                histories.insert(symbol.clone(), series);
            }
            Err(e) => warn!(symbol = %symbol, error = %e, "skipping symbol"),
        }
    }

    if histories.is_empty() {
        return Err(QuantfolioError::MarketDataUnavailable {
            symbols: symbols.to_vec(),
        });
    }
    Ok(histories)
}

fn holding_symbols(holdings: &[Holding]) -> Vec<String> {
    let mut symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

fn closes_by_symbol(histories: &BTreeMap<String, PriceSeries>) -> BTreeMap<String, Vec<f64>> {
    histories
        .iter()
        .map(|(symbol, series)| (symbol.clone(), series.closes()))
        .collect()
}

/// Weighted daily returns of the holdings over the past year.
///
/// Weights are market-value shares of the whole portfolio, so holdings
/// without data act as uninvested cash.
pub fn portfolio_daily_returns(
    port: &dyn MarketDataPort,
    holdings: &[Holding],
) -> Result<Vec<f64>, QuantfolioError> {
    let weights = current_weights(holdings)?;
    let histories = fetch_histories(port, &holding_symbols(holdings), HistoryPeriod::OneYear)?;
    let aligned = align_returns(&closes_by_symbol(&histories))?;
    Ok(portfolio_returns(&aligned, &weights))
}

pub fn portfolio_risk(
    port: &dyn MarketDataPort,
    holdings: &[Holding],
    config: &AnalyticsConfig,
) -> Result<RiskProfile, QuantfolioError> {
    info!(holdings = holdings.len(), "computing portfolio risk");
    let returns = portfolio_daily_returns(port, holdings)?;
    compute_risk_metrics(&returns, config)
}

/// Risk profile with beta regressed against `benchmark`'s one-year returns.
pub fn portfolio_risk_against_benchmark(
    port: &dyn MarketDataPort,
    holdings: &[Holding],
    benchmark: &str,
    config: &AnalyticsConfig,
) -> Result<RiskProfile, QuantfolioError> {
    info!(holdings = holdings.len(), benchmark, "computing portfolio risk");
    let returns = portfolio_daily_returns(port, holdings)?;
    let market = port.price_history(benchmark, HistoryPeriod::OneYear)?;
    let market_returns = simple_returns(&market.closes())?;
    compute_risk_metrics_against_market(&returns, &market_returns, config)
}

/// Growth from cost basis to market value, with best and worst days taken
/// from the one-year portfolio return series when it is available.
pub fn portfolio_performance(
    port: &dyn MarketDataPort,
    holdings: &[Holding],
) -> Result<PerformanceSummary, QuantfolioError> {
    if holdings.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }
    let cost_basis: f64 = holdings.iter().map(Holding::cost_basis).sum();
    let daily = match portfolio_daily_returns(port, holdings) {
        Ok(returns) => returns,
        Err(e) => {
            warn!(error = %e, "no daily data for performance summary");
            Vec::new()
        }
    };
    summarize(cost_basis, total_market_value(holdings), &daily)
}

pub fn optimize_portfolio(
    port: &dyn MarketDataPort,
    holdings: &[Holding],
    risk_tolerance: f64,
    config: &AnalyticsConfig,
) -> Result<OptimizationResult, QuantfolioError> {
    info!(holdings = holdings.len(), risk_tolerance, "optimizing portfolio");
    let weights = current_weights(holdings)?;
    let histories = fetch_histories(port, &holding_symbols(holdings), HistoryPeriod::OneYear)?;
    let aligned = align_returns(&closes_by_symbol(&histories))?;
    let moments = estimate_moments(&aligned, config.trading_days)?;

    // Starting point over the resolved symbols only; optimize_weights renormalizes.
    let start: Vec<f64> = moments
        .symbols
        .iter()
        .map(|s| weights.get(s).copied().unwrap_or(0.0))
        .collect();
    let start = if start.iter().sum::<f64>() > 0.0 {
        start
    } else {
        vec![1.0; moments.len()]
    };

    optimize_weights(&moments, &start, risk_tolerance, config)
}

/// Sentiment of the `article_limit` most recent articles on `symbol`,
/// blended with the market-wide reading.
pub fn blended_sentiment(
    sentiment: &dyn SentimentPort,
    symbol: &str,
    article_limit: usize,
    config: &AnalyticsConfig,
) -> Result<SentimentReading, QuantfolioError> {
    let stock = sentiment.stock_sentiment(symbol, article_limit)?;
    let market = sentiment.market_sentiment()?;
    Ok(blend(stock, market, &config.sentiment))
}

pub fn predict_price(
    market: &dyn MarketDataPort,
    sentiment: &dyn SentimentPort,
    symbol: &str,
    days_ahead: usize,
    config: &AnalyticsConfig,
) -> Result<Prediction, QuantfolioError> {
    info!(symbol, days_ahead, "forecasting price");
    let series = market.price_history(symbol, HistoryPeriod::OneYear)?;
    let reading = blended_sentiment(
        sentiment,
        symbol,
        config.sentiment.stock_article_limit,
        config,
    )?;
    let forecast = forecast_prices(
        &series.closes(),
        reading.score,
        reading.article_count,
        days_ahead,
        &config.forecast,
    )?;

    Ok(Prediction {
        symbol: series.symbol,
        current_price: forecast.current_price,
        sentiment: reading,
        sentiment_label: reading.label(),
        forecast,
    })
}

/// One recommendation per distinct holding symbol. A holding that cannot be
/// analysed gets a neutral HOLD instead of failing the whole batch.
pub fn recommend_holdings(
    market: &dyn MarketDataPort,
    sentiment: &dyn SentimentPort,
    holdings: &[Holding],
    config: &AnalyticsConfig,
) -> Result<Vec<Recommendation>, QuantfolioError> {
    if holdings.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }
    info!(holdings = holdings.len(), "building recommendations");

    Ok(holding_symbols(holdings)
        .into_iter()
        .map(|symbol| {
            recommend_one(market, sentiment, &symbol, config).unwrap_or_else(|e| {
                warn!(symbol = %symbol, error = %e, "recommendation unavailable");
                Recommendation::unanalysed(symbol, &e)
            })
        })
        .collect())
}

fn recommend_one(
    market: &dyn MarketDataPort,
    sentiment: &dyn SentimentPort,
    symbol: &str,
    config: &AnalyticsConfig,
) -> Result<Recommendation, QuantfolioError> {
    let current_price = market.latest_price(symbol)?;
    let history = market.price_history(symbol, HistoryPeriod::SixMonths)?;
    let reading = blended_sentiment(
        sentiment,
        symbol,
        config.sentiment.recommendation_article_limit,
        config,
    )?;
    recommend(symbol, current_price, &history.closes(), reading)
}
