//! Tunable constants for the analytics engine.
//!
//! Every value here used to be a literal buried in a formula. The defaults
//! reproduce the reference behaviour; hosts override them through the
//! `[analytics]`, `[forecast]`, `[sentiment]` and `[optimizer]` config sections.

use serde::Serialize;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const MATERIALITY_THRESHOLD: f64 = 0.05;
pub const SENTIMENT_DECAY: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsConfig {
    pub risk_free_rate: f64,
    /// Annualization factor.
    pub trading_days: f64,
    /// Minimum |optimal - current| weight move that produces a rebalancing action.
    pub materiality_threshold: f64,
    /// Lower-tail percentile used for VaR, in percent.
    pub var_percentile: f64,
    pub forecast: ForecastConfig,
    pub sentiment: SentimentConfig,
    pub solver: SolverConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days: TRADING_DAYS_PER_YEAR,
            materiality_threshold: MATERIALITY_THRESHOLD,
            var_percentile: 5.0,
            forecast: ForecastConfig::default(),
            sentiment: SentimentConfig::default(),
            solver: SolverConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastConfig {
    pub min_history: usize,
    pub trend_window: usize,
    pub short_window: usize,
    pub long_window: usize,
    /// Scale of sentiment added to the trend.
    pub sentiment_trend_weight: f64,
    /// Maximum relative price move attributable to sentiment.
    pub sentiment_price_weight: f64,
    /// Fraction of the sentiment multiplier lost by the final forecast day.
    pub sentiment_decay: f64,
    pub max_confidence: f64,
    pub min_base_confidence: f64,
    pub max_news_bonus: f64,
    /// Article count at which the news bonus saturates.
    pub news_saturation: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            min_history: 30,
            trend_window: 20,
            short_window: 10,
            long_window: 30,
            sentiment_trend_weight: 0.1,
            sentiment_price_weight: 0.05,
            sentiment_decay: SENTIMENT_DECAY,
            max_confidence: 0.95,
            min_base_confidence: 0.5,
            max_news_bonus: 0.2,
            news_saturation: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentConfig {
    /// Weight of stock-specific sentiment; market sentiment gets the rest.
    pub stock_weight: f64,
    /// Most recent stock articles averaged for a price forecast.
    pub stock_article_limit: usize,
    /// Most recent stock articles averaged for a holding recommendation.
    pub recommendation_article_limit: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        SentimentConfig {
            stock_weight: 0.7,
            stock_article_limit: 10,
            recommendation_article_limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverConfig {
    /// Outer (multiplier update) iterations.
    pub max_iterations: usize,
    /// Projected-gradient steps per outer iteration.
    pub max_inner_iterations: usize,
    /// Relative stationarity and objective-improvement threshold.
    pub tolerance: f64,
    /// Smallest weight move that counts as progress; also the allowed drift
    /// of sum(weights) from 1 before renormalizing.
    pub weight_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iterations: 200,
            max_inner_iterations: 500,
            tolerance: 1e-9,
            weight_tolerance: 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = AnalyticsConfig::default();
        assert!((config.risk_free_rate - 0.05).abs() < f64::EPSILON);
        assert!((config.trading_days - 252.0).abs() < f64::EPSILON);
        assert!((config.materiality_threshold - 0.05).abs() < f64::EPSILON);
        assert!((config.forecast.sentiment_decay - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.forecast.min_history, 30);
        assert!((config.sentiment.stock_weight - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.sentiment.stock_article_limit, 10);
        assert_eq!(config.sentiment.recommendation_article_limit, 5);
    }
}
