//! Sentiment-adjusted price forecast.
//!
//! The path is a linear extrapolation of the recent trend, nudged by a
//! sentiment term whose strength decays linearly across the horizon. The
//! headline `predicted_price` applies the undecayed sentiment multiplier to
//! the final day's base, so it differs from the last point of the path.
//! Confidence is a heuristic score, not a statistical error bound.

use super::analytics_config::ForecastConfig;
use super::error::QuantfolioError;
use super::stats::{mean, population_stddev};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub day: usize,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPath {
    pub current_price: f64,
    pub predicted_price: f64,
    /// In [0, 1].
    pub confidence: f64,
    pub points: Vec<ForecastPoint>,
    pub short_moving_average: f64,
    pub long_moving_average: f64,
    pub trend: f64,
}

pub fn forecast_prices(
    prices: &[f64],
    sentiment: f64,
    news_count: usize,
    days_ahead: usize,
    config: &ForecastConfig,
) -> Result<ForecastPath, QuantfolioError> {
    for (name, window) in [
        ("trend_window", config.trend_window),
        ("short_window", config.short_window),
        ("long_window", config.long_window),
    ] {
        if window == 0 {
            return Err(QuantfolioError::invalid(name, "window must be positive"));
        }
    }
    let required = config
        .min_history
        .max(config.trend_window)
        .max(config.long_window);
    if prices.len() < required {
        return Err(QuantfolioError::insufficient(
            "price forecast",
            prices.len(),
            required,
        ));
    }
    if days_ahead == 0 {
        return Err(QuantfolioError::invalid("days_ahead", "must be positive"));
    }
    if !(-1.0..=1.0).contains(&sentiment) {
        return Err(QuantfolioError::invalid(
            "sentiment",
            format!("{sentiment} is outside [-1, 1]"),
        ));
    }

    let window = &prices[prices.len() - required..];
    if window.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
        return Err(QuantfolioError::invalid(
            "prices",
            "recent prices must be positive and finite",
        ));
    }

    let n = prices.len();
    let current_price = prices[n - 1];
    let short_moving_average = mean(&prices[n - config.short_window.min(n)..]);
    let long_prices = &prices[n - config.long_window..];
    let long_moving_average = mean(long_prices);

    let anchor = prices[n - config.trend_window];
    let trend = (current_price - anchor) / anchor;
    let adjusted_trend = trend + sentiment * config.sentiment_trend_weight;
    let horizon = config.trend_window as f64;

    let base = |day: usize| current_price * (1.0 + adjusted_trend * day as f64 / horizon);

    let points = (1..=days_ahead)
        .map(|day| {
            let decay = 1.0 - (day as f64 / days_ahead as f64) * config.sentiment_decay;
            let impact = sentiment * config.sentiment_price_weight * decay;
            ForecastPoint {
                day,
                price: base(day) * (1.0 + impact),
            }
        })
        .collect();

    let predicted_price = base(days_ahead) * (1.0 + sentiment * config.sentiment_price_weight);

    Ok(ForecastPath {
        current_price,
        predicted_price,
        confidence: confidence(long_prices, news_count, config),
        points,
        short_moving_average,
        long_moving_average,
        trend,
    })
}

/// `min(max, max(floor, 1 - cv) + min(bonus, news / saturation))`
pub fn confidence(prices: &[f64], news_count: usize, config: &ForecastConfig) -> f64 {
    let avg = mean(prices);
    let volatility = if avg > 0.0 {
        population_stddev(prices) / avg
    } else {
        0.0
    };
    let news_bonus = (news_count as f64 / config.news_saturation).min(config.max_news_bonus);
    let base = (1.0 - volatility).max(config.min_base_confidence);
    (base + news_bonus).min(config.max_confidence)
}
