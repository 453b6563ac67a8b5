//! Configuration validation.
//!
//! Checks every analytics tunable before a command runs. Keys that are
//! absent take their defaults from [`AnalyticsConfig`], so only explicit
//! out-of-range values are rejected.

use crate::domain::analytics_config::{
    AnalyticsConfig, ForecastConfig, SentimentConfig, SolverConfig,
};
use crate::domain::error::QuantfolioError;
use crate::ports::config_port::ConfigPort;

pub fn validate_analytics_config(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    validate_analytics_section(config)?;
    validate_forecast_section(config)?;
    validate_sentiment_section(config)?;
    validate_optimizer_section(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuantfolioError {
    QuantfolioError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_analytics_section(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let defaults = AnalyticsConfig::default();

    let rate = config.get_double("analytics", "risk_free_rate", defaults.risk_free_rate);
    if !(0.0..1.0).contains(&rate) {
        return Err(invalid(
            "analytics",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let days = config.get_double("analytics", "trading_days", defaults.trading_days);
    if days <= 0.0 {
        return Err(invalid(
            "analytics",
            "trading_days",
            "trading_days must be positive",
        ));
    }

    let threshold = config.get_double(
        "analytics",
        "materiality_threshold",
        defaults.materiality_threshold,
    );
    if threshold < 0.0 {
        return Err(invalid(
            "analytics",
            "materiality_threshold",
            "materiality_threshold must be non-negative",
        ));
    }

    let percentile = config.get_double("analytics", "var_percentile", defaults.var_percentile);
    if percentile <= 0.0 || percentile >= 100.0 {
        return Err(invalid(
            "analytics",
            "var_percentile",
            "var_percentile must be between 0 and 100 (exclusive)",
        ));
    }
    Ok(())
}

fn validate_forecast_section(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let defaults = ForecastConfig::default();

    let min_history = config.get_int("forecast", "min_history", defaults.min_history as i64);
    if min_history <= 0 {
        return Err(invalid("forecast", "min_history", "min_history must be positive"));
    }
    for (key, default) in [
        ("trend_window", defaults.trend_window),
        ("short_window", defaults.short_window),
        ("long_window", defaults.long_window),
    ] {
        let window = config.get_int("forecast", key, default as i64);
        if window <= 0 {
            return Err(invalid("forecast", key, format!("{key} must be positive")));
        }
        if key != "short_window" && window > min_history {
            return Err(invalid(
                "forecast",
                key,
                format!("{key} must not exceed min_history ({min_history})"),
            ));
        }
    }

    for (key, default) in [
        ("sentiment_trend_weight", defaults.sentiment_trend_weight),
        ("sentiment_price_weight", defaults.sentiment_price_weight),
        ("sentiment_decay", defaults.sentiment_decay),
        ("max_confidence", defaults.max_confidence),
        ("min_base_confidence", defaults.min_base_confidence),
        ("max_news_bonus", defaults.max_news_bonus),
    ] {
        let value = config.get_double("forecast", key, default);
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid("forecast", key, format!("{key} must be between 0 and 1")));
        }
    }

    let saturation = config.get_double("forecast", "news_saturation", defaults.news_saturation);
    if saturation <= 0.0 {
        return Err(invalid(
            "forecast",
            "news_saturation",
            "news_saturation must be positive",
        ));
    }
    Ok(())
}

fn validate_sentiment_section(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let defaults = SentimentConfig::default();

    let weight = config.get_double("sentiment", "stock_weight", defaults.stock_weight);
    if !(0.0..=1.0).contains(&weight) {
        return Err(invalid(
            "sentiment",
            "stock_weight",
            "stock_weight must be between 0 and 1",
        ));
    }

    for (key, default) in [
        ("stock_article_limit", defaults.stock_article_limit),
        (
            "recommendation_article_limit",
            defaults.recommendation_article_limit,
        ),
    ] {
        if config.get_int("sentiment", key, default as i64) <= 0 {
            return Err(invalid(
                "sentiment",
                key,
                format!("{key} must be positive"),
            ));
        }
    }
    Ok(())
}

fn validate_optimizer_section(config: &dyn ConfigPort) -> Result<(), QuantfolioError> {
    let defaults = SolverConfig::default();

    for (key, default) in [
        ("max_iterations", defaults.max_iterations),
        ("max_inner_iterations", defaults.max_inner_iterations),
    ] {
        if config.get_int("optimizer", key, default as i64) <= 0 {
            return Err(invalid("optimizer", key, format!("{key} must be positive")));
        }
    }

    for (key, default) in [
        ("tolerance", defaults.tolerance),
        ("weight_tolerance", defaults.weight_tolerance),
    ] {
        if config.get_double("optimizer", key, default) <= 0.0 {
            return Err(invalid("optimizer", key, format!("{key} must be positive")));
        }
    }
    Ok(())
}
