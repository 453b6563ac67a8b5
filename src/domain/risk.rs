//! Risk and risk-adjusted performance statistics for a portfolio return series.
//!
//! All figures are annualized with `trading_days` from [`AnalyticsConfig`].
//! Ratios whose denominator is zero are reported as 0 rather than NaN or ∞.
//!
//! `beta` is a stand-in fixed at 1.0 (so `alpha` is always 0) until a market
//! index series is supplied; [`compute_risk_metrics_against_market`] performs
//! the regression against one.

use super::analytics_config::AnalyticsConfig;
use super::error::QuantfolioError;
use super::stats::{mean, percentile, population_covariance, population_stddev};
use serde::Serialize;

pub const PLACEHOLDER_BETA: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub beta: f64,
    pub alpha: f64,
    /// Lower-tail return percentile scaled by sqrt(trading_days).
    pub var_95: f64,
    /// Always <= 0.
    pub max_drawdown: f64,
}

pub fn compute_risk_metrics(
    returns: &[f64],
    config: &AnalyticsConfig,
) -> Result<RiskProfile, QuantfolioError> {
    check_returns(returns, "risk metrics")?;

    let annualized_return = mean(returns) * config.trading_days;
    let volatility = population_stddev(returns) * config.trading_days.sqrt();
    let excess = annualized_return - config.risk_free_rate;

    let sharpe_ratio = safe_ratio(excess, volatility);
    let sortino_ratio = safe_ratio(excess, downside_deviation(returns, volatility, config));

    let beta = PLACEHOLDER_BETA;
    let alpha = annualized_return
        - (config.risk_free_rate + beta * (annualized_return - config.risk_free_rate));

    Ok(RiskProfile {
        annualized_return,
        volatility,
        sharpe_ratio,
        sortino_ratio,
        beta,
        alpha,
        var_95: value_at_risk(returns, config),
        max_drawdown: max_drawdown(returns),
    })
}

/// Same as [`compute_risk_metrics`] but with beta regressed against `market_returns`.
///
/// Both series are cut to their common trailing window. A market series with
/// zero variance yields beta 0.
pub fn compute_risk_metrics_against_market(
    returns: &[f64],
    market_returns: &[f64],
    config: &AnalyticsConfig,
) -> Result<RiskProfile, QuantfolioError> {
    let mut profile = compute_risk_metrics(returns, config)?;
    check_returns(market_returns, "market returns")?;

    let n = returns.len().min(market_returns.len());
    let portfolio = &returns[returns.len() - n..];
    let market = &market_returns[market_returns.len() - n..];

    let market_sd = population_stddev(market);
    let beta = safe_ratio(population_covariance(portfolio, market), market_sd * market_sd);
    let market_return = mean(market) * config.trading_days;

    profile.beta = beta;
    profile.alpha = profile.annualized_return
        - (config.risk_free_rate + beta * (market_return - config.risk_free_rate));
    Ok(profile)
}

/// Running-peak drawdown of the compounded return path; 0 for an empty series.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0_f64;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        peak = peak.max(cumulative);
        if peak > 0.0 {
            worst = worst.min((cumulative - peak) / peak);
        }
    }

    worst
}

pub fn value_at_risk(returns: &[f64], config: &AnalyticsConfig) -> f64 {
    percentile(returns, config.var_percentile) * config.trading_days.sqrt()
}

/// Annualized stdev of the negative returns, or `volatility` when none are negative.
fn downside_deviation(returns: &[f64], volatility: f64, config: &AnalyticsConfig) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        volatility
    } else {
        population_stddev(&downside) * config.trading_days.sqrt()
    }
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let ratio = numerator / denominator;
        if ratio.is_finite() { ratio } else { 0.0 }
    } else {
        0.0
    }
}

fn check_returns(returns: &[f64], context: &str) -> Result<(), QuantfolioError> {
    if returns.is_empty() {
        return Err(QuantfolioError::insufficient(context, 0, 1));
    }
    if returns.iter().any(|r| !r.is_finite()) {
        return Err(QuantfolioError::invalid(context, "returns must be finite"));
    }
    Ok(())
}
