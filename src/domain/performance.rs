//! Headline performance figures for a portfolio.

use super::error::QuantfolioError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_return: f64,
    /// Not annualized yet; equal to `total_return`.
    pub annualized_return: f64,
    pub cumulative_return: f64,
    pub best_day: f64,
    pub worst_day: f64,
}

/// Summarizes value growth since inception; best/worst day come from
/// `daily_returns` and are 0 when it is empty.
pub fn summarize(
    initial_capital: f64,
    current_value: f64,
    daily_returns: &[f64],
) -> Result<PerformanceSummary, QuantfolioError> {
    if !(initial_capital.is_finite() && initial_capital > 0.0) {
        return Err(QuantfolioError::invalid(
            "initial_capital",
            "must be positive",
        ));
    }
    let total_return = (current_value - initial_capital) / initial_capital;

    let best_day = daily_returns.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let worst_day = daily_returns.iter().copied().reduce(f64::min).unwrap_or(0.0);

    Ok(PerformanceSummary {
        total_return,
        annualized_return: total_return,
        cumulative_return: total_return,
        best_day,
        worst_day,
    })
}
