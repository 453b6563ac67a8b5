//! Mean-variance weight optimization (maximum Sharpe, long-only, fully invested).
//!
//! The risk-tolerance `τ` caps the candidate's standard deviation at
//! `τ × σ(current weights)` when `τ < 1`. A current portfolio with zero
//! variance leaves the cap inactive.

use super::analytics_config::AnalyticsConfig;
use super::error::QuantfolioError;
use super::estimator::ReturnMoments;
use super::solver::{maximize_sharpe, SharpeProblem};
use nalgebra::DVector;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceDirection {
    Increase,
    Decrease,
}

impl std::fmt::Display for RebalanceDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalanceDirection::Increase => write!(f, "INCREASE"),
            RebalanceDirection::Decrease => write!(f, "DECREASE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceAction {
    pub symbol: String,
    pub direction: RebalanceDirection,
    pub current_weight: f64,
    pub recommended_weight: f64,
    /// recommended - current
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub weights: BTreeMap<String, f64>,
    pub expected_return: f64,
    /// Standard deviation of the optimal portfolio.
    pub expected_risk: f64,
    pub sharpe_ratio: f64,
    pub rebalancing: Vec<RebalanceAction>,
    pub converged: bool,
    pub iterations: usize,
}

/// Finds Sharpe-maximizing weights seeded at `current_weights`.
///
/// `current_weights` follow the row order of `moments.symbols` and are
/// normalized to sum to 1. Fails with `OptimizationDiverged` (carrying the
/// best iterate) when the solver does not converge.
pub fn optimize_weights(
    moments: &ReturnMoments,
    current_weights: &[f64],
    risk_tolerance: f64,
    config: &AnalyticsConfig,
) -> Result<OptimizationResult, QuantfolioError> {
    if moments.is_empty() || current_weights.is_empty() {
        return Err(QuantfolioError::NoHoldings);
    }
    let current = validate_inputs(moments, current_weights, risk_tolerance)?;

    let mut problem = SharpeProblem {
        mean_returns: &moments.mean_returns,
        covariance: &moments.covariance,
        risk_free_rate: config.risk_free_rate,
        risk_cap: None,
    };
    let current_std = problem.portfolio_std(&current);
    if risk_tolerance < 1.0 && current_std > 0.0 {
        problem.risk_cap = Some(risk_tolerance * current_std);
    }
    debug!(
        assets = moments.len(),
        risk_tolerance,
        current_std,
        cap = ?problem.risk_cap,
        "optimizing weights"
    );

    let outcome = maximize_sharpe(&problem, &current, &config.solver);
    let weights = clean_weights(outcome.weights, &current, config.solver.weight_tolerance);

    let expected_return = problem.expected_return(&weights);
    let expected_risk = problem.portfolio_std(&weights);
    let result = OptimizationResult {
        weights: moments
            .symbols
            .iter()
            .cloned()
            .zip(weights.iter().copied())
            .collect(),
        expected_return,
        expected_risk,
        sharpe_ratio: problem.sharpe(&weights),
        rebalancing: rebalancing_actions(
            &moments.symbols,
            &current,
            &weights,
            config.materiality_threshold,
        ),
        converged: outcome.converged,
        iterations: outcome.iterations,
    };

    if outcome.converged {
        Ok(result)
    } else {
        let reason = outcome
            .failure
            .unwrap_or_else(|| "solver stopped early".to_string());
        warn!(iterations = outcome.iterations, %reason, "optimizer did not converge");
        Err(QuantfolioError::OptimizationDiverged {
            iterations: outcome.iterations,
            reason,
            best: Box::new(result),
        })
    }
}

/// Actions for every symbol whose weight moves by more than `threshold`.
pub fn rebalancing_actions(
    symbols: &[String],
    current: &DVector<f64>,
    optimal: &DVector<f64>,
    threshold: f64,
) -> Vec<RebalanceAction> {
    symbols
        .iter()
        .zip(current.iter().zip(optimal.iter()))
        .filter(|(_, (c, o))| (*o - *c).abs() > threshold)
        .map(|(symbol, (&c, &o))| RebalanceAction {
            symbol: symbol.clone(),
            direction: if o > c {
                RebalanceDirection::Increase
            } else {
                RebalanceDirection::Decrease
            },
            current_weight: c,
            recommended_weight: o,
            change: o - c,
        })
        .collect()
}

fn validate_inputs(
    moments: &ReturnMoments,
    current_weights: &[f64],
    risk_tolerance: f64,
) -> Result<DVector<f64>, QuantfolioError> {
    let n = moments.len();
    if moments.mean_returns.len() != n || moments.covariance.shape() != (n, n) {
        return Err(QuantfolioError::invalid(
            "covariance",
            format!("expected {n}x{n} covariance and {n} mean returns"),
        ));
    }
    if current_weights.len() != n {
        return Err(QuantfolioError::invalid(
            "current_weights",
            format!("expected {} weights, got {}", n, current_weights.len()),
        ));
    }
    if !(0.0..=1.0).contains(&risk_tolerance) {
        return Err(QuantfolioError::invalid(
            "risk_tolerance",
            format!("{risk_tolerance} is outside [0, 1]"),
        ));
    }
    if moments.mean_returns.iter().any(|v| !v.is_finite())
        || moments.covariance.iter().any(|v| !v.is_finite())
    {
        return Err(QuantfolioError::invalid("moments", "values must be finite"));
    }
    if current_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(QuantfolioError::invalid(
            "current_weights",
            "weights must be finite and non-negative",
        ));
    }

    let total: f64 = current_weights.iter().sum();
    if total <= 0.0 {
        return Err(QuantfolioError::invalid(
            "current_weights",
            "weights must not all be zero",
        ));
    }
    Ok(DVector::from_iterator(
        n,
        current_weights.iter().map(|w| w / total),
    ))
}

/// Clips to [0, 1] and renormalizes when the sum drifts beyond `tolerance`.
fn clean_weights(weights: DVector<f64>, fallback: &DVector<f64>, tolerance: f64) -> DVector<f64> {
    let clipped = weights.map(|w| if w.is_finite() { w.clamp(0.0, 1.0) } else { 0.0 });
    let total = clipped.sum();
    if total <= 0.0 {
        return fallback.clone();
    }
    if (total - 1.0).abs() > tolerance {
        clipped / total
    } else {
        clipped
    }
}
