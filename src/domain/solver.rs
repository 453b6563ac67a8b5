//! Constrained maximum-Sharpe solver.
//!
//! Long-only, fully-invested weights live on the probability simplex, so the
//! bounds and the budget equality are enforced exactly by Euclidean projection.
//! The optional risk ceiling `sqrt(w'Σw) <= cap` is handled with an augmented
//! Lagrangian: each outer iteration runs spectral projected gradient descent
//! (Barzilai-Borwein step lengths, Armijo backtracking) on the penalized
//! objective, then updates the multiplier.
//!
//! Stationarity is judged relative to the gradient's scale: the projected
//! gradient step must be below `tolerance × max(1, |grad|)`, or a full step
//! must move the weights less than `weight_tolerance` without improving the
//! objective by more than `tolerance` in relative terms.
//!
//! This is a local method. The answer depends on the starting point and is not
//! guaranteed to be the global optimum or unique.

use super::analytics_config::SolverConfig;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

const INITIAL_PENALTY: f64 = 10.0;
const MAX_PENALTY: f64 = 1e10;
const ARMIJO_C: f64 = 1e-4;
const MIN_STEP: f64 = 1e-14;
const MIN_SPECTRAL: f64 = 1e-10;
const MAX_SPECTRAL: f64 = 1e10;
/// Relative slack on the risk ceiling.
const FEASIBILITY_TOL: f64 = 1e-6;

pub struct SharpeProblem<'a> {
    pub mean_returns: &'a DVector<f64>,
    pub covariance: &'a DMatrix<f64>,
    pub risk_free_rate: f64,
    /// Upper bound on portfolio standard deviation, if any.
    pub risk_cap: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub weights: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Why the solver stopped without converging.
    pub failure: Option<String>,
}

impl SharpeProblem<'_> {
    pub fn portfolio_std(&self, w: &DVector<f64>) -> f64 {
        w.dot(&(self.covariance * w)).max(0.0).sqrt()
    }

    pub fn expected_return(&self, w: &DVector<f64>) -> f64 {
        w.dot(self.mean_returns)
    }

    /// Sharpe ratio of `w`; 0 when the portfolio has no variance.
    pub fn sharpe(&self, w: &DVector<f64>) -> f64 {
        let std = self.portfolio_std(w);
        if std > 0.0 {
            (self.expected_return(w) - self.risk_free_rate) / std
        } else {
            0.0
        }
    }

    /// Normalized constraint `std / cap - 1`; feasible when <= 0.
    fn violation(&self, w: &DVector<f64>) -> f64 {
        match self.risk_cap {
            Some(cap) if cap > 0.0 => self.portfolio_std(w) / cap - 1.0,
            Some(_) => self.portfolio_std(w),
            None => f64::NEG_INFINITY,
        }
    }

    fn is_feasible(&self, w: &DVector<f64>) -> bool {
        self.violation(w) <= FEASIBILITY_TOL
    }

    fn lagrangian(&self, w: &DVector<f64>, multiplier: f64, penalty: f64) -> f64 {
        let objective = -self.sharpe(w);
        if self.risk_cap.is_none() {
            return objective;
        }
        let shifted = (multiplier + penalty * self.violation(w)).max(0.0);
        objective + (shifted * shifted - multiplier * multiplier) / (2.0 * penalty)
    }

    fn lagrangian_gradient(&self, w: &DVector<f64>, multiplier: f64, penalty: f64) -> DVector<f64> {
        let sigma_w = self.covariance * w;
        let var = w.dot(&sigma_w).max(0.0);
        let std = var.sqrt();
        if std <= 0.0 {
            return DVector::zeros(w.len());
        }

        let excess = self.expected_return(w) - self.risk_free_rate;
        // d(-S)/dw = -(mu / std - excess * Σw / std^3)
        let mut grad = -(self.mean_returns / std - &sigma_w * (excess / (var * std)));

        if let Some(cap) = self.risk_cap {
            let shifted = (multiplier + penalty * self.violation(w)).max(0.0);
            if shifted > 0.0 {
                let scale = if cap > 0.0 { cap } else { 1.0 };
                grad += &sigma_w * (shifted / (std * scale));
            }
        }
        grad
    }
}

/// Euclidean projection onto `{w : w >= 0, sum(w) = 1}`.
pub fn project_simplex(v: &DVector<f64>) -> DVector<f64> {
    let n = v.len();
    if n == 0 {
        return DVector::zeros(0);
    }

    let mut sorted: Vec<f64> = v.iter().copied().collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (i, value) in sorted.iter().enumerate() {
        cumulative += value;
        let candidate = (cumulative - 1.0) / (i + 1) as f64;
        if value - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.map(|x| (x - theta).max(0.0))
}

/// Maximizes the Sharpe ratio on the simplex starting from `start`.
pub fn maximize_sharpe(
    problem: &SharpeProblem<'_>,
    start: &DVector<f64>,
    config: &SolverConfig,
) -> SolverOutcome {
    let mut w = project_simplex(start);
    let mut multiplier = 0.0;
    let mut penalty = INITIAL_PENALTY;
    let mut previous_violation = f64::INFINITY;
    let mut best = w.clone();
    let mut iterations = 0;

    for outer in 0..config.max_iterations.max(1) {
        let before = w.clone();
        let (next, steps, stationary) = descend(problem, &w, multiplier, penalty, config);
        iterations += steps;
        w = next;
        let stalled = (&w - &before).norm() <= config.weight_tolerance;

        if better_iterate(problem, &w, &best) {
            best = w.clone();
        }

        if problem.risk_cap.is_none() {
            if stationary || stalled {
                debug!(outer, iterations, stationary, "unconstrained solve converged");
                return finish(best, iterations, true, None);
            }
            continue;
        }

        let violation = problem.violation(&w);
        let next_multiplier = (multiplier + penalty * violation).max(0.0);
        let settled = (next_multiplier - multiplier).abs() <= config.tolerance.sqrt();
        debug!(outer, violation, multiplier = next_multiplier, penalty, "multiplier update");

        if (stationary || stalled) && violation <= FEASIBILITY_TOL && settled {
            return finish(best, iterations, true, None);
        }

        multiplier = next_multiplier;
        if violation > FEASIBILITY_TOL && violation > 0.25 * previous_violation {
            if penalty >= MAX_PENALTY {
                return finish(
                    best,
                    iterations,
                    false,
                    Some("risk ceiling cannot be met by any long-only portfolio".into()),
                );
            }
            penalty = (penalty * 10.0).min(MAX_PENALTY);
        }
        previous_violation = violation.max(0.0);
    }

    let failure = if problem.is_feasible(&best) {
        "iteration budget exhausted before reaching a stationary point"
    } else {
        "iteration budget exhausted with the risk ceiling still violated"
    };
    finish(best, iterations, false, Some(failure.into()))
}

fn finish(
    weights: DVector<f64>,
    iterations: usize,
    converged: bool,
    failure: Option<String>,
) -> SolverOutcome {
    SolverOutcome {
        weights,
        iterations,
        converged,
        failure,
    }
}

/// Feasible beats infeasible; among feasible the higher Sharpe wins,
/// among infeasible the smaller violation wins.
fn better_iterate(problem: &SharpeProblem<'_>, candidate: &DVector<f64>, incumbent: &DVector<f64>) -> bool {
    match (problem.is_feasible(candidate), problem.is_feasible(incumbent)) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => problem.sharpe(candidate) >= problem.sharpe(incumbent),
        (false, false) => problem.violation(candidate) < problem.violation(incumbent),
    }
}

/// Spectral projected gradient descent on the augmented Lagrangian.
/// Returns the final point, steps taken and whether it is stationary.
fn descend(
    problem: &SharpeProblem<'_>,
    start: &DVector<f64>,
    multiplier: f64,
    penalty: f64,
    config: &SolverConfig,
) -> (DVector<f64>, usize, bool) {
    let mut w = start.clone();
    let mut value = problem.lagrangian(&w, multiplier, penalty);
    let mut grad = problem.lagrangian_gradient(&w, multiplier, penalty);
    let mut spectral = 1.0_f64;

    for k in 0..config.max_inner_iterations.max(1) {
        let scale = grad.norm().max(1.0);
        let measure = (project_simplex(&(&w - &grad)) - &w).norm();
        if measure <= config.tolerance * scale {
            return (w, k, true);
        }

        // Both ends lie on the simplex, so every point between them does too.
        let direction = project_simplex(&(&w - &grad * spectral)) - &w;
        let slope = grad.dot(&direction);
        let mut accepted = None;
        let mut lambda = 1.0_f64;
        if slope < 0.0 {
            while lambda >= MIN_STEP {
                let candidate = &w + &direction * lambda;
                let candidate_value = problem.lagrangian(&candidate, multiplier, penalty);
                if candidate_value <= value + ARMIJO_C * lambda * slope {
                    accepted = Some((candidate, candidate_value));
                    break;
                }
                lambda *= 0.5;
            }
        }

        // No descent left at machine precision.
        let Some((next, next_value)) = accepted else {
            return (w, k, measure <= config.tolerance.sqrt() * scale);
        };

        let next_grad = problem.lagrangian_gradient(&next, multiplier, penalty);
        let s = &next - &w;
        let y = &next_grad - &grad;
        let sy = s.dot(&y);
        let moved = s.norm();
        let improvement = value - next_value;

        // A full step is bounded below by min(1, spectral) times the
        // projected gradient step, so a tiny one means w is stationary.
        let full_step = lambda == 1.0;
        let stagnant = full_step
            && moved <= config.weight_tolerance * spectral.min(1.0)
            && improvement <= config.tolerance * value.abs().max(1.0);

        spectral = if sy > 0.0 {
            (s.norm_squared() / sy).clamp(MIN_SPECTRAL, MAX_SPECTRAL)
        } else {
            MAX_SPECTRAL
        };
        w = next;
        value = next_value;
        grad = next_grad;

        if stagnant {
            return (w, k + 1, true);
        }
    }

    (w, config.max_inner_iterations, false)
}
