//! Core domain types and analytics.

pub mod analysis;
pub mod analytics_config;
pub mod config_validation;
pub mod error;
pub mod estimator;
pub mod forecast;
pub mod holding;
pub mod optimizer;
pub mod performance;
pub mod price_series;
pub mod recommendation;
pub mod returns;
pub mod risk;
pub mod sentiment;
pub mod solver;
pub mod stats;
