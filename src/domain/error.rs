//! Domain error types.

use super::optimizer::OptimizationResult;

/// Top-level error type for quantfolio.
#[derive(Debug, thiserror::Error)]
pub enum QuantfolioError {
    #[error("insufficient data for {context}: have {have} points, need {need}")]
    InsufficientData {
        context: String,
        have: usize,
        need: usize,
    },

    #[error("portfolio has no holdings")]
    NoHoldings,

    #[error("unable to fetch market data for any of: {}", symbols.join(", "))]
    MarketDataUnavailable { symbols: Vec<String> },

    #[error("optimizer did not converge after {iterations} iterations: {reason}")]
    OptimizationDiverged {
        iterations: usize,
        reason: String,
        /// Best iterate found, flagged `converged: false`.
        best: Box<OptimizationResult>,
    },

    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantfolioError {
    pub fn insufficient(context: impl Into<String>, have: usize, need: usize) -> Self {
        QuantfolioError::InsufficientData {
            context: context.into(),
            have,
            need,
        }
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        QuantfolioError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantfolioError> for std::process::ExitCode {
    fn from(err: &QuantfolioError) -> Self {
        let code: u8 = match err {
            QuantfolioError::Io(_) => 1,
            QuantfolioError::ConfigParse { .. }
            | QuantfolioError::ConfigMissing { .. }
            | QuantfolioError::ConfigInvalid { .. } => 2,
            QuantfolioError::DataSource { .. } => 3,
            QuantfolioError::InvalidArgument { .. } => 4,
            QuantfolioError::InsufficientData { .. }
            | QuantfolioError::MarketDataUnavailable { .. } => 5,
            QuantfolioError::OptimizationDiverged { .. } => 6,
            QuantfolioError::NoHoldings => 7,
        };
        std::process::ExitCode::from(code)
    }
}
