//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{load_holdings, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{
    optimize_portfolio, portfolio_performance, portfolio_risk, portfolio_risk_against_benchmark,
    predict_price, recommend_holdings, Prediction,
};
use crate::domain::analytics_config::{
    AnalyticsConfig, ForecastConfig, SentimentConfig, SolverConfig,
};
use crate::domain::config_validation::validate_analytics_config;
use crate::domain::error::QuantfolioError;
use crate::domain::holding::{position_breakdown, Holding, PositionSummary};
use crate::domain::optimizer::OptimizationResult;
use crate::domain::performance::PerformanceSummary;
use crate::domain::recommendation::Recommendation;
use crate::domain::risk::RiskProfile;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "quantfolio", about = "Portfolio risk, optimization and forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute risk and performance metrics for a set of holdings
    Risk {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short = 'H', long)]
        holdings: PathBuf,
        /// Symbol whose returns are used to regress beta
        #[arg(long)]
        benchmark: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Find Sharpe-maximizing weights for a set of holdings
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short = 'H', long)]
        holdings: PathBuf,
        /// Fraction of current volatility the result may carry (1 = uncapped)
        #[arg(long, default_value_t = 1.0)]
        risk_tolerance: f64,
        #[arg(long)]
        json: bool,
    },
    /// Forecast a symbol's price path
    Forecast {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value_t = 7)]
        days: usize,
        #[arg(long)]
        json: bool,
    },
    /// Buy/sell/hold signals for each holding
    Recommend {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short = 'H', long)]
        holdings: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Validate an analytics configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Serialize)]
pub struct RiskReport {
    pub risk: RiskProfile,
    pub performance: PerformanceSummary,
    pub positions: Vec<PositionSummary>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Risk {
            config,
            holdings,
            benchmark,
            json,
        } => run_risk(&config, &holdings, benchmark.as_deref(), json),
        Command::Optimize {
            config,
            holdings,
            risk_tolerance,
            json,
        } => run_optimize(&config, &holdings, risk_tolerance, json),
        Command::Forecast {
            config,
            symbol,
            days,
            json,
        } => run_forecast(&config, &symbol, days, json),
        Command::Recommend {
            config,
            holdings,
            json,
        } => run_recommend(&config, &holdings, json),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Reads every tunable, falling back to the built-in defaults.
pub fn build_analytics_config(adapter: &dyn ConfigPort) -> AnalyticsConfig {
    let defaults = AnalyticsConfig::default();
    let forecast = ForecastConfig::default();
    let sentiment = SentimentConfig::default();
    let solver = SolverConfig::default();

    AnalyticsConfig {
        risk_free_rate: adapter.get_double("analytics", "risk_free_rate", defaults.risk_free_rate),
        trading_days: adapter.get_double("analytics", "trading_days", defaults.trading_days),
        materiality_threshold: adapter.get_double(
            "analytics",
            "materiality_threshold",
            defaults.materiality_threshold,
        ),
        var_percentile: adapter.get_double("analytics", "var_percentile", defaults.var_percentile),
        forecast: ForecastConfig {
            min_history: adapter.get_usize("forecast", "min_history", forecast.min_history),
            trend_window: adapter.get_usize("forecast", "trend_window", forecast.trend_window),
            short_window: adapter.get_usize("forecast", "short_window", forecast.short_window),
            long_window: adapter.get_usize("forecast", "long_window", forecast.long_window),
            sentiment_trend_weight: adapter.get_double(
                "forecast",
                "sentiment_trend_weight",
                forecast.sentiment_trend_weight,
            ),
            sentiment_price_weight: adapter.get_double(
                "forecast",
                "sentiment_price_weight",
                forecast.sentiment_price_weight,
            ),
            sentiment_decay: adapter.get_double(
                "forecast",
                "sentiment_decay",
                forecast.sentiment_decay,
            ),
            max_confidence: adapter.get_double(
                "forecast",
                "max_confidence",
                forecast.max_confidence,
            ),
            min_base_confidence: adapter.get_double(
                "forecast",
                "min_base_confidence",
                forecast.min_base_confidence,
            ),
            max_news_bonus: adapter.get_double(
                "forecast",
                "max_news_bonus",
                forecast.max_news_bonus,
            ),
            news_saturation: adapter.get_double(
                "forecast",
                "news_saturation",
                forecast.news_saturation,
            ),
        },
        sentiment: SentimentConfig {
            stock_weight: adapter.get_double("sentiment", "stock_weight", sentiment.stock_weight),
            stock_article_limit: adapter.get_usize(
                "sentiment",
                "stock_article_limit",
                sentiment.stock_article_limit,
            ),
            recommendation_article_limit: adapter.get_usize(
                "sentiment",
                "recommendation_article_limit",
                sentiment.recommendation_article_limit,
            ),
        },
        solver: SolverConfig {
            max_iterations: adapter.get_usize("optimizer", "max_iterations", solver.max_iterations),
            max_inner_iterations: adapter.get_usize(
                "optimizer",
                "max_inner_iterations",
                solver.max_inner_iterations,
            ),
            tolerance: adapter.get_double("optimizer", "tolerance", solver.tolerance),
            weight_tolerance: adapter.get_double(
                "optimizer",
                "weight_tolerance",
                solver.weight_tolerance,
            ),
        },
    }
}

/// CSV adapter over `[data] price_dir` and the optional `[data] news_file`.
pub fn build_data_adapter(adapter: &dyn ConfigPort) -> Result<CsvAdapter, QuantfolioError> {
    let price_dir = adapter
        .get_string("data", "price_dir")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| QuantfolioError::ConfigMissing {
            section: "data".into(),
            key: "price_dir".into(),
        })?;

    let data = CsvAdapter::new(PathBuf::from(price_dir.trim()));
    Ok(
        match adapter
            .get_string("data", "news_file")
            .filter(|s| !s.trim().is_empty())
        {
            Some(news) => data.with_news(PathBuf::from(news.trim())),
            None => data,
        },
    )
}

/// Loads, validates and builds the analytics config plus the data adapter.
fn prepare(config_path: &Path) -> Result<(AnalyticsConfig, CsvAdapter), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    if let Err(e) = validate_analytics_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    let data = build_data_adapter(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok((build_analytics_config(&adapter), data))
}

fn read_holdings(path: &Path) -> Result<Vec<Holding>, ExitCode> {
    eprintln!("Loading holdings from {}", path.display());
    let holdings = load_holdings(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    if holdings.is_empty() {
        let err = QuantfolioError::NoHoldings;
        eprintln!("error: {err}");
        return Err((&err).into());
    }
    Ok(holdings)
}

fn write_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match write_json(value) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_risk(
    config_path: &Path,
    holdings_path: &Path,
    benchmark: Option<&str>,
    json: bool,
) -> ExitCode {
    let (config, data) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let holdings = match read_holdings(holdings_path) {
        Ok(h) => h,
        Err(code) => return code,
    };

    let risk = match benchmark {
        Some(symbol) => portfolio_risk_against_benchmark(&data, &holdings, symbol, &config),
        None => portfolio_risk(&data, &holdings, &config),
    };
    let risk = match risk {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let performance = match portfolio_performance(&data, &holdings) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let positions = match position_breakdown(&holdings) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let report = RiskReport {
        risk,
        performance,
        positions,
    };
    if json {
        return print_json(&report);
    }
    print_risk_report(&report);
    ExitCode::SUCCESS
}

fn print_risk_report(report: &RiskReport) {
    let risk = &report.risk;
    let perf = &report.performance;
    println!("=== Risk ===");
    println!("Annualized Return: {:.2}%", risk.annualized_return * 100.0);
    println!("Volatility:        {:.2}%", risk.volatility * 100.0);
    println!("Sharpe Ratio:      {:.2}", risk.sharpe_ratio);
    println!("Sortino Ratio:     {:.2}", risk.sortino_ratio);
    println!("Beta:              {:.2}", risk.beta);
    println!("Alpha:             {:.2}%", risk.alpha * 100.0);
    println!("VaR (95%):         {:.2}%", risk.var_95 * 100.0);
    println!("Max Drawdown:      {:.1}%", risk.max_drawdown * 100.0);
    println!("\n=== Performance ===");
    println!("Total Return:      {:.2}%", perf.total_return * 100.0);
    println!("Best Day:          {:.2}%", perf.best_day * 100.0);
    println!("Worst Day:         {:.2}%", perf.worst_day * 100.0);
    println!("\n=== Positions ===");
    for line in &report.positions {
        println!(
            "  {:<8} {:>12.2} {:>6.2}% {:>+7.2}%",
            line.symbol,
            line.market_value,
            line.weight * 100.0,
            line.unrealized_return * 100.0,
        );
    }
}

fn run_optimize(
    config_path: &Path,
    holdings_path: &Path,
    risk_tolerance: f64,
    json: bool,
) -> ExitCode {
    let (config, data) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let holdings = match read_holdings(holdings_path) {
        Ok(h) => h,
        Err(code) => return code,
    };

    eprintln!(
        "Optimizing {} holdings (risk tolerance {:.2})",
        holdings.len(),
        risk_tolerance
    );
    match optimize_portfolio(&data, &holdings, risk_tolerance, &config) {
        Ok(result) => {
            if json {
                return print_json(&result);
            }
            print_optimization(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            if let QuantfolioError::OptimizationDiverged { best, .. } = &e {
                eprintln!("Best weights found before stopping:");
                if json {
                    if let Err(ser) = write_json(best.as_ref()) {
                        eprintln!("error: failed to serialize best weights: {ser}");
                    }
                } else {
                    print_optimization(best);
                }
            }
            (&e).into()
        }
    }
}

fn print_optimization(result: &OptimizationResult) {
    println!("=== Optimal Weights ===");
    for (symbol, weight) in &result.weights {
        println!("  {:<8} {:>6.2}%", symbol, weight * 100.0);
    }
    println!("\nExpected Return:   {:.2}%", result.expected_return * 100.0);
    println!("Expected Risk:     {:.2}%", result.expected_risk * 100.0);
    println!("Sharpe Ratio:      {:.2}", result.sharpe_ratio);

    if result.rebalancing.is_empty() {
        println!("\nNo rebalancing needed");
    } else {
        println!("\n=== Rebalancing ===");
        for action in &result.rebalancing {
            println!(
                "  {:<8} {:<8} {:>6.2}% -> {:>6.2}%",
                action.symbol,
                action.direction.to_string(),
                action.current_weight * 100.0,
                action.recommended_weight * 100.0,
            );
        }
    }
}

fn run_forecast(config_path: &Path, symbol: &str, days: usize, json: bool) -> ExitCode {
    let (config, data) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let prediction = match predict_price(&data, &data, symbol, days, &config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if json {
        return print_json(&prediction);
    }
    print_prediction(&prediction);
    ExitCode::SUCCESS
}

fn print_prediction(prediction: &Prediction) {
    let forecast = &prediction.forecast;
    println!("=== {} Forecast ===", prediction.symbol);
    println!("Current Price:     {:.2}", prediction.current_price);
    println!("Predicted Price:   {:.2}", forecast.predicted_price);
    println!("Confidence:        {:.0}%", forecast.confidence * 100.0);
    println!(
        "Sentiment:         {:.2} {} ({} articles)",
        prediction.sentiment.score,
        prediction.sentiment_label,
        prediction.sentiment.article_count
    );
    for point in &forecast.points {
        println!("  day {:>3}: {:.2}", point.day, point.price);
    }
}

fn run_recommend(config_path: &Path, holdings_path: &Path, json: bool) -> ExitCode {
    let (config, data) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let holdings = match read_holdings(holdings_path) {
        Ok(h) => h,
        Err(code) => return code,
    };

    let recommendations = match recommend_holdings(&data, &data, &holdings, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if json {
        return print_json(&recommendations);
    }
    print_recommendations(&recommendations);
    ExitCode::SUCCESS
}

fn print_recommendations(recommendations: &[Recommendation]) {
    for rec in recommendations {
        println!(
            "{:<8} {:<5} {:>3.0}%  {}",
            rec.symbol,
            rec.signal.to_string(),
            rec.confidence * 100.0,
            rec.reasoning
        );
        if let Some(target) = rec.target_price {
            println!("         target {:.2}", target);
        }
        if let Some(stop) = rec.stop_loss {
            println!("         stop   {:.2}", stop);
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    eprintln!("Validating config: {}", adapter.origin());

    if let Err(e) = validate_analytics_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = build_data_adapter(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = build_analytics_config(&adapter);
    eprintln!("\nRisk-free rate:    {:.2}%", config.risk_free_rate * 100.0);
    eprintln!("Trading days:      {}", config.trading_days);
    eprintln!(
        "Forecast windows:  trend {}, short {}, long {}",
        config.forecast.trend_window, config.forecast.short_window, config.forecast.long_window
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
