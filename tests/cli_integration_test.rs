//! CLI integration tests.
//!
//! Tests cover:
//! - Config parsing (build_analytics_config, build_data_adapter)
//! - Every subcommand against real INI and CSV files on disk

mod common;

use clap::Parser;
use common::*;
use quantfolio::adapters::file_config_adapter::FileConfigAdapter;
use quantfolio::cli::{self, Cli};
use quantfolio::domain::analytics_config::AnalyticsConfig;
use quantfolio::domain::error::QuantfolioError;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

// ExitCode has no PartialEq, so compare the Debug rendering.
fn assert_exit(actual: ExitCode, expected: ExitCode) {
    assert_eq!(format!("{actual:?}"), format!("{expected:?}"));
}

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["quantfolio"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

fn write_prices(dir: &Path, symbol: &str, closes: &[f64]) {
    let mut csv = String::from("date,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        let day = date(2024, 1, 1) + chrono::Duration::days(i as i64);
        writeln!(csv, "{day},{close},1000").unwrap();
    }
    fs::write(dir.join(format!("{symbol}.csv")), csv).unwrap();
}

/// Temp workspace with price files, news, holdings and a config pointing at them.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(extra_config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let prices = root.join("prices");
        fs::create_dir(&prices).unwrap();

        write_prices(&prices, "WIN", &prices_from_returns(100.0, &[0.01, -0.005], 199));
        write_prices(&prices, "LOSE", &prices_from_returns(100.0, &[0.002, -0.004, 0.001], 199));
        write_prices(&prices, "RISE", &rising_prices(60, 100.0, 0.5));

        fs::write(
            root.join("news.csv"),
            "date,symbol,polarity\n\
             2024-02-01,RISE,0.4\n\
             2024-02-02,RISE,0.6\n\
             2024-02-02,MARKET,0.1\n",
        )
        .unwrap();
        fs::write(
            root.join("holdings.csv"),
            "symbol,quantity,average_cost,current_price\n\
             WIN,10,90.0,100.0\n\
             LOSE,10,110.0,100.0\n",
        )
        .unwrap();
        fs::write(
            root.join("empty_holdings.csv"),
            "symbol,quantity,average_cost,current_price\n",
        )
        .unwrap();
        fs::write(
            root.join("config.ini"),
            format!(
                "[data]\nprice_dir = {}\nnews_file = {}\n\n{}",
                prices.display(),
                root.join("news.csv").display(),
                extra_config
            ),
        )
        .unwrap();

        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn build_analytics_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[data]\nprice_dir = prices\n").unwrap();
        assert_eq!(cli::build_analytics_config(&adapter), AnalyticsConfig::default());
    }

    #[test]
    fn build_analytics_config_custom_values() {
        let ini = r#"
[analytics]
risk_free_rate = 0.03
trading_days = 250
materiality_threshold = 0.01
var_percentile = 1

[forecast]
trend_window = 15
sentiment_decay = 0.5

[sentiment]
stock_weight = 0.6
stock_article_limit = 25
recommendation_article_limit = 3

[optimizer]
max_iterations = 50
tolerance = 1e-7
"#;
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let config = cli::build_analytics_config(&adapter);

        assert_eq!(config.risk_free_rate, 0.03);
        assert_eq!(config.trading_days, 250.0);
        assert_eq!(config.materiality_threshold, 0.01);
        assert_eq!(config.var_percentile, 1.0);
        assert_eq!(config.forecast.trend_window, 15);
        assert_eq!(config.forecast.long_window, 30);
        assert_eq!(config.forecast.sentiment_decay, 0.5);
        assert_eq!(config.sentiment.stock_weight, 0.6);
        assert_eq!(config.sentiment.stock_article_limit, 25);
        assert_eq!(config.sentiment.recommendation_article_limit, 3);
        assert_eq!(config.solver.max_iterations, 50);
        assert_eq!(config.solver.tolerance, 1e-7);
    }

    #[test]
    fn data_adapter_requires_price_dir() {
        let adapter = FileConfigAdapter::from_string("[data]\nnews_file = news.csv\n").unwrap();
        let err = cli::build_data_adapter(&adapter).err().unwrap();
        assert!(matches!(
            err,
            QuantfolioError::ConfigMissing { ref section, ref key } if section == "data" && key == "price_dir"
        ));
    }

    #[test]
    fn load_config_missing_file_fails() {
        let result = cli::load_config(Path::new("/nonexistent/path/config.ini"));
        assert_exit(result.err().unwrap(), ExitCode::from(2));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let ws = Workspace::new("[analytics]\nrisk_free_rate = 0.04\n");
        assert_exit(run(&["validate", "-c", &ws.path("config.ini")]), ExitCode::SUCCESS);
    }

    #[test]
    fn validate_rejects_bad_value() {
        let ws = Workspace::new("[analytics]\nvar_percentile = 150\n");
        assert_exit(run(&["validate", "-c", &ws.path("config.ini")]), ExitCode::from(2));
    }

    #[test]
    fn risk_runs() {
        let ws = Workspace::new("");
        let code = run(&[
            "risk",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("holdings.csv"),
            "--json",
        ]);
        assert_exit(code, ExitCode::SUCCESS);
    }

    #[test]
    fn risk_with_benchmark_runs() {
        let ws = Workspace::new("");
        let code = run(&[
            "risk",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("holdings.csv"),
            "--benchmark",
            "WIN",
        ]);
        assert_exit(code, ExitCode::SUCCESS);
    }

    #[test]
    fn optimize_runs() {
        let ws = Workspace::new("");
        let code = run(&[
            "optimize",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("holdings.csv"),
            "--risk-tolerance",
            "1.0",
        ]);
        assert_exit(code, ExitCode::SUCCESS);
    }

    #[test]
    fn optimize_rejects_bad_tolerance() {
        let ws = Workspace::new("");
        let code = run(&[
            "optimize",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("holdings.csv"),
            "--risk-tolerance",
            "2",
        ]);
        assert_exit(code, ExitCode::from(4));
    }

    #[test]
    fn optimize_reports_divergence_with_best_weights() {
        let ws = Workspace::new("");
        let single = ws.path("single.csv");
        fs::write(
            &single,
            "symbol,quantity,average_cost,current_price\nWIN,10,90.0,100.0\n",
        )
        .unwrap();

        // one asset cannot get below its own volatility
        let code = run(&[
            "optimize",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &single,
            "--risk-tolerance",
            "0.5",
            "--json",
        ]);
        assert_exit(code, ExitCode::from(6));
    }

    #[test]
    fn forecast_runs() {
        let ws = Workspace::new("");
        let code = run(&[
            "forecast",
            "-c",
            &ws.path("config.ini"),
            "--symbol",
            "RISE",
            "--days",
            "5",
            "--json",
        ]);
        assert_exit(code, ExitCode::SUCCESS);
    }

    #[test]
    fn forecast_unknown_symbol_is_data_source_error() {
        let ws = Workspace::new("");
        let code = run(&["forecast", "-c", &ws.path("config.ini"), "-s", "NOPE"]);
        assert_exit(code, ExitCode::from(3));
    }

    #[test]
    fn recommend_runs() {
        let ws = Workspace::new("");
        let code = run(&[
            "recommend",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("holdings.csv"),
        ]);
        assert_exit(code, ExitCode::SUCCESS);
    }

    #[test]
    fn empty_holdings_file_is_no_holdings() {
        let ws = Workspace::new("");
        let code = run(&[
            "risk",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("empty_holdings.csv"),
        ]);
        assert_exit(code, ExitCode::from(7));
    }

    #[test]
    fn missing_holdings_file_is_data_source_error() {
        let ws = Workspace::new("");
        let code = run(&[
            "recommend",
            "-c",
            &ws.path("config.ini"),
            "-H",
            &ws.path("missing.csv"),
        ]);
        assert_exit(code, ExitCode::from(3));
    }
}
