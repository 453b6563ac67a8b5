//! CSV file adapter for prices, news sentiment and holdings.
//!
//! Layout:
//! - `<price_dir>/<SYMBOL>.csv` with header `date,close,volume`
//! - news file with header `date,symbol,polarity`; symbol `MARKET` marks market-wide news
//! - holdings file with header `symbol,quantity,average_cost,current_price`

use crate::domain::error::QuantfolioError;
use crate::domain::holding::Holding;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::domain::sentiment::Article;
use crate::ports::market_data_port::{HistoryPeriod, MarketDataPort};
use crate::ports::sentiment_port::SentimentPort;
use chrono::NaiveDate;
use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const MARKET_SYMBOL: &str = "MARKET";

pub struct CsvAdapter {
    price_dir: PathBuf,
    news_file: Option<PathBuf>,
}

impl CsvAdapter {
    pub fn new(price_dir: PathBuf) -> Self {
        Self {
            price_dir,
            news_file: None,
        }
    }

    pub fn with_news(mut self, news_file: PathBuf) -> Self {
        self.news_file = Some(news_file);
        self
    }

    fn price_path(&self, symbol: &str) -> PathBuf {
        self.price_dir.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn load_articles(&self) -> Result<Vec<Article>, QuantfolioError> {
        let Some(path) = &self.news_file else {
            return Ok(Vec::new());
        };
        let mut rdr = open_reader(path)?;
        let mut articles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(path, e))?;
            let date = parse_date(field_str(&record, 0, "date")?)?;
            let symbol = field_str(&record, 1, "symbol")?.trim().to_uppercase();
            let polarity: f64 = field(&record, 2, "polarity")?;
            if !(-1.0..=1.0).contains(&polarity) {
                return Err(QuantfolioError::DataSource {
                    reason: format!("polarity {polarity} outside [-1, 1] in {}", path.display()),
                });
            }
            articles.push(Article {
                date,
                symbol: (symbol != MARKET_SYMBOL).then_some(symbol),
                polarity,
            });
        }
        Ok(articles)
    }
}

impl MarketDataPort for CsvAdapter {
    fn price_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<PriceSeries, QuantfolioError> {
        let path = self.price_path(symbol);
        let mut rdr = open_reader(&path)?;
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&path, e))?;
            points.push(PricePoint {
                date: parse_date(field_str(&record, 0, "date")?)?,
                close: field(&record, 1, "close")?,
                volume: field(&record, 2, "volume")?,
            });
        }

        if points.is_empty() {
            return Err(QuantfolioError::DataSource {
                reason: format!("no data available for {symbol}"),
            });
        }

        points.sort_by_key(|p| p.date);
        Ok(PriceSeries::new(symbol.to_uppercase(), points)?.tail(period.sessions()))
    }
}

impl SentimentPort for CsvAdapter {
    fn stock_articles(&self, symbol: &str) -> Result<Vec<Article>, QuantfolioError> {
        let symbol = symbol.to_uppercase();
        Ok(self
            .load_articles()?
            .into_iter()
            .filter(|a| a.symbol.as_deref() == Some(symbol.as_str()))
            .collect())
    }

    fn market_articles(&self) -> Result<Vec<Article>, QuantfolioError> {
        Ok(self
            .load_articles()?
            .into_iter()
            .filter(|a| a.symbol.is_none())
            .collect())
    }
}

pub fn load_holdings(path: &Path) -> Result<Vec<Holding>, QuantfolioError> {
    let mut rdr = open_reader(path)?;
    let mut holdings = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        holdings.push(Holding {
            symbol: field_str(&record, 0, "symbol")?.trim().to_uppercase(),
            quantity: field(&record, 1, "quantity")?,
            average_cost: field(&record, 2, "average_cost")?,
            current_price: field(&record, 3, "current_price")?,
        });
    }
    Ok(holdings)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, QuantfolioError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| QuantfolioError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })
}

fn csv_error(path: &Path, e: csv::Error) -> QuantfolioError {
    QuantfolioError::DataSource {
        reason: format!("CSV parse error in {}: {}", path.display(), e),
    }
}

fn field_str<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, QuantfolioError> {
    record.get(index).ok_or_else(|| QuantfolioError::DataSource {
        reason: format!("missing {name} column"),
    })
}

fn field<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, QuantfolioError>
where
    T: FromStr,
    T::Err: Display,
{
    field_str(record, index, name)?
        .parse()
        .map_err(|e| QuantfolioError::DataSource {
            reason: format!("invalid {name} value: {e}"),
        })
}

fn parse_date(value: &str) -> Result<NaiveDate, QuantfolioError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| QuantfolioError::DataSource {
        reason: format!("invalid date format: {e}"),
    })
}
