//! News sentiment provider port.

use crate::domain::error::QuantfolioError;
use crate::domain::sentiment::{self, Article, SentimentReading};

pub trait SentimentPort {
    /// Scored articles about `symbol`.
    fn stock_articles(&self, symbol: &str) -> Result<Vec<Article>, QuantfolioError>;

    /// Scored market-wide articles.
    fn market_articles(&self) -> Result<Vec<Article>, QuantfolioError>;

    fn stock_sentiment(&self, symbol: &str, limit: usize) -> Result<SentimentReading, QuantfolioError> {
        Ok(sentiment::stock_sentiment(&self.stock_articles(symbol)?, limit))
    }

    fn market_sentiment(&self) -> Result<SentimentReading, QuantfolioError> {
        Ok(sentiment::market_sentiment(&self.market_articles()?))
    }
}
