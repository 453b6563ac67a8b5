//! Blending article-level polarity into a single sentiment score.

use super::analytics_config::SentimentConfig;
use chrono::NaiveDate;
use serde::Serialize;

pub const POSITIVE_THRESHOLD: f64 = 0.1;
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// A scored news article. `symbol` is `None` for market-wide news.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub date: NaiveDate,
    pub symbol: Option<String>,
    /// In [-1, 1].
    pub polarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentReading {
    pub score: f64,
    pub article_count: usize,
}

impl SentimentReading {
    pub const NEUTRAL: SentimentReading = SentimentReading {
        score: 0.0,
        article_count: 0,
    };

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Mean polarity of the `limit` most recent articles; count covers all of them.
pub fn stock_sentiment(articles: &[Article], limit: usize) -> SentimentReading {
    if articles.is_empty() {
        return SentimentReading::NEUTRAL;
    }
    let mut recent: Vec<&Article> = articles.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let used: Vec<f64> = recent.iter().take(limit).map(|a| a.polarity).collect();
    let score = if used.is_empty() {
        0.0
    } else {
        used.iter().sum::<f64>() / used.len() as f64
    };
    SentimentReading {
        score,
        article_count: articles.len(),
    }
}

/// Mean polarity over every market-wide article.
pub fn market_sentiment(articles: &[Article]) -> SentimentReading {
    stock_sentiment(articles, articles.len())
}

/// `stock_weight × stock + (1 - stock_weight) × market`, clamped to [-1, 1].
/// The article count is taken from the stock reading.
pub fn blend(
    stock: SentimentReading,
    market: SentimentReading,
    config: &SentimentConfig,
) -> SentimentReading {
    let score = config.stock_weight * stock.score + (1.0 - config.stock_weight) * market.score;
    SentimentReading {
        score: score.clamp(-1.0, 1.0),
        article_count: stock.article_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn article(day: u32, polarity: f64) -> Article {
        Article {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            symbol: Some("AAPL".into()),
            polarity,
        }
    }

    #[test]
    fn no_articles_is_neutral() {
        assert_eq!(stock_sentiment(&[], 10), SentimentReading::NEUTRAL);
    }

    #[test]
    fn uses_most_recent_articles() {
        let articles = vec![article(1, -1.0), article(3, 0.4), article(2, 0.2)];
        let reading = stock_sentiment(&articles, 2);
        assert_abs_diff_eq!(reading.score, 0.3, epsilon = 1e-12);
        assert_eq!(reading.article_count, 3);
    }

    #[test]
    fn blend_weights_stock_and_market() {
        let stock = SentimentReading {
            score: 0.5,
            article_count: 4,
        };
        let market = SentimentReading {
            score: -0.5,
            article_count: 20,
        };
        let blended = blend(stock, market, &SentimentConfig::default());
        assert_abs_diff_eq!(blended.score, 0.2, epsilon = 1e-12);
        assert_eq!(blended.article_count, 4);
    }

    #[test]
    fn labels() {
        assert_eq!(SentimentLabel::from_score(0.2), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.11), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Neutral);
    }
}
