//! Buy/sell/hold signal for a single holding.
//!
//! Price is compared with its historical mean, then nudged by blended news
//! sentiment. Target and stop-loss levels follow from the final signal.

use super::error::QuantfolioError;
use super::sentiment::SentimentReading;
use super::stats::mean;
use serde::Serialize;

const PRICE_BAND: f64 = 0.10;
const STRONG_SENTIMENT: f64 = 0.2;
const MILD_SENTIMENT: f64 = 0.1;
const NEWS_BONUS_ARTICLES: usize = 5;
const MAX_CONFIDENCE: f64 = 0.95;
pub const UNANALYSED_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub symbol: String,
    pub signal: Signal,
    pub confidence: f64,
    pub reasoning: String,
    pub target_price: Option<f64>,
    pub stop_loss: Option<f64>,
}

impl Recommendation {
    /// Neutral fallback when a holding could not be analysed.
    pub fn unanalysed(symbol: impl Into<String>, reason: &QuantfolioError) -> Self {
        Recommendation {
            symbol: symbol.into(),
            signal: Signal::Hold,
            confidence: UNANALYSED_CONFIDENCE,
            reasoning: format!("Unable to analyze: {reason}"),
            target_price: None,
            stop_loss: None,
        }
    }
}

pub fn recommend(
    symbol: &str,
    current_price: f64,
    history: &[f64],
    sentiment: SentimentReading,
) -> Result<Recommendation, QuantfolioError> {
    if history.is_empty() {
        return Err(QuantfolioError::insufficient(
            format!("recommendation for {symbol}"),
            0,
            1,
        ));
    }
    if !(current_price.is_finite() && current_price > 0.0) {
        return Err(QuantfolioError::invalid(
            "current_price",
            "must be positive",
        ));
    }

    let reference = mean(history);
    let mut notes = Vec::new();

    let (mut signal, mut confidence): (Signal, f64) = if current_price > reference * (1.0 + PRICE_BAND) {
        notes.push(format!(
            "Price {:.1}% above 6-month average",
            (current_price / reference - 1.0) * 100.0
        ));
        (Signal::Sell, 0.70)
    } else if current_price < reference * (1.0 - PRICE_BAND) {
        notes.push(format!(
            "Price {:.1}% below 6-month average",
            (1.0 - current_price / reference) * 100.0
        ));
        (Signal::Buy, 0.65)
    } else {
        notes.push("Price near 6-month average".to_string());
        (Signal::Hold, 0.60)
    };

    let score = sentiment.score;
    if score > STRONG_SENTIMENT {
        match signal {
            Signal::Sell => (signal, confidence) = (Signal::Hold, 0.65),
            Signal::Hold => (signal, confidence) = (Signal::Buy, 0.75),
            Signal::Buy => {}
        }
        notes.push("Strong positive news sentiment".to_string());
    } else if score < -STRONG_SENTIMENT {
        match signal {
            Signal::Buy => (signal, confidence) = (Signal::Hold, 0.65),
            Signal::Hold => (signal, confidence) = (Signal::Sell, 0.75),
            Signal::Sell => {}
        }
        notes.push("Negative news sentiment detected".to_string());
    } else if score > MILD_SENTIMENT {
        notes.push("Positive news sentiment".to_string());
    } else if score < -MILD_SENTIMENT {
        notes.push("Slightly negative news sentiment".to_string());
    }

    if sentiment.article_count > 0 {
        notes.push(format!(
            "{} recent news articles analyzed",
            sentiment.article_count
        ));
    }

    let (target_price, stop_loss) = match signal {
        Signal::Buy => {
            let target = if current_price < reference {
                reference
            } else {
                current_price * 1.1
            };
            (Some(target), Some(current_price * 0.90))
        }
        Signal::Sell => (None, Some(current_price * 0.95)),
        Signal::Hold => (None, None),
    };

    if sentiment.article_count > NEWS_BONUS_ARTICLES {
        confidence = (confidence + 0.1).min(MAX_CONFIDENCE);
    }

    Ok(Recommendation {
        symbol: symbol.to_string(),
        signal,
        confidence,
        reasoning: notes.join(" | "),
        target_price,
        stop_loss,
    })
}
