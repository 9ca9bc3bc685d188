//! Mock news sentiment
//!
//! No news source is queried. The score is drawn uniformly from
//! `[-0.5, 0.5]` so downstream steps have something to report.

use portfolio_core::{AnalysisState, SentimentLabel, SentimentScore, StepError, Ticker};
use rand::Rng;
use std::fmt;
use tracing::debug;

pub const SENTIMENT_DISABLED: &str = "ℹ️ Sentiment Disabled";

#[derive(Debug, Clone, PartialEq)]
pub enum SentimentOutcome {
    Disabled,
    Scored { ticker: Ticker, score: SentimentScore },
}

impl fmt::Display for SentimentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str(SENTIMENT_DISABLED),
            Self::Scored { ticker, score } => write!(
                f,
                "📰 {ticker} Sentiment: {} ({:.2})",
                score.label, score.score
            ),
        }
    }
}

/// Score `ticker` and store the result, unless sentiment is disabled
pub fn analyze_sentiment<R: Rng>(
    enabled: bool,
    state: &mut AnalysisState,
    ticker: &Ticker,
    rng: &mut R,
) -> Result<SentimentOutcome, StepError> {
    if !enabled {
        return Ok(SentimentOutcome::Disabled);
    }
    if !state.is_loaded(ticker) {
        return Err(StepError::missing_data(format!("❌ Error: {ticker} not loaded.")));
    }

    let value: f64 = rng.gen_range(-0.5..=0.5);
    let score = SentimentScore {
        score: value,
        label: SentimentLabel::from_score(value),
    };
    debug!(ticker = %ticker, score = value, "Sentiment scored");
    state.sentiment.insert(ticker.clone(), score);

    Ok(SentimentOutcome::Scored {
        ticker: ticker.clone(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::daily_bars;
    use chrono::NaiveDate;
    use portfolio_core::PriceSeries;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn loaded(symbol: &str) -> (AnalysisState, Ticker) {
        let ticker = Ticker::new(symbol).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut state = AnalysisState::new();
        state
            .portfolio
            .insert(ticker.clone(), PriceSeries::new(daily_bars(start, 5, |_| 1.0)));
        (state, ticker)
    }

    #[test]
    fn test_disabled_leaves_state_alone() {
        let (mut state, ticker) = loaded("AAA");
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = analyze_sentiment(false, &mut state, &ticker, &mut rng).unwrap();
        assert_eq!(outcome.to_string(), "ℹ️ Sentiment Disabled");
        assert!(state.sentiment.is_empty());
    }

    #[test]
    fn test_scores_are_bounded_and_labelled() {
        let (mut state, ticker) = loaded("AAA");
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let outcome = analyze_sentiment(true, &mut state, &ticker, &mut rng).unwrap();
            let SentimentOutcome::Scored { score, .. } = outcome else {
                panic!("expected a score");
            };
            assert!((-0.5..=0.5).contains(&score.score));
            assert_eq!(score.label == SentimentLabel::Positive, score.score > 0.0);
        }
        assert_eq!(state.sentiment.len(), 1);
    }

    #[test]
    fn test_same_seed_same_score() {
        let (mut a, ticker) = loaded("AAA");
        let (mut b, _) = loaded("AAA");

        let first =
            analyze_sentiment(true, &mut a, &ticker, &mut StdRng::seed_from_u64(1)).unwrap();
        let second =
            analyze_sentiment(true, &mut b, &ticker, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(first, second);
        assert!(first.to_string().starts_with("📰 AAA Sentiment: "));
    }

    #[test]
    fn test_unloaded_ticker() {
        let mut state = AnalysisState::new();
        let ticker = Ticker::new("ZZZ").unwrap();
        let err = analyze_sentiment(true, &mut state, &ticker, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err.message, "❌ Error: ZZZ not loaded.");
    }
}
