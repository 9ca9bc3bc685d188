//! Tool for (mock) news sentiment

use crate::steps::analyze_sentiment;
use async_trait::async_trait;
use portfolio_core::{AnalysisState, Result, Ticker};
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

pub const NAME: &str = "analyze_sentiment";

pub struct SentimentTool {
    enabled: bool,
    rng: Mutex<StdRng>,
}

#[derive(Debug, Deserialize)]
struct SentimentParams {
    ticker: String,
}

impl SentimentTool {
    /// `seed` makes the scores reproducible; `None` seeds from the OS
    pub fn new(enabled: bool, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            enabled,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl Tool for SentimentTool {
    async fn execute(&self, params: Value, state: &mut AnalysisState) -> Result<String> {
        let params: SentimentParams = serde_json::from_value(params)?;
        let ticker = Ticker::new(&params.ticker)?;

        let mut rng = self.rng.lock().await;
        let outcome = analyze_sentiment(self.enabled, state, &ticker, &mut *rng)?;
        Ok(outcome.to_string())
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Score recent news sentiment for a loaded ticker as POSITIVE or NEGATIVE."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Ticker symbol"),
            }),
            &["ticker"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::PriceSeries;

    fn loaded_state() -> AnalysisState {
        let mut state = AnalysisState::new();
        state
            .portfolio
            .insert(Ticker::new("AAA").unwrap(), PriceSeries::default());
        state
    }

    #[tokio::test]
    async fn test_disabled() {
        let tool = SentimentTool::new(false, Some(3));
        let mut state = loaded_state();
        let out = tool.execute(json!({"ticker": "AAA"}), &mut state).await.unwrap();
        assert_eq!(out, "ℹ️ Sentiment Disabled");
        assert!(state.sentiment.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_scores_repeat() {
        let mut a = loaded_state();
        let mut b = loaded_state();
        let first = SentimentTool::new(true, Some(9))
            .execute(json!({"ticker": "aaa"}), &mut a)
            .await
            .unwrap();
        let second = SentimentTool::new(true, Some(9))
            .execute(json!({"ticker": "AAA"}), &mut b)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("📰 AAA Sentiment: "));
        assert_eq!(a.sentiment.len(), 1);
    }
}
