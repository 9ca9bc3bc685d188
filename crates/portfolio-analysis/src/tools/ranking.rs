//! Tool for the portfolio ranking

use crate::steps::rank_portfolio;
use async_trait::async_trait;
use portfolio_core::{AnalysisState, Result};
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde_json::Value;

pub const NAME: &str = "compare_portfolio";

pub struct ComparePortfolioTool;

#[async_trait]
impl Tool for ComparePortfolioTool {
    async fn execute(&self, _params: Value, state: &mut AnalysisState) -> Result<String> {
        Ok(rank_portfolio(state)?.to_string())
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Rank analyzed tickers by 0.5 x Sharpe ratio + 0.1 x forecast change %. \
         Requires calculate_risk_metrics first."
    }

    fn input_schema(&self) -> Value {
        schema::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{RiskMetrics, Ticker};
    use serde_json::json;

    #[tokio::test]
    async fn test_ranking_text() {
        let mut state = AnalysisState::new();
        let err = ComparePortfolioTool
            .execute(json!({}), &mut state)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "❌ Run risk analysis first.");

        state.risk_metrics.insert(
            Ticker::new("AAA").unwrap(),
            RiskMetrics {
                sharpe: 1.0,
                beta: 1.0,
                var_95: -0.01,
                volatility: 0.1,
            },
        );
        let out = ComparePortfolioTool
            .execute(json!({}), &mut state)
            .await
            .unwrap();
        assert_eq!(out, "🏆 PORTFOLIO RANKING:\n1. AAA (Score: 0.50)");
    }
}
