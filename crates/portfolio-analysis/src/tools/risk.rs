//! Tool for risk metrics

use super::TickerList;
use crate::api::MarketDataSource;
use crate::config::AnalysisConfig;
use crate::steps::calculate_risk;
use async_trait::async_trait;
use portfolio_core::{AnalysisState, Result};
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const NAME: &str = "calculate_risk_metrics";

/// Sharpe, beta, VaR and volatility for loaded tickers
pub struct RiskMetricsTool {
    source: Arc<dyn MarketDataSource>,
    config: Arc<AnalysisConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct RiskParams {
    #[serde(default)]
    tickers: Option<TickerList>,
}

impl RiskMetricsTool {
    pub fn new(source: Arc<dyn MarketDataSource>, config: Arc<AnalysisConfig>) -> Self {
        Self { source, config }
    }
}

#[async_trait]
impl Tool for RiskMetricsTool {
    async fn execute(&self, params: Value, state: &mut AnalysisState) -> Result<String> {
        let params: RiskParams = if params.is_null() {
            RiskParams::default()
        } else {
            serde_json::from_value(params)?
        };

        let tickers = match params.tickers {
            Some(list) => Some(list.parse()?).filter(|t: &Vec<_>| !t.is_empty()),
            None => None,
        };

        let report =
            calculate_risk(self.source.as_ref(), &self.config, state, tickers.as_deref()).await?;
        Ok(report.to_string())
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Calculate Sharpe ratio, beta against SPY, 95% value at risk and annualized \
         volatility for loaded tickers. Requires fetch_portfolio_data first."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "tickers": schema::string("Comma-separated subset of loaded tickers (default: all)"),
            }),
            &[],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticMarketData;
    use crate::api::memory::weekday_bars;
    use chrono::NaiveDate;
    use portfolio_core::{Error, PriceSeries, StepErrorKind, Ticker};

    fn wiggle(i: usize) -> f64 {
        50.0 + (i as f64 * 0.9).sin() + 0.05 * i as f64
    }

    #[tokio::test]
    async fn test_requires_loaded_data() {
        let tool = RiskMetricsTool::new(
            Arc::new(StaticMarketData::new()),
            Arc::new(AnalysisConfig::default()),
        );
        let mut state = AnalysisState::new();

        let err = tool.execute(json!({}), &mut state).await.unwrap_err();
        match err {
            Error::Step(step) => assert_eq!(step.kind, StepErrorKind::MissingData),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_all_loaded_by_default() {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let source = StaticMarketData::new().with_series("SPY", weekday_bars(start, 120, wiggle));
        let tool = RiskMetricsTool::new(Arc::new(source), Arc::new(AnalysisConfig::default()));

        let mut state = AnalysisState::new();
        for symbol in ["AAA", "BBB"] {
            state.portfolio.insert(
                Ticker::new(symbol).unwrap(),
                PriceSeries::new(weekday_bars(start, 100, wiggle)),
            );
        }

        let out = tool.execute(Value::Null, &mut state).await.unwrap();
        assert!(out.starts_with("📊 AAA:"));
        assert!(out.contains("\n\n📊 BBB:"));
        assert_eq!(state.risk_metrics.len(), 2);

        let out = tool
            .execute(json!({"tickers": "bbb"}), &mut state)
            .await
            .unwrap();
        assert!(out.starts_with("📊 BBB:"));
    }
}
