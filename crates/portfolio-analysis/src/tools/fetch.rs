//! Tool for loading price history

use super::TickerList;
use crate::api::MarketDataSource;
use crate::config::AnalysisConfig;
use crate::steps::fetch_portfolio;
use async_trait::async_trait;
use portfolio_core::{AnalysisState, Error, LookbackPeriod, Result};
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const NAME: &str = "fetch_portfolio_data";

/// Loads daily history for a list of tickers into the run's state
pub struct FetchPortfolioTool {
    source: Arc<dyn MarketDataSource>,
    config: Arc<AnalysisConfig>,
}

#[derive(Debug, Deserialize)]
struct FetchParams {
    tickers: TickerList,
    #[serde(default)]
    period: Option<String>,
}

impl FetchPortfolioTool {
    pub fn new(source: Arc<dyn MarketDataSource>, config: Arc<AnalysisConfig>) -> Self {
        Self { source, config }
    }
}

#[async_trait]
impl Tool for FetchPortfolioTool {
    async fn execute(&self, params: Value, state: &mut AnalysisState) -> Result<String> {
        let params: FetchParams = serde_json::from_value(params)?;

        let tickers = params.tickers.parse()?;
        if tickers.is_empty() {
            return Err(Error::InvalidParameters("no tickers given".into()));
        }
        let period = match params.period.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p.parse::<LookbackPeriod>()?,
            _ => self.config.default_period,
        };

        let report = fetch_portfolio(self.source.as_ref(), &tickers, period, state).await;
        Ok(report.to_string())
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Fetch daily price history for a comma-separated list of stock tickers. \
         Must run before any other analysis."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "tickers": schema::string("Comma-separated ticker symbols, e.g. \"AAPL, MSFT\""),
                "period": schema::string(
                    "Lookback period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max (default 2y)"
                ),
            }),
            &["tickers"],
        )
    }
}
