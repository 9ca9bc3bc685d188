//! LLM-visible tools wrapping the analysis steps

pub mod fetch;
pub mod forecast;
pub mod ranking;
pub mod risk;
pub mod sentiment;

pub use fetch::FetchPortfolioTool;
pub use forecast::EnsembleForecastTool;
pub use ranking::ComparePortfolioTool;
pub use risk::RiskMetricsTool;
pub use sentiment::SentimentTool;

use crate::api::MarketDataSource;
use crate::config::AnalysisConfig;
use portfolio_core::{Result, Ticker};
use portfolio_tools::{Tool, ToolRegistry};
use serde::Deserialize;
use std::sync::Arc;

/// Tickers as a comma-separated string or as a JSON array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TickerList {
    Csv(String),
    List(Vec<String>),
}

impl TickerList {
    pub(crate) fn parse(&self) -> Result<Vec<Ticker>> {
        match self {
            Self::Csv(raw) => Ticker::parse_list(raw),
            Self::List(items) => Ticker::parse_list(&items.join(",")),
        }
    }
}

/// Every analysis tool, sharing one source and config
///
/// `seed` fixes the sentiment draws; `None` seeds from the OS.
pub fn analysis_tools(
    source: Arc<dyn MarketDataSource>,
    config: Arc<AnalysisConfig>,
    seed: Option<u64>,
) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(FetchPortfolioTool::new(source.clone(), config.clone())),
        Arc::new(RiskMetricsTool::new(source, config.clone())),
        Arc::new(EnsembleForecastTool::new(config.clone())),
        Arc::new(SentimentTool::new(config.enable_sentiment, seed)),
        Arc::new(ComparePortfolioTool),
    ]
}

/// Registry holding [`analysis_tools`]
pub fn analysis_registry(
    source: Arc<dyn MarketDataSource>,
    config: Arc<AnalysisConfig>,
    seed: Option<u64>,
) -> ToolRegistry {
    ToolRegistry::builder()
        .register_all(analysis_tools(source, config, seed))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticMarketData;

    #[test]
    fn test_registry_exposes_every_capability() {
        let registry = analysis_registry(
            Arc::new(StaticMarketData::new()),
            Arc::new(AnalysisConfig::default()),
            Some(1),
        );
        assert_eq!(
            registry.names(),
            vec![
                "analyze_sentiment",
                "calculate_risk_metrics",
                "compare_portfolio",
                "ensemble_forecast",
                "fetch_portfolio_data",
            ]
        );
        let defs = registry.definitions();
        assert!(!defs.iter().find(|d| d.name == "compare_portfolio").unwrap().has_parameters());
    }

    #[test]
    fn test_ticker_list_forms() {
        let csv: TickerList = serde_json::from_value(serde_json::json!("aapl, msft")).unwrap();
        let list: TickerList = serde_json::from_value(serde_json::json!(["aapl", "msft"])).unwrap();
        assert_eq!(csv.parse().unwrap(), list.parse().unwrap());
    }
}
