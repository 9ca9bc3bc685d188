//! Tool for ensemble forecasts

use crate::config::AnalysisConfig;
use crate::steps::forecast_ticker;
use async_trait::async_trait;
use portfolio_core::{AnalysisState, Result, Ticker};
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const NAME: &str = "ensemble_forecast";

/// Blended seasonal and linear forecast for one loaded ticker
pub struct EnsembleForecastTool {
    config: Arc<AnalysisConfig>,
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    ticker: String,
    // models sometimes send 30.0 for an integer
    #[serde(default)]
    days: Option<f64>,
}

/// Whole days; anything below one day maps to zero and anything huge saturates,
/// both rejected by the step
fn horizon(days: Option<f64>) -> Option<u32> {
    days.map(|d| {
        if d.is_finite() && d >= 1.0 {
            d.round() as u32
        } else {
            0
        }
    })
}

impl EnsembleForecastTool {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Tool for EnsembleForecastTool {
    async fn execute(&self, params: Value, state: &mut AnalysisState) -> Result<String> {
        let params: ForecastParams = serde_json::from_value(params)?;
        let ticker = Ticker::new(&params.ticker)?;

        let outcome = forecast_ticker(&self.config, state, &ticker, horizon(params.days))?;
        Ok(outcome.to_string())
    }

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Forecast a loaded ticker's price by blending a seasonal trend model (70%) \
         with a linear trend (30%). Also writes a forecast chart."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Ticker symbol to forecast"),
                "days": schema::integer("Forecast horizon in calendar days, 1 to 3650 (default 60)"),
            }),
            &["ticker"],
        )
    }
}
