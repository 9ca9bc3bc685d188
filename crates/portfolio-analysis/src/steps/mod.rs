//! Analysis steps
//!
//! Each step reads and extends an [`AnalysisState`](portfolio_core::AnalysisState)
//! and reports a user-facing text. Failures carry a tagged
//! [`StepError`](portfolio_core::StepError) so callers can decide whether to
//! continue.

pub mod fetch;
pub mod forecast;
pub mod ranking;
pub mod risk;
pub mod sentiment;

pub use fetch::{FetchOutcome, FetchReport, fetch_portfolio};
pub use forecast::{
    ForecastOutcome, MAX_FORECAST_DAYS, chart_path, clear_artifacts, forecast_ticker,
};
pub use ranking::{Ranking, rank_portfolio};
pub use risk::{RiskEntry, RiskReport, calculate_risk};
pub use sentiment::{SentimentOutcome, analyze_sentiment};
