//! Core types for portfolio-intelligence
//!
//! This crate defines the data shared by every stage of an analysis run:
//! tickers, price history, the per-run analysis state, step outcomes and the
//! final pipeline result.

pub mod error;
pub mod market;
pub mod period;
pub mod result;
pub mod state;
pub mod step;
pub mod ticker;

pub use error::{Error, Result};
pub use market::{PriceBar, PriceSeries};
pub use period::LookbackPeriod;
pub use result::{ExecutionMode, PipelineResult, SynthesisMode};
pub use state::{AnalysisState, ForecastSummary, RiskMetrics, SentimentLabel, SentimentScore};
pub use step::{StepError, StepErrorKind, StepRecord, StepStatus};
pub use ticker::{Ticker, TickerMap};
