//! Pipeline orchestration for portfolio analysis
//!
//! Three execution modes share the same analysis steps:
//!
//! - **Manual**: a fixed sequence (fetch, risk, forecast, sentiment, ranking)
//!   with no model call; the ranking is the final answer
//! - **Hybrid**: the manual sequence followed by one LLM request that turns
//!   the step log into an executive summary
//! - **Autonomous**: the LLM sequences the analysis tools itself inside a
//!   bounded loop
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_agent::Pipeline;
//! use portfolio_analysis::YahooFinanceClient;
//! use portfolio_core::{ExecutionMode, Ticker};
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::builder()
//!     .source(Arc::new(YahooFinanceClient::new()?))
//!     .provider(provider)
//!     .rate_limit(30)
//!     .build()?;
//!
//! let tickers = Ticker::parse_list("AAPL, MSFT")?;
//! let result = pipeline.run(ExecutionMode::Hybrid, &tickers, 30, true).await?;
//! println!("{}", result.final_response);
//! ```

pub mod autonomous;
pub mod error;
pub mod limiter;
pub mod pipeline;
pub mod prompts;

pub use autonomous::{AutonomousLoop, LoopSettings, LoopState, MAX_ROUNDS};
pub use error::{PipelineError, Result};
pub use limiter::RateLimitedProvider;
pub use pipeline::{DEFAULT_MODEL, Pipeline, PipelineBuilder};
