//! Portfolio analysis steps and the tools that expose them
//!
//! This crate provides:
//!
//! - Market data access (Yahoo Finance, plus an in-memory source for tests)
//! - Risk metrics: Sharpe ratio, beta against SPY, 95% VaR, volatility
//! - An ensemble forecast blending a seasonal regression with a linear trend
//! - Mock news sentiment
//! - A portfolio ranking combining risk-adjusted return and forecast change
//!
//! Steps operate on a shared [`AnalysisState`](portfolio_core::AnalysisState)
//! and can be driven directly by a scripted pipeline or through the
//! [`tools`] module by an LLM.
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_analysis::{AnalysisConfig, YahooFinanceClient, steps};
//! use portfolio_core::{AnalysisState, LookbackPeriod, Ticker};
//!
//! let source = YahooFinanceClient::new()?;
//! let config = AnalysisConfig::default();
//! let mut state = AnalysisState::new();
//!
//! let tickers = Ticker::parse_list("AAPL, MSFT")?;
//! let report = steps::fetch_portfolio(&source, &tickers, LookbackPeriod::TwoYears, &mut state).await;
//! println!("{report}");
//!
//! let risk = steps::calculate_risk(&source, &config, &mut state, None).await?;
//! println!("{risk}");
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod steps;
pub mod tools;

pub use api::{MarketDataSource, YahooFinanceClient};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, BENCHMARK_SYMBOL};
pub use error::{AnalysisError, Result};
pub use tools::{analysis_registry, analysis_tools};

#[cfg(any(test, feature = "test-util"))]
pub use api::StaticMarketData;
