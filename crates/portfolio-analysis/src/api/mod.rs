//! Market data sources

use crate::error::Result;
use async_trait::async_trait;
use portfolio_core::{LookbackPeriod, PriceBar, Ticker};

pub mod yahoo;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

#[cfg(any(test, feature = "test-util"))]
pub use memory::StaticMarketData;
pub use yahoo::YahooFinanceClient;

/// A provider of daily price history
///
/// Implementations return bars in any order; callers normalize them through
/// `PriceSeries::new`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars for `ticker` covering `period` up to now
    async fn daily_history(&self, ticker: &Ticker, period: LookbackPeriod)
    -> Result<Vec<PriceBar>>;
}
