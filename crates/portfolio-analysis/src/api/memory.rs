//! In-memory market data for tests

use super::MarketDataSource;
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use portfolio_core::{LookbackPeriod, PriceBar, Ticker};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned series; unknown symbols yield an empty history
#[derive(Debug, Default)]
pub struct StaticMarketData {
    series: HashMap<String, Vec<PriceBar>>,
    failures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bars` for `symbol`
    pub fn with_series(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.series.insert(symbol.to_uppercase(), bars);
        self
    }

    /// Fail every request for `symbol` with `message`
    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.failures
            .insert(symbol.to_uppercase(), message.to_string());
        self
    }

    /// Number of history requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn daily_history(
        &self,
        ticker: &Ticker,
        _period: LookbackPeriod,
    ) -> Result<Vec<PriceBar>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failures.get(ticker.as_str()) {
            return Err(AnalysisError::YahooFinanceError(message.clone()));
        }
        Ok(self.series.get(ticker.as_str()).cloned().unwrap_or_default())
    }
}

/// `n` weekday bars starting at `start`, closing at `close(i)`
pub fn weekday_bars(start: NaiveDate, n: usize, close: impl Fn(usize) -> f64) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(n);
    let mut date = start;
    while bars.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let c = close(bars.len());
            bars.push(PriceBar {
                date,
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000,
            });
        }
        date += Duration::days(1);
    }
    bars
}

/// `n` consecutive calendar-day bars starting at `start`
pub fn daily_bars(start: NaiveDate, n: usize, close: impl Fn(usize) -> f64) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let c = close(i);
            PriceBar {
                date: start + Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_bars_skip_weekends() {
        // 2024-01-05 is a Friday
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let bars = weekday_bars(start, 3, |i| 100.0 + i as f64);
        let days: Vec<u32> = bars.iter().map(|b| b.date.day()).collect();
        assert_eq!(days, vec![5, 8, 9]);
        assert_eq!(bars[2].close, 102.0);
    }

    #[tokio::test]
    async fn test_static_source() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let source = StaticMarketData::new()
            .with_series("aaa", daily_bars(start, 5, |_| 1.0))
            .with_failure("bad", "boom");

        let aaa = Ticker::new("AAA").unwrap();
        let bad = Ticker::new("BAD").unwrap();
        let none = Ticker::new("NONE").unwrap();

        assert_eq!(source.daily_history(&aaa, LookbackPeriod::OneYear).await.unwrap().len(), 5);
        assert!(source.daily_history(&bad, LookbackPeriod::OneYear).await.is_err());
        assert!(source.daily_history(&none, LookbackPeriod::OneYear).await.unwrap().is_empty());
        assert_eq!(source.calls(), 3);
    }
}
