//! Yahoo Finance API client

use super::MarketDataSource;
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portfolio_core::{LookbackPeriod, PriceBar, Ticker};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| AnalysisError::YahooFinanceError(e.to_string()))?;
        Ok(Self { connector })
    }

    /// Get daily bars between two instants
    pub async fn get_historical_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            AnalysisError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| AnalysisError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| AnalysisError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| AnalysisError::YahooFinanceError(e.to_string()))?;

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let date = i64::try_from(q.timestamp)
                    .ok()
                    .and_then(|ts| DateTime::from_timestamp(ts, 0))?
                    .date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();

        debug!(symbol, bars = bars.len(), "Fetched Yahoo history");
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    #[instrument(skip(self), fields(ticker = %ticker, period = %period))]
    async fn daily_history(
        &self,
        ticker: &Ticker,
        period: LookbackPeriod,
    ) -> Result<Vec<PriceBar>> {
        let end = Utc::now();
        let start = period.start_from(end);
        self.get_historical_bars(ticker.as_str(), start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_history() {
        let client = YahooFinanceClient::new().unwrap();
        let ticker = Ticker::new("AAPL").unwrap();
        let bars = client
            .daily_history(&ticker, LookbackPeriod::OneMonth)
            .await
            .unwrap();

        assert!(!bars.is_empty());
        assert!(bars.iter().all(|b| b.close > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_is_an_error_or_empty() {
        let client = YahooFinanceClient::new().unwrap();
        let ticker = Ticker::new("INVALID_SYMBOL_12345").unwrap();
        let result = client.daily_history(&ticker, LookbackPeriod::OneMonth).await;
        assert!(result.map(|bars| bars.is_empty()).unwrap_or(true));
    }
}
