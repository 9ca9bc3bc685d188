//! Per-run analysis state shared by every step
//!
//! An `AnalysisState` is created empty at the start of each run and handed to
//! the steps by mutable reference. Steps only add entries for tickers that are
//! present in `portfolio`, so every key of the derived maps is a loaded ticker.

use crate::{PriceSeries, Ticker, TickerMap};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk figures for one ticker, all computed from daily simple returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized Sharpe ratio
    pub sharpe: f64,
    /// Beta against the benchmark
    pub beta: f64,
    /// 5th percentile of daily returns (a fraction, usually negative)
    pub var_95: f64,
    /// Annualized volatility (a fraction)
    pub volatility: f64,
}

/// Blended forecast outcome for one ticker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Last observed close
    pub current: f64,
    /// Blended value at the end of the horizon
    pub predicted: f64,
    /// `(predicted - current) / current * 100`
    pub change_pct: f64,
    pub horizon_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// `Positive` iff the score is strictly above zero
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Score in `[-1, 1]`
    pub score: f64,
    pub label: SentimentLabel,
}

/// Everything learned about the portfolio during one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisState {
    pub portfolio: TickerMap<PriceSeries>,
    pub risk_metrics: TickerMap<RiskMetrics>,
    pub forecasts: TickerMap<ForecastSummary>,
    pub sentiment: TickerMap<SentimentScore>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether price history is loaded for `ticker`
    pub fn is_loaded(&self, ticker: &Ticker) -> bool {
        self.portfolio.contains_key(ticker)
    }

    /// Price history for `ticker`, if loaded
    pub fn series(&self, ticker: &Ticker) -> Option<&PriceSeries> {
        self.portfolio.get(ticker)
    }

    /// Loaded tickers in fetch order
    pub fn loaded_tickers(&self) -> Vec<Ticker> {
        self.portfolio.keys().cloned().collect()
    }
}
