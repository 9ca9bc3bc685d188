//! Data fetch step
//!
//! Each ticker is fetched on its own; one failing symbol never stops the
//! others.

use crate::api::MarketDataSource;
use portfolio_core::{AnalysisState, LookbackPeriod, PriceSeries, Ticker};
use std::fmt;
use tracing::{info, warn};

/// Longest error excerpt shown per ticker
const ERROR_EXCERPT_CHARS: usize = 50;

/// What happened to one ticker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { ticker: Ticker, points: usize },
    Empty { ticker: Ticker },
    Failed { ticker: Ticker, error: String },
}

impl FetchOutcome {
    pub fn ticker(&self) -> &Ticker {
        match self {
            Self::Loaded { ticker, .. } | Self::Empty { ticker } | Self::Failed { ticker, .. } => {
                ticker
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { ticker, points } => write!(f, "✅ {ticker}: {points} data points"),
            Self::Empty { ticker } => write!(f, "❌ {ticker}: No data available"),
            Self::Failed { ticker, error } => write!(f, "❌ {ticker}: {error}"),
        }
    }
}

/// One outcome per requested ticker, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    /// Number of tickers that loaded
    pub fn loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_loaded()).count()
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

fn excerpt(message: &str) -> String {
    message.chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// Fetch daily history for every ticker into `state.portfolio`
///
/// Yields one outcome per entry of `tickers`, duplicates included. A ticker
/// fetched again replaces its earlier series.
pub async fn fetch_portfolio(
    source: &dyn MarketDataSource,
    tickers: &[Ticker],
    period: LookbackPeriod,
    state: &mut AnalysisState,
) -> FetchReport {
    let mut report = FetchReport::default();

    for ticker in tickers {
        let outcome = match source.daily_history(ticker, period).await {
            Ok(bars) => {
                let series = PriceSeries::new(bars);
                if series.is_empty() {
                    warn!(ticker = %ticker, "No data available");
                    FetchOutcome::Empty {
                        ticker: ticker.clone(),
                    }
                } else {
                    let points = series.len();
                    info!(ticker = %ticker, points, "Loaded price history");
                    state.portfolio.insert(ticker.clone(), series);
                    FetchOutcome::Loaded {
                        ticker: ticker.clone(),
                        points,
                    }
                }
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Fetch failed");
                FetchOutcome::Failed {
                    ticker: ticker.clone(),
                    error: excerpt(&e.to_string()),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    report
}
