//! Risk metrics step
//!
//! Sharpe, beta, historical VaR and volatility from daily simple returns,
//! with beta measured against a benchmark fetched once per call.

use crate::api::MarketDataSource;
use crate::config::AnalysisConfig;
use portfolio_core::{
    AnalysisState, PriceSeries, RiskMetrics, StepError, StepErrorKind, Ticker,
};
use statrs::statistics::Statistics;
use std::fmt;
use tracing::{debug, info, warn};

pub const TRADING_DAYS: f64 = 252.0;
pub const RISK_FREE_RATE: f64 = 0.02;
/// Fewer daily returns than this are not analyzed
pub const MIN_RETURNS: usize = 30;

pub const NO_PORTFOLIO: &str = "❌ Error: No portfolio data loaded. Fetch data first.";
pub const NO_METRICS: &str = "❌ No metrics calculated";

/// Result for one ticker
#[derive(Debug, Clone, PartialEq)]
pub enum RiskEntry {
    Computed { ticker: Ticker, metrics: RiskMetrics },
    InsufficientData { ticker: Ticker },
}

impl fmt::Display for RiskEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed { ticker, metrics } => write!(
                f,
                "📊 {ticker}:\n   • Sharpe Ratio: {:.2}\n   • Beta: {:.2}\n   • VaR (95%): {:.2}%\n   • Volatility: {:.2}%",
                metrics.sharpe,
                metrics.beta,
                metrics.var_95 * 100.0,
                metrics.volatility * 100.0,
            ),
            Self::InsufficientData { ticker } => write!(f, "⚠️  {ticker}: Insufficient data"),
        }
    }
}

/// Entries in request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskReport {
    pub entries: Vec<RiskEntry>,
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Annualized Sharpe ratio; 0 when returns have no spread
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let daily_rf = RISK_FREE_RATE / TRADING_DAYS;
    let std = returns.std_dev();
    if !std.is_finite() || std == 0.0 {
        return 0.0;
    }
    let excess_mean = returns.mean() - daily_rf;
    TRADING_DAYS.sqrt() * excess_mean / std
}

/// Beta over the most recent overlapping returns; 1.0 without usable overlap
pub fn beta(returns: &[f64], benchmark: &[f64]) -> f64 {
    let n = returns.len().min(benchmark.len());
    if n < 2 {
        return 1.0;
    }
    let stock = &returns[returns.len() - n..];
    let bench = &benchmark[benchmark.len() - n..];

    let variance = bench.variance();
    if !variance.is_finite() || variance <= 0.0 {
        return 1.0;
    }
    stock.covariance(bench) / variance
}

/// Percentile with linear interpolation between closest ranks
///
/// `q` is in `[0, 100]`. Returns NaN for empty input.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// All four metrics for one return series
pub fn compute_metrics(returns: &[f64], benchmark: &[f64]) -> RiskMetrics {
    let std = returns.std_dev();
    RiskMetrics {
        sharpe: sharpe_ratio(returns),
        beta: beta(returns, benchmark),
        var_95: percentile(returns, 5.0),
        volatility: if std.is_finite() {
            std * TRADING_DAYS.sqrt()
        } else {
            0.0
        },
    }
}

async fn benchmark_returns(
    source: &dyn MarketDataSource,
    config: &AnalysisConfig,
) -> Result<Vec<f64>, StepError> {
    let unavailable = || {
        StepError::new(
            StepErrorKind::BenchmarkUnavailable,
            format!(
                "❌ Error: Could not fetch market benchmark ({})",
                config.benchmark
            ),
        )
    };

    let ticker = Ticker::new(&config.benchmark).map_err(|_| unavailable())?;
    let bars = source
        .daily_history(&ticker, config.benchmark_period)
        .await
        .map_err(|e| {
            warn!(benchmark = %ticker, error = %e, "Benchmark fetch failed");
            unavailable()
        })?;

    let series = PriceSeries::new(bars);
    if series.is_empty() {
        return Err(unavailable());
    }
    Ok(series.daily_returns())
}

/// Compute risk metrics for `tickers` (every loaded ticker when `None`)
///
/// Unloaded tickers are skipped. Metrics are stored in
/// `state.risk_metrics`.
pub async fn calculate_risk(
    source: &dyn MarketDataSource,
    config: &AnalysisConfig,
    state: &mut AnalysisState,
    tickers: Option<&[Ticker]>,
) -> Result<RiskReport, StepError> {
    if state.portfolio.is_empty() {
        return Err(StepError::missing_data(NO_PORTFOLIO));
    }

    let bench = benchmark_returns(source, config).await?;
    debug!(benchmark_returns = bench.len(), "Benchmark loaded");

    let targets: Vec<Ticker> = match tickers {
        Some(list) => list.to_vec(),
        None => state.loaded_tickers(),
    };

    let mut report = RiskReport::default();
    for ticker in targets {
        let Some(series) = state.series(&ticker) else {
            debug!(ticker = %ticker, "Skipping ticker without data");
            continue;
        };

        let returns = series.daily_returns();
        if returns.len() < MIN_RETURNS {
            report.entries.push(RiskEntry::InsufficientData { ticker });
            continue;
        }

        let metrics = compute_metrics(&returns, &bench);
        info!(
            ticker = %ticker,
            sharpe = metrics.sharpe,
            beta = metrics.beta,
            "Risk metrics computed"
        );
        state.risk_metrics.insert(ticker.clone(), metrics);
        report.entries.push(RiskEntry::Computed { ticker, metrics });
    }

    if report.entries.is_empty() {
        return Err(StepError::new(StepErrorKind::NoMetrics, NO_METRICS));
    }
    Ok(report)
}
