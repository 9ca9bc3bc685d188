//! Ensemble forecast step
//!
//! Blends a seasonal regression with a linear trend, stores the summary and
//! writes a chart per ticker.

pub mod chart;
pub mod linear;
pub mod seasonal;

pub use chart::render_forecast_chart;
pub use linear::LinearTrend;
pub use seasonal::{SeasonalConfig, SeasonalModel, Seasonality};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use chrono::{Duration, NaiveDate};
use portfolio_core::{AnalysisState, ForecastSummary, StepError, StepErrorKind, Ticker};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SEASONAL_WEIGHT: f64 = 0.7;
pub const LINEAR_WEIGHT: f64 = 0.3;

/// Longest accepted horizon, in calendar days
pub const MAX_FORECAST_DAYS: u32 = 3650;

const CHART_SUFFIX: &str = "_forecast.svg";

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub ticker: Ticker,
    pub summary: ForecastSummary,
    pub chart_path: PathBuf,
}

impl fmt::Display for ForecastOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "📈 {}: ${:.2} -> ${:.2} ({:+.2}%)",
            self.ticker, self.summary.current, self.summary.predicted, self.summary.change_pct
        )
    }
}

/// Where the chart for `ticker` is written
pub fn chart_path(dir: &Path, ticker: &Ticker) -> PathBuf {
    dir.join(format!("{ticker}{CHART_SUFFIX}"))
}

/// Remove previously generated charts from `dir`, returning how many went
pub fn clear_artifacts(dir: &Path) -> std::io::Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_chart = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(CHART_SUFFIX));
        if is_chart && path.is_file() {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    debug!(dir = %dir.display(), removed, "Cleared forecast charts");
    Ok(removed)
}

/// Calendar days `last + 1 ..= last + days`, `None` past the last representable date
pub fn horizon_dates(last: NaiveDate, days: u32) -> Option<Vec<NaiveDate>> {
    (1..=i64::from(days))
        .map(|d| last.checked_add_signed(Duration::days(d)))
        .collect()
}

/// Elementwise weighted blend of the two model outputs
pub fn blend(seasonal: &[f64], linear: &[f64]) -> Vec<f64> {
    seasonal
        .iter()
        .zip(linear)
        .map(|(s, l)| SEASONAL_WEIGHT * s + LINEAR_WEIGHT * l)
        .collect()
}

fn horizon_error(ticker: &Ticker) -> StepError {
    StepError::invalid_input(format!(
        "❌ Error: forecast horizon for {ticker} must be between 1 and {MAX_FORECAST_DAYS} days"
    ))
}

fn model_error(ticker: &Ticker, err: &AnalysisError) -> StepError {
    StepError::new(
        StepErrorKind::Model,
        format!("❌ Forecast failed for {ticker}: {err}"),
    )
}

/// Forecast `ticker` over `days` calendar days (config default when `None`)
///
/// Stores the summary in `state.forecasts` and overwrites the ticker's chart.
pub fn forecast_ticker(
    config: &AnalysisConfig,
    state: &mut AnalysisState,
    ticker: &Ticker,
    days: Option<u32>,
) -> Result<ForecastOutcome, StepError> {
    let series = state
        .series(ticker)
        .ok_or_else(|| StepError::missing_data(format!("❌ Error: {ticker} not loaded.")))?;

    let days = days.unwrap_or(config.default_forecast_days);
    if !(1..=MAX_FORECAST_DAYS).contains(&days) {
        return Err(horizon_error(ticker));
    }

    let dates = series.dates();
    let closes = series.closes();
    let (Some(last_date), Some(current)) = (series.last_date(), series.last_close()) else {
        return Err(StepError::missing_data(format!("❌ Error: {ticker} not loaded.")));
    };

    let seasonal = SeasonalModel::fit(&dates, &closes).map_err(|e| model_error(ticker, &e))?;
    let linear = LinearTrend::fit(&dates, &closes).map_err(|e| model_error(ticker, &e))?;

    let future = horizon_dates(last_date, days).ok_or_else(|| horizon_error(ticker))?;
    let blended = blend(&seasonal.predict(&future), &linear.predict(&future));
    let predicted = blended.last().copied().unwrap_or(current);
    if !predicted.is_finite() {
        return Err(model_error(
            ticker,
            &AnalysisError::ModelError("non-finite prediction".into()),
        ));
    }

    let path = chart_path(&config.chart_dir, ticker);
    let history: Vec<(NaiveDate, f64)> = dates.into_iter().zip(closes).collect();
    let projection: Vec<(NaiveDate, f64)> = future.into_iter().zip(blended).collect();
    render_forecast_chart(
        &path,
        &format!("{ticker} - {days} Day Forecast"),
        &history,
        &projection,
    )
    .map_err(|e| {
        StepError::new(
            StepErrorKind::Chart,
            format!("❌ Could not write chart for {ticker}: {e}"),
        )
    })?;

    let summary = ForecastSummary {
        current,
        predicted,
        change_pct: (predicted - current) / current * 100.0,
        horizon_days: days,
    };
    info!(
        ticker = %ticker,
        days,
        current,
        predicted,
        chart = %path.display(),
        "Forecast complete"
    );
    state.forecasts.insert(ticker.clone(), summary);

    Ok(ForecastOutcome {
        ticker: ticker.clone(),
        summary,
        chart_path: path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::daily_bars;
    use portfolio_core::PriceSeries;

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn config(dir: &Path) -> AnalysisConfig {
        AnalysisConfig::builder().chart_dir(dir).build().unwrap()
    }

    fn state_with(symbol: &str, n: usize, close: impl Fn(usize) -> f64) -> AnalysisState {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let mut state = AnalysisState::new();
        state
            .portfolio
            .insert(t(symbol), PriceSeries::new(daily_bars(start, n, close)));
        state
    }

    #[test]
    fn test_horizon_and_blend() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let dates = horizon_dates(last, 3).unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());

        let out = blend(&[10.0, 20.0], &[0.0, 10.0]);
        assert!((out[0] - 7.0).abs() < 1e-12);
        assert!((out[1] - 17.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_history_forecast() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut state = state_with("AAA", 300, |i| 100.0 + i as f64);

        let outcome = forecast_ticker(&config, &mut state, &t("AAA"), Some(30)).unwrap();

        assert!((outcome.summary.current - 399.0).abs() < 1e-9);
        // both models recover the line exactly, so the blend does too
        assert!((outcome.summary.predicted - 429.0).abs() < 1e-6);
        assert!(outcome.summary.change_pct > 7.0);
        assert_eq!(outcome.summary.horizon_days, 30);
        assert_eq!(state.forecasts.get(&t("AAA")), Some(&outcome.summary));

        assert_eq!(outcome.chart_path, dir.path().join("AAA_forecast.svg"));
        assert!(outcome.chart_path.is_file());
        assert!(outcome.to_string().starts_with("📈 AAA: $399.00 -> $"));
        assert!(outcome.to_string().contains("(+"));
    }

    #[test]
    fn test_default_horizon_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::builder()
            .chart_dir(dir.path())
            .default_forecast_days(5)
            .build()
            .unwrap();
        let mut state = state_with("AAA", 60, |i| 50.0 - 0.1 * i as f64);

        let outcome = forecast_ticker(&config, &mut state, &t("AAA"), None).unwrap();
        assert_eq!(outcome.summary.horizon_days, 5);
        assert!(outcome.summary.change_pct < 0.0);
    }

    #[test]
    fn test_preconditions() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut state = state_with("AAA", 60, |i| 10.0 + i as f64);

        let err = forecast_ticker(&config, &mut state, &t("ZZZ"), Some(10)).unwrap_err();
        assert_eq!(err.kind, StepErrorKind::MissingData);
        assert_eq!(err.message, "❌ Error: ZZZ not loaded.");

        let err = forecast_ticker(&config, &mut state, &t("AAA"), Some(0)).unwrap_err();
        assert_eq!(err.kind, StepErrorKind::InvalidInput);
        assert!(state.forecasts.is_empty());
    }

    #[test]
    fn test_horizon_upper_bound() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut state = state_with("AAA", 60, |i| 10.0 + i as f64);

        for days in [MAX_FORECAST_DAYS + 1, 100_000_000, u32::MAX] {
            let err = forecast_ticker(&config, &mut state, &t("AAA"), Some(days)).unwrap_err();
            assert_eq!(err.kind, StepErrorKind::InvalidInput);
            assert!(!err.is_fatal());
        }
        assert!(state.forecasts.is_empty());

        let outcome = forecast_ticker(&config, &mut state, &t("AAA"), Some(MAX_FORECAST_DAYS));
        assert_eq!(outcome.unwrap().summary.horizon_days, MAX_FORECAST_DAYS);
    }

    #[test]
    fn test_horizon_dates_overflow() {
        assert_eq!(horizon_dates(NaiveDate::MAX, 1), None);
        let near_end = NaiveDate::MAX.pred_opt().unwrap();
        assert_eq!(horizon_dates(near_end, 1), Some(vec![NaiveDate::MAX]));
    }

    #[test]
    fn test_single_observation_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut state = state_with("ONE", 1, |_| 10.0);

        let err = forecast_ticker(&config, &mut state, &t("ONE"), Some(10)).unwrap_err();
        assert_eq!(err.kind, StepErrorKind::Model);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_clear_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("AAA_forecast.svg"), "<svg/>").unwrap();
        std::fs::write(dir.path().join("BBB_forecast.svg"), "<svg/>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(clear_artifacts(dir.path()).unwrap(), 2);
        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(clear_artifacts(&dir.path().join("missing")).unwrap(), 0);
    }
}
