//! Configuration for the analysis steps

use crate::error::{AnalysisError, Result};
use crate::steps::MAX_FORECAST_DAYS;
use portfolio_core::LookbackPeriod;
use portfolio_utils::AppConfig;
use std::path::PathBuf;

/// Benchmark used for beta
pub const BENCHMARK_SYMBOL: &str = "SPY";

/// Configuration for analysis operations
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Lookback used when a fetch does not name one
    pub default_period: LookbackPeriod,

    /// Horizon used when a forecast does not name one
    pub default_forecast_days: u32,

    /// Where forecast charts are written
    pub chart_dir: PathBuf,

    /// Whether the sentiment step does anything
    pub enable_sentiment: bool,

    /// Benchmark symbol for beta
    pub benchmark: String,

    /// Lookback for the benchmark series
    pub benchmark_period: LookbackPeriod,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_period: LookbackPeriod::TwoYears,
            default_forecast_days: 60,
            chart_dir: PathBuf::from("assets"),
            enable_sentiment: true,
            benchmark: BENCHMARK_SYMBOL.to_string(),
            benchmark_period: LookbackPeriod::TwoYears,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Derive the analysis settings from the application configuration
    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        Self::builder()
            .default_period(app.default_period.parse()?)
            .default_forecast_days(app.default_forecast_days)
            .chart_dir(app.assets_dir.clone())
            .enable_sentiment(app.enable_sentiment)
            .build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FORECAST_DAYS).contains(&self.default_forecast_days) {
            return Err(AnalysisError::ConfigError(format!(
                "default_forecast_days must be between 1 and {MAX_FORECAST_DAYS}"
            )));
        }
        if self.benchmark.trim().is_empty() {
            return Err(AnalysisError::ConfigError(
                "benchmark symbol must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    default_period: Option<LookbackPeriod>,
    default_forecast_days: Option<u32>,
    chart_dir: Option<PathBuf>,
    enable_sentiment: Option<bool>,
    benchmark: Option<String>,
    benchmark_period: Option<LookbackPeriod>,
}

impl AnalysisConfigBuilder {
    pub fn default_period(mut self, period: LookbackPeriod) -> Self {
        self.default_period = Some(period);
        self
    }

    pub fn default_forecast_days(mut self, days: u32) -> Self {
        self.default_forecast_days = Some(days);
        self
    }

    pub fn chart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(dir.into());
        self
    }

    pub fn enable_sentiment(mut self, enabled: bool) -> Self {
        self.enable_sentiment = Some(enabled);
        self
    }

    pub fn benchmark(mut self, symbol: impl Into<String>) -> Self {
        self.benchmark = Some(symbol.into());
        self
    }

    pub fn benchmark_period(mut self, period: LookbackPeriod) -> Self {
        self.benchmark_period = Some(period);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let config = AnalysisConfig {
            default_period: self.default_period.unwrap_or(defaults.default_period),
            default_forecast_days: self
                .default_forecast_days
                .unwrap_or(defaults.default_forecast_days),
            chart_dir: self.chart_dir.unwrap_or(defaults.chart_dir),
            enable_sentiment: self.enable_sentiment.unwrap_or(defaults.enable_sentiment),
            benchmark: self.benchmark.unwrap_or(defaults.benchmark),
            benchmark_period: self.benchmark_period.unwrap_or(defaults.benchmark_period),
        };

        config.validate()?;
        Ok(config)
    }
}
