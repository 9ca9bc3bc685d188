//! Application configuration loaded from the environment
//!
//! Every setting has a default, so an empty environment yields a usable
//! configuration for manual runs. LLM-backed modes additionally need
//! `GOOGLE_API_KEY`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_PERIOD: &str = "2y";
pub const DEFAULT_FORECAST_DAYS: u32 = 60;
pub const DEFAULT_MAX_API_CALLS_PER_MINUTE: u32 = 10;
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Values parse but are out of range
    #[error("Configuration error: {0}")]
    Invalid(String),

    /// The assets directory could not be created
    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration structure
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Gemini credential (`GOOGLE_API_KEY`)
    #[serde(skip_serializing)]
    pub google_api_key: Option<String>,
    /// Gemini REST endpoint (`GEMINI_API_BASE`)
    pub gemini_api_base: String,
    /// Model identifier (`LLM_MODEL`)
    pub llm_model: String,
    /// Sampling temperature (`LLM_TEMPERATURE`)
    pub temperature: f32,
    /// News credential (`NEWS_API_KEY`)
    #[serde(skip_serializing)]
    pub news_api_key: Option<String>,
    /// Sentiment step switch (`ENABLE_SENTIMENT`)
    pub enable_sentiment: bool,
    /// Reported by `status`; no code path is gated on it (`ENABLE_LLM_ORCHESTRATION`)
    pub enable_llm_orchestration: bool,
    /// Fetch lookback code (`DEFAULT_PERIOD`)
    pub default_period: String,
    /// Forecast horizon in days (`DEFAULT_FORECAST_DAYS`)
    pub default_forecast_days: u32,
    /// LLM request budget (`MAX_API_CALLS_PER_MINUTE`)
    pub max_api_calls_per_minute: u32,
    /// Chart directory (`ASSETS_DIR`)
    pub assets_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            news_api_key: None,
            enable_sentiment: true,
            enable_llm_orchestration: false,
            default_period: DEFAULT_PERIOD.to_string(),
            default_forecast_days: DEFAULT_FORECAST_DAYS,
            max_api_calls_per_minute: DEFAULT_MAX_API_CALLS_PER_MINUTE,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

/// Load a `.env` file from the working directory if one exists
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to read .env file"),
    }
}

impl AppConfig {
    /// Create a new configuration builder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut config = Self {
            google_api_key: get("GOOGLE_API_KEY"),
            gemini_api_base: get("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base),
            llm_model: get("LLM_MODEL").unwrap_or(defaults.llm_model),
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), defaults.temperature)?,
            news_api_key: get("NEWS_API_KEY"),
            enable_sentiment: get("ENABLE_SENTIMENT")
                .map_or(defaults.enable_sentiment, |v| parse_flag(&v)),
            enable_llm_orchestration: get("ENABLE_LLM_ORCHESTRATION")
                .map_or(defaults.enable_llm_orchestration, |v| parse_flag(&v)),
            default_period: get("DEFAULT_PERIOD").unwrap_or(defaults.default_period),
            default_forecast_days: parse_or(
                "DEFAULT_FORECAST_DAYS",
                get("DEFAULT_FORECAST_DAYS"),
                defaults.default_forecast_days,
            )?,
            max_api_calls_per_minute: parse_or(
                "MAX_API_CALLS_PER_MINUTE",
                get("MAX_API_CALLS_PER_MINUTE"),
                defaults.max_api_calls_per_minute,
            )?,
            assets_dir: get("ASSETS_DIR").map_or(defaults.assets_dir, PathBuf::from),
        };

        config.apply_credential_rules();
        config.validate()?;
        Ok(config)
    }

    /// Sentiment needs a news credential; switch it off when there is none
    fn apply_credential_rules(&mut self) {
        if self.enable_sentiment && self.news_api_key.is_none() {
            warn!("NEWS_API_KEY not set, sentiment analysis disabled");
            self.enable_sentiment = false;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_forecast_days == 0 {
            return Err(ConfigError::Invalid(
                "DEFAULT_FORECAST_DAYS must be at least 1".to_string(),
            ));
        }
        if self.max_api_calls_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "MAX_API_CALLS_PER_MINUTE must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "LLM_TEMPERATURE must be within [0, 2], got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Whether an LLM credential is present
    pub fn has_llm_credentials(&self) -> bool {
        self.google_api_key.is_some()
    }

    /// Create the chart directory if it does not exist
    pub fn ensure_assets_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.assets_dir).map_err(|source| ConfigError::Io {
            path: self.assets_dir.clone(),
            source,
        })?;
        Ok(&self.assets_dir)
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    google_api_key: Option<String>,
    gemini_api_base: Option<String>,
    llm_model: Option<String>,
    temperature: Option<f32>,
    news_api_key: Option<String>,
    enable_sentiment: Option<bool>,
    enable_llm_orchestration: Option<bool>,
    default_period: Option<String>,
    default_forecast_days: Option<u32>,
    max_api_calls_per_minute: Option<u32>,
    assets_dir: Option<PathBuf>,
}

impl AppConfigBuilder {
    pub fn google_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    pub fn gemini_api_base(mut self, base: impl Into<String>) -> Self {
        self.gemini_api_base = Some(base.into());
        self
    }

    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn enable_sentiment(mut self, enabled: bool) -> Self {
        self.enable_sentiment = Some(enabled);
        self
    }

    pub fn enable_llm_orchestration(mut self, enabled: bool) -> Self {
        self.enable_llm_orchestration = Some(enabled);
        self
    }

    pub fn default_period(mut self, period: impl Into<String>) -> Self {
        self.default_period = Some(period.into());
        self
    }

    pub fn default_forecast_days(mut self, days: u32) -> Self {
        self.default_forecast_days = Some(days);
        self
    }

    pub fn max_api_calls_per_minute(mut self, calls: u32) -> Self {
        self.max_api_calls_per_minute = Some(calls);
        self
    }

    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    ///
    /// Unlike `from_env`, an explicit `enable_sentiment(true)` is honored even
    /// without a news credential.
    pub fn build(self) -> Result<AppConfig> {
        let defaults = AppConfig::default();

        let config = AppConfig {
            google_api_key: self.google_api_key,
            gemini_api_base: self.gemini_api_base.unwrap_or(defaults.gemini_api_base),
            llm_model: self.llm_model.unwrap_or(defaults.llm_model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            news_api_key: self.news_api_key,
            enable_sentiment: self.enable_sentiment.unwrap_or(defaults.enable_sentiment),
            enable_llm_orchestration: self
                .enable_llm_orchestration
                .unwrap_or(defaults.enable_llm_orchestration),
            default_period: self.default_period.unwrap_or(defaults.default_period),
            default_forecast_days: self
                .default_forecast_days
                .unwrap_or(defaults.default_forecast_days),
            max_api_calls_per_minute: self
                .max_api_calls_per_minute
                .unwrap_or(defaults.max_api_calls_per_minute),
            assets_dir: self.assets_dir.unwrap_or(defaults.assets_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_env() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.llm_model, "gemini-2.5-flash");
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.default_period, "2y");
        assert_eq!(config.default_forecast_days, 60);
        assert_eq!(config.max_api_calls_per_minute, 10);
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert!(!config.enable_llm_orchestration);
        assert!(!config.has_llm_credentials());
    }

    #[test]
    fn test_sentiment_disabled_without_news_key() {
        let config = AppConfig::from_lookup(lookup(&[("ENABLE_SENTIMENT", "true")])).unwrap();
        assert!(!config.enable_sentiment);

        let config = AppConfig::from_lookup(lookup(&[("NEWS_API_KEY", "abc")])).unwrap();
        assert!(config.enable_sentiment);

        let config = AppConfig::from_lookup(lookup(&[
            ("NEWS_API_KEY", "abc"),
            ("ENABLE_SENTIMENT", "no"),
        ]))
        .unwrap();
        assert!(!config.enable_sentiment);
    }

    #[test]
    fn test_flags_and_numbers() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("ENABLE_LLM_ORCHESTRATION", "TRUE"),
            ("DEFAULT_FORECAST_DAYS", " 90 "),
            ("MAX_API_CALLS_PER_MINUTE", "30"),
            ("LLM_TEMPERATURE", "0.7"),
            ("ASSETS_DIR", "charts"),
        ]))
        .unwrap();

        assert_eq!(config.google_api_key.as_deref(), Some("g-key"));
        assert!(config.enable_llm_orchestration);
        assert_eq!(config.default_forecast_days, 90);
        assert_eq!(config.max_api_calls_per_minute, 30);
        assert_eq!(config.assets_dir, PathBuf::from("charts"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).unwrap();
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err =
            AppConfig::from_lookup(lookup(&[("DEFAULT_FORECAST_DAYS", "sixty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DEFAULT_FORECAST_DAYS", .. }));

        let err = AppConfig::from_lookup(lookup(&[("DEFAULT_FORECAST_DAYS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        assert!(AppConfig::builder().temperature(3.5).build().is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::builder()
            .llm_model("gemini-2.0-flash")
            .enable_sentiment(true)
            .default_forecast_days(30)
            .build()
            .unwrap();

        assert_eq!(config.llm_model, "gemini-2.0-flash");
        assert!(config.enable_sentiment);
        assert_eq!(config.default_forecast_days, 30);
    }

    #[test]
    fn test_ensure_assets_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("assets");
        let config = AppConfig::builder().assets_dir(&dir).build().unwrap();

        config.ensure_assets_dir().unwrap();
        assert!(dir.is_dir());
    }
}
