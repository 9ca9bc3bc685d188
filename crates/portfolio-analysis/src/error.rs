//! Error types for market data and analysis operations

use thiserror::Error;

/// Analysis specific errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Forecast model could not be fitted
    #[error("Model error: {0}")]
    ModelError(String),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    ChartError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core error (bad ticker, bad period)
    #[error(transparent)]
    Core(#[from] portfolio_core::Error),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<portfolio_utils::ConfigError> for AnalysisError {
    fn from(err: portfolio_utils::ConfigError) -> Self {
        AnalysisError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::DataUnavailable {
            symbol: "ZZZZ".to_string(),
            reason: "no quotes".to_string(),
        };
        assert_eq!(err.to_string(), "Data not available for ZZZZ: no quotes");

        let err: AnalysisError = portfolio_core::Error::InvalidPeriod("3w".into()).into();
        assert_eq!(err.to_string(), "Invalid period: \"3w\"");
    }
}
