//! Error types for portfolio-core

use crate::step::StepError;
use thiserror::Error;

/// Result type alias for portfolio-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by analysis steps and the tools that wrap them
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Ticker symbol could not be parsed
    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    /// Lookback period is not one of the supported ranges
    #[error("Invalid period: {0:?}")]
    InvalidPeriod(String),

    /// Tool or step parameters could not be decoded
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// An analysis step failed
    #[error(transparent)]
    Step(#[from] StepError),
}

impl Error {
    /// Whether this error should abort a scripted run
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Step(step) => step.is_fatal(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidParameters(err.to_string())
    }
}
