//! Step outcomes: tagged errors and the per-step log

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong in a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepErrorKind {
    /// Bad argument such as an unknown period or a zero horizon
    InvalidInput,
    /// A precondition on the analysis state does not hold
    MissingData,
    /// The benchmark series could not be fetched
    BenchmarkUnavailable,
    /// Risk analysis ran but produced nothing
    NoMetrics,
    /// Forecast model could not be fitted
    Model,
    /// Chart artifact could not be written
    Chart,
}

/// A step failure carrying the text shown to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StepError {
    pub kind: StepErrorKind,
    pub message: String,
}

impl StepError {
    pub fn new(kind: StepErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::new(StepErrorKind::MissingData, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StepErrorKind::InvalidInput, message)
    }

    /// Model and chart failures abort scripted runs; the rest are recorded and skipped
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, StepErrorKind::Model | StepErrorKind::Chart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed,
}

/// One entry of the step log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub status: StepStatus,
    pub result: String,
}

impl StepRecord {
    pub fn succeeded(step: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Succeeded,
            result: result.into(),
        }
    }

    pub fn failed(step: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Failed,
            result: result.into(),
        }
    }

    /// Record the outcome of a step that produced text or a step error
    pub fn from_outcome(step: impl Into<String>, outcome: &Result<String, StepError>) -> Self {
        match outcome {
            Ok(text) => Self::succeeded(step, text.clone()),
            Err(err) => Self::failed(step, err.message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(StepError::new(StepErrorKind::Model, "x").is_fatal());
        assert!(StepError::new(StepErrorKind::Chart, "x").is_fatal());
        assert!(!StepError::missing_data("x").is_fatal());
        assert!(!StepError::new(StepErrorKind::BenchmarkUnavailable, "x").is_fatal());
    }

    #[test]
    fn test_record_from_outcome() {
        let ok: Result<String, StepError> = Ok("✅ AAA: 3 data points".into());
        let err: Result<String, StepError> =
            Err(StepError::missing_data("❌ Run risk analysis first."));

        let a = StepRecord::from_outcome("Fetching Data", &ok);
        assert_eq!(a.status, StepStatus::Succeeded);
        assert_eq!(a.result, "✅ AAA: 3 data points");

        let b = StepRecord::from_outcome("Portfolio Ranking", &err);
        assert_eq!(b.status, StepStatus::Failed);
        assert_eq!(b.result, "❌ Run risk analysis first.");
    }
}
