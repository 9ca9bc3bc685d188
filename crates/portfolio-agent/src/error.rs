//! Error types for pipeline runs

use portfolio_core::StepError;
use portfolio_llm::LLMError;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Reasons a manual or hybrid run stops without a result
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A fatal step failure (model fit or chart output)
    #[error(transparent)]
    Step(#[from] StepError),

    /// The summarization request failed
    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    /// A prompt template failed to render
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The pipeline is missing something it needs
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<minijinja::Error> for PipelineError {
    fn from(err: minijinja::Error) -> Self {
        PipelineError::Prompt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::StepErrorKind;

    #[test]
    fn test_display() {
        let err: PipelineError = StepError::new(StepErrorKind::Chart, "❌ disk full").into();
        assert_eq!(err.to_string(), "❌ disk full");

        let err: PipelineError = LLMError::AuthenticationFailed.into();
        assert!(err.to_string().starts_with("LLM error: "));
    }
}
