//! The record returned by every pipeline run

use crate::{AnalysisState, StepRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How a run is sequenced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Fixed step sequence, no LLM
    Manual,
    /// Fixed step sequence, then one LLM summary
    #[default]
    Hybrid,
    /// The LLM chooses tool calls in a bounded loop
    Autonomous,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Hybrid => "hybrid",
            Self::Autonomous => "autonomous",
        })
    }
}

impl FromStr for ExecutionMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "hybrid" => Ok(Self::Hybrid),
            "autonomous" => Ok(Self::Autonomous),
            other => Err(crate::Error::InvalidParameters(format!(
                "unknown execution mode: {other}"
            ))),
        }
    }
}

/// How the final response was produced, when an LLM wrote it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    Hybrid,
}

/// Outcome of one pipeline invocation
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub mode: ExecutionMode,
    /// Step log in call order
    pub steps: Vec<StepRecord>,
    pub final_response: String,
    /// Snapshot of the state at the end of the run
    pub data_state: AnalysisState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis_mode: Option<SynthesisMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Manual".parse::<ExecutionMode>().unwrap(), ExecutionMode::Manual);
        assert_eq!(
            "autonomous".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Autonomous
        );
        assert!("auto".parse::<ExecutionMode>().is_err());
        assert_eq!(ExecutionMode::default(), ExecutionMode::Hybrid);
    }

    #[test]
    fn test_result_serialization() {
        let result = PipelineResult {
            run_id: Uuid::new_v4(),
            mode: ExecutionMode::Manual,
            steps: vec![StepRecord::succeeded("Fetching Data", "✅ AAA: 1 data points")],
            final_response: "done".into(),
            data_state: AnalysisState::new(),
            synthesis_mode: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["mode"], "manual");
        assert_eq!(json["steps"][0]["status"], "succeeded");
        assert!(json.get("synthesis_mode").is_none());
    }
}
