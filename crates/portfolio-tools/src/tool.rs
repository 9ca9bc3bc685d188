//! Tool trait definition

use async_trait::async_trait;
use portfolio_core::{AnalysisState, Result};
use portfolio_llm::ToolDefinition;
use serde_json::Value;

/// Trait for tools the LLM loop can execute
///
/// Each tool must provide a name, description, and JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters against the run's state
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match input_schema)
    /// * `state` - The analysis state of the current run
    ///
    /// # Returns
    ///
    /// Human-readable result text, fed back to the model verbatim
    async fn execute(&self, params: Value, state: &mut AnalysisState) -> Result<String>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry and match the name in ToolDefinition
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the LLM understand when to use this tool
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;

    /// Definition sent to the LLM provider
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}
