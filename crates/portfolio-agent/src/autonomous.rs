//! Bounded tool-calling loop
//!
//! The model decides which analysis tool to run next. The loop is an explicit
//! state machine:
//!
//! ```text
//! Deciding ──tool calls──▶ CallingTool ──results──▶ Deciding
//!    │
//!    ├──final text──▶ Done
//!    └──provider error / round limit──▶ Failed
//! ```
//!
//! Every `Deciding` and `CallingTool` transition consumes one round.

use portfolio_core::{AnalysisState, StepRecord};
use portfolio_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, TokenUsage, ToolDefinition,
};
use portfolio_tools::ToolRegistry;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Upper bound on model and tool transitions per run
pub const MAX_ROUNDS: usize = 15;

const PREVIEW_CHARS: usize = 300;

/// Shown in the step log when a message carries no text
pub const NO_TEXT_PLACEHOLDER: &str = "[Data Processed]";

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    Deciding,
    CallingTool(Vec<PendingCall>),
    Done(String),
    Failed(String),
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

/// Step-log text: first 300 characters plus `...`, or the placeholder
pub fn preview(text: &str) -> String {
    if text.is_empty() {
        return NO_TEXT_PLACEHOLDER.to_string();
    }
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

/// Sampling settings for loop requests
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub max_rounds: usize,
}

/// One autonomous run against a provider and a tool table
pub struct AutonomousLoop<'a> {
    provider: &'a dyn LLMProvider,
    registry: &'a ToolRegistry,
    settings: &'a LoopSettings,
    tools: Vec<ToolDefinition>,
}

impl<'a> AutonomousLoop<'a> {
    pub fn new(
        provider: &'a dyn LLMProvider,
        registry: &'a ToolRegistry,
        settings: &'a LoopSettings,
    ) -> Self {
        Self {
            provider,
            registry,
            settings,
            tools: registry.definitions(),
        }
    }

    /// Drive the loop to a terminal state
    ///
    /// Returns `Done(text)` or `Failed(message)`; the step log and the state
    /// are extended along the way.
    pub async fn run(
        &self,
        system: String,
        query: String,
        state: &mut AnalysisState,
        steps: &mut Vec<StepRecord>,
    ) -> LoopState {
        let mut conversation = vec![Message::user(query)];
        let mut rounds = 0;
        let mut usage = TokenUsage::default();
        let mut current = LoopState::Deciding;

        while !current.is_terminal() {
            if rounds >= self.settings.max_rounds {
                warn!(rounds, "Round limit reached");
                current = LoopState::Failed(format!(
                    "round limit ({}) reached without a final answer",
                    self.settings.max_rounds
                ));
                break;
            }
            rounds += 1;

            current = match current {
                LoopState::Deciding => {
                    self.decide(&system, &mut conversation, steps, &mut usage).await
                }
                LoopState::CallingTool(calls) => {
                    self.call_tools(calls, &mut conversation, state, steps).await;
                    LoopState::Deciding
                }
                terminal => terminal,
            };
            debug!(round = rounds, state = ?current, "Loop transition");
        }

        info!(
            rounds,
            total_tokens = usage.total(),
            done = matches!(current, LoopState::Done(_)),
            "Autonomous loop finished"
        );
        current
    }

    async fn decide(
        &self,
        system: &str,
        conversation: &mut Vec<Message>,
        steps: &mut Vec<StepRecord>,
        usage: &mut TokenUsage,
    ) -> LoopState {
        let request = CompletionRequest::builder(&self.settings.model)
            .messages(conversation.clone())
            .system(system)
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
            .tools(self.tools.clone())
            .build();

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Provider call failed");
                return LoopState::Failed(e.to_string());
            }
        };

        *usage += response.usage;
        let text = response.text();
        steps.push(StepRecord::succeeded("Agent", preview(&text)));

        let calls: Vec<PendingCall> = response
            .message
            .tool_calls()
            .into_iter()
            .map(|c| PendingCall {
                id: c.id.to_string(),
                name: c.name.to_string(),
                input: c.input.clone(),
            })
            .collect();
        conversation.push(response.message);

        if !calls.is_empty() {
            info!(tool_count = calls.len(), "Model requested tools");
            return LoopState::CallingTool(calls);
        }
        match response.stop_reason {
            StopReason::MaxTokens => warn!("Final answer truncated at max tokens"),
            StopReason::ToolUse => warn!("Tool use stop without any tool call"),
            StopReason::Filtered => warn!("Final answer withheld by content filters"),
            StopReason::EndTurn => {}
        }
        LoopState::Done(text)
    }

    async fn call_tools(
        &self,
        calls: Vec<PendingCall>,
        conversation: &mut Vec<Message>,
        state: &mut AnalysisState,
        steps: &mut Vec<StepRecord>,
    ) {
        let mut blocks = Vec::with_capacity(calls.len());
        let mut last: Option<(bool, String)> = None;

        for call in calls {
            info!(tool_name = %call.name, tool_id = %call.id, "Executing tool");
            match self.registry.dispatch(&call.name, call.input, state).await {
                Ok(text) => {
                    blocks.push(ContentBlock::tool_result(&call.id, text.clone()));
                    last = Some((true, text));
                }
                Err(e) => {
                    warn!(tool_name = %call.name, error = %e, "Tool execution failed");
                    let text = e.to_string();
                    blocks.push(ContentBlock::tool_error(&call.id, text.clone()));
                    last = Some((false, text));
                }
            }
        }

        if let Some((ok, text)) = last {
            let record = if ok {
                StepRecord::succeeded("Tool Output", preview(&text))
            } else {
                StepRecord::failed("Tool Output", preview(&text))
            };
            steps.push(record);
        }
        conversation.push(Message::tool_results(blocks));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview(""), "[Data Processed]");
        assert_eq!(preview("short"), "short...");
        let long = "x".repeat(400);
        assert_eq!(preview(&long).chars().count(), 303);
    }

    #[test]
    fn test_terminal_states() {
        assert!(LoopState::Done(String::new()).is_terminal());
        assert!(LoopState::Failed("x".into()).is_terminal());
        assert!(!LoopState::Deciding.is_terminal());
        assert!(!LoopState::CallingTool(vec![]).is_terminal());
    }
}
