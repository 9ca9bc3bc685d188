//! Completion request and response types
//!
//! A request carries the whole conversation; providers are stateless.
//! Responses report why generation stopped so callers can tell a final
//! answer from a tool request or a cut-off summary.

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Output budget when the caller does not set one
pub const DEFAULT_REQUEST_MAX_TOKENS: usize = 2048;

/// One round trip to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-specific model name, e.g. `gemini-2.5-flash`
    pub model: String,

    pub messages: Vec<Message>,

    /// Instruction text placed ahead of the conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Function declarations offered to the model; `None` for plain text turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }

    /// Whether the model may answer with tool calls
    pub fn offers_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// All text blocks of the reply, newline-joined
    pub fn text(&self) -> String {
        self.message.joined_text()
    }

    /// The reply ran into the output budget
    pub fn is_truncated(&self) -> bool {
        self.stop_reason == StopReason::MaxTokens
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    /// Output withheld by the provider's content filters
    Filtered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

pub struct CompletionRequestBuilder {
    model: String,
    messages: Vec<Message>,
    system: Option<String>,
    max_tokens: usize,
    temperature: Option<f32>,
    tools: Option<Vec<ToolDefinition>>,
}

impl CompletionRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens: DEFAULT_REQUEST_MAX_TOKENS,
            temperature: None,
            tools: None,
        }
    }

    /// Replace the conversation
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn add_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// An empty list is sent as no tools at all
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    pub fn build(self) -> CompletionRequest {
        CompletionRequest {
            model: self.model,
            messages: self.messages,
            system: self.system,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools: self.tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_synthesis_request() {
        let request = CompletionRequest::builder("gemini-2.5-flash")
            .add_message(Message::user("Summarize the ranking."))
            .system("You are a Senior Financial Analyst.")
            .max_tokens(4096)
            .temperature(0.3)
            .tools(vec![])
            .build();

        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 4096);
        assert_eq!(request.temperature, Some(0.3));
        assert!(!request.offers_tools());

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_tool_request() {
        let tool = ToolDefinition::new(
            "fetch_portfolio_data",
            "Download price history",
            json!({"type": "object"}),
        );
        let request = CompletionRequest::builder("gemini-2.5-flash")
            .add_message(Message::user("Analyze AAPL"))
            .tools(vec![tool])
            .build();
        assert!(request.offers_tools());
        assert_eq!(request.max_tokens, DEFAULT_REQUEST_MAX_TOKENS);
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_response_helpers() {
        let response = CompletionResponse {
            message: Message::assistant("Top Pick: AAPL"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::default(),
        };
        assert!(response.is_truncated());
        assert_eq!(response.text(), "Top Pick: AAPL");
        assert_eq!(
            serde_json::to_value(StopReason::Filtered).unwrap(),
            "filtered"
        );
    }

    #[test]
    fn test_token_usage() {
        let mut usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);

        usage += TokenUsage {
            input_tokens: 20,
            output_tokens: 5,
        };
        assert_eq!(
            usage,
            TokenUsage {
                input_tokens: 120,
                output_tokens: 55,
            }
        );
    }
}
