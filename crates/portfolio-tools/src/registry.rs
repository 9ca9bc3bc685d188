//! Capability table mapping tool names to tools
//!
//! The registry is assembled once through its builder and is read-only
//! afterwards, so lookups need no locking.

use crate::Tool;
use portfolio_core::{AnalysisState, Error, Result};
use portfolio_llm::ToolDefinition;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of the tools available to the LLM loop
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Definitions for every tool, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Look up `name` and run it against `state`
    ///
    /// Unknown names are reported as parameter errors so the caller can hand
    /// them back to the model like any other tool failure.
    pub async fn dispatch(
        &self,
        name: &str,
        params: Value,
        state: &mut AnalysisState,
    ) -> Result<String> {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool_name = name, "Unknown tool requested");
            return Err(Error::InvalidParameters(format!("Tool not found: {name}")));
        };
        debug!(tool_name = name, "Dispatching tool");
        tool.execute(params, state).await
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builder for ToolRegistry
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Register a tool, replacing any earlier tool with the same name
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        if self.tools.insert(tool.name().to_string(), tool).is_some() {
            warn!("Tool registered twice; keeping the later one");
        }
        self
    }

    /// Register several tools
    pub fn register_all(self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        tools.into_iter().fold(self, Self::register)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_core::{PriceSeries, Ticker};
    use serde_json::json;

    struct MarkLoaded;

    #[async_trait]
    impl Tool for MarkLoaded {
        async fn execute(&self, params: Value, state: &mut AnalysisState) -> Result<String> {
            let symbol = params["ticker"]
                .as_str()
                .ok_or_else(|| Error::InvalidParameters("missing ticker".into()))?;
            let ticker = Ticker::new(symbol)?;
            state.portfolio.insert(ticker.clone(), PriceSeries::default());
            Ok(format!("loaded {ticker}"))
        }

        fn name(&self) -> &'static str {
            "mark_loaded"
        }

        fn description(&self) -> &'static str {
            "Mark a ticker as loaded"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"ticker": {"type": "string"}}, "required": ["ticker"]})
        }
    }

    struct Noop(&'static str);

    #[async_trait]
    impl Tool for Noop {
        async fn execute(&self, _params: Value, _state: &mut AnalysisState) -> Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &'static str {
            "noop"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    #[tokio::test]
    async fn test_dispatch_mutates_state() {
        let registry = ToolRegistry::builder().register(Arc::new(MarkLoaded)).build();
        let mut state = AnalysisState::new();

        let out = registry
            .dispatch("mark_loaded", json!({"ticker": "aapl"}), &mut state)
            .await
            .unwrap();
        assert_eq!(out, "loaded AAPL");
        assert!(state.is_loaded(&Ticker::new("AAPL").unwrap()));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_params() {
        let registry = ToolRegistry::builder().register(Arc::new(MarkLoaded)).build();
        let mut state = AnalysisState::new();

        let err = registry
            .dispatch("delete_everything", json!({}), &mut state)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Tool not found"));

        let err = registry
            .dispatch("mark_loaded", json!({}), &mut state)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));
    }

    #[test]
    fn test_definitions_sorted_by_name() {
        let registry = ToolRegistry::builder()
            .register_all([
                Arc::new(Noop("zeta")) as Arc<dyn Tool>,
                Arc::new(Noop("alpha")),
                Arc::new(Noop("alpha")),
            ])
            .build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        let defs = registry.definitions();
        assert_eq!(defs[0].name, "alpha");
        assert!(registry.get("zeta").is_some());
    }
}
