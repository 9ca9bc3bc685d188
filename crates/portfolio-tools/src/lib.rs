//! Tool management and execution framework for portfolio-intelligence
//!
//! Tools are the capabilities exposed to the autonomous LLM loop. Each tool
//! reads and writes the run's `AnalysisState` and answers with text.

pub mod registry;
pub mod tool;

pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tool::Tool;
