//! Shared utilities for portfolio-intelligence
//!
//! This crate provides logging setup and the environment-driven application
//! configuration used by the pipeline and the CLI.

pub mod config;
pub mod logging;

pub use config::{AppConfig, AppConfigBuilder, ConfigError, load_dotenv};
pub use logging::{init_tracing, init_tracing_json};
