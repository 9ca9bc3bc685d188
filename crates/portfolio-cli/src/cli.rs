//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use portfolio_analysis::steps::MAX_FORECAST_DAYS;
use portfolio_core::ExecutionMode;
use std::path::PathBuf;

pub const DEFAULT_TICKERS: &str = "AAPL, MSFT, GOOGL";

#[derive(Parser, Debug)]
#[command(name = "portfolio")]
#[command(version, about = "AI portfolio intelligence: risk, forecasts and an executive summary", long_about = None)]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an analysis over a set of tickers
    Analyze(AnalyzeArgs),
    /// Show configuration and credential status
    Status,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Comma-separated ticker symbols
    #[arg(short, long, default_value = DEFAULT_TICKERS)]
    pub tickers: String,

    /// Execution mode: manual, hybrid or autonomous
    #[arg(short, long, default_value_t = ExecutionMode::Hybrid)]
    pub mode: ExecutionMode,

    /// Forecast horizon in days, 1 to 3650 (DEFAULT_FORECAST_DAYS when omitted)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_FORECAST_DAYS)))]
    pub days: Option<u32>,

    /// Skip the news sentiment step
    #[arg(long)]
    pub no_sentiment: bool,

    /// Write the final response as a Markdown report into this directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Print the full result as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also print the analysis state tables
    #[arg(long)]
    pub show_state: bool,
}
