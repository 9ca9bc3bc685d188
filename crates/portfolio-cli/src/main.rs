//! Command-line interface for portfolio-intelligence

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use portfolio_utils::AppConfig;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        portfolio_utils::init_tracing_json();
    } else {
        portfolio_utils::init_tracing();
    }
    portfolio_utils::load_dotenv();

    info!("Starting portfolio");

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("❌ Critical System Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    match command {
        Command::Analyze(args) => commands::analyze(&config, args).await,
        Command::Status => {
            commands::status(&config);
            Ok(())
        }
    }
}
