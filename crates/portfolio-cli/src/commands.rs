//! Subcommand handlers

use crate::cli::AnalyzeArgs;
use crate::output;
use anyhow::{Context, bail};
use portfolio_agent::{Pipeline, PipelineError};
use portfolio_analysis::steps::{chart_path, clear_artifacts, rank_portfolio};
use portfolio_analysis::{AnalysisConfig, YahooFinanceClient};
use portfolio_core::{ExecutionMode, PipelineResult, Ticker};
use portfolio_llm::providers::{GeminiConfig, GeminiProvider};
use portfolio_llm::LLMError;
use portfolio_utils::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let tickers = Ticker::parse_list(&args.tickers)?;
    if tickers.is_empty() {
        bail!("no tickers given");
    }
    let days = args.days.unwrap_or(config.default_forecast_days);

    let assets = config.ensure_assets_dir()?;
    let removed = clear_artifacts(assets)
        .with_context(|| format!("failed to clear {}", assets.display()))?;
    info!(removed, dir = %assets.display(), "Cleared old charts");

    let pipeline = build_pipeline(config)?;
    if args.mode != ExecutionMode::Manual && !pipeline.has_provider() {
        bail!("{} mode needs GOOGLE_API_KEY; use --mode manual for raw metrics", args.mode);
    }

    if !args.json {
        println!(
            "🚀 Running {} analysis for {} ({days} day horizon)...\n",
            args.mode,
            args.tickers.trim()
        );
    }

    let result = match pipeline
        .run(args.mode, &tickers, days, !args.no_sentiment)
        .await
    {
        Ok(result) => result,
        Err(PipelineError::Llm(e @ LLMError::RateLimitExceeded(_))) => {
            warn!("Gemini rate limit hit");
            eprintln!("ℹ️ You hit the Gemini rate limit. Please wait a minute and try again.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let charts: Vec<PathBuf> = result
        .data_state
        .forecasts
        .keys()
        .map(|t| chart_path(assets, t))
        .filter(|p| p.is_file())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", output::render_result(&result, &charts));
        if args.show_state {
            print_state(&result);
        }
    }

    if let Some(dir) = &args.report_dir {
        let path = output::write_report(dir, &result.final_response, chrono::Utc::now().timestamp())
            .with_context(|| format!("failed to write report into {}", dir.display()))?;
        info!(path = %path.display(), "Report written");
        if !args.json {
            println!("\n📥 Report saved to {}", path.display());
        }
    }

    Ok(())
}

fn print_state(result: &PipelineResult) {
    println!("\n🔧 System State");
    println!("{}", output::state_table(&result.data_state));
    if let Ok(ranking) = rank_portfolio(&result.data_state) {
        println!("{}", output::ranking_table(&ranking));
    }
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<Pipeline> {
    let analysis = AnalysisConfig::from_app_config(config)?;
    let source = YahooFinanceClient::new()?;

    let mut builder = Pipeline::builder()
        .source(Arc::new(source))
        .config(analysis)
        .model(&config.llm_model)
        .temperature(config.temperature);

    if let Some(key) = &config.google_api_key {
        let gemini = GeminiConfig::new(key).with_api_base(&config.gemini_api_base);
        builder = builder
            .provider(Arc::new(GeminiProvider::with_config(gemini)?))
            .rate_limit(config.max_api_calls_per_minute);
    }

    Ok(builder.build()?)
}

pub fn status(config: &AppConfig) {
    println!("🔌 API Status");
    println!("{}", output::status_table(config));
}
