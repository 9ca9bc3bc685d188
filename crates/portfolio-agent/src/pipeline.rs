//! Pipeline orchestrator
//!
//! Runs the analysis steps under one of three execution modes. Every run
//! starts from an empty [`AnalysisState`] and returns a [`PipelineResult`]
//! carrying the step log and a snapshot of the state.

use crate::autonomous::{AutonomousLoop, LoopSettings, LoopState, MAX_ROUNDS};
use crate::error::{PipelineError, Result};
use crate::limiter::RateLimitedProvider;
use crate::prompts;
use portfolio_analysis::steps::{
    analyze_sentiment, calculate_risk, fetch_portfolio, forecast_ticker, rank_portfolio,
};
use portfolio_analysis::{AnalysisConfig, MarketDataSource, analysis_registry};
use portfolio_core::{
    AnalysisState, ExecutionMode, PipelineResult, StepError, StepRecord, SynthesisMode, Ticker,
};
use portfolio_llm::{CompletionRequest, LLMProvider, Message};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// Runs analyses in manual, hybrid or autonomous mode
pub struct Pipeline {
    source: Arc<dyn MarketDataSource>,
    provider: Option<Arc<dyn LLMProvider>>,
    config: Arc<AnalysisConfig>,
    settings: LoopSettings,
    sentiment_seed: Option<u64>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether hybrid and autonomous runs can reach a model
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Dispatch on `mode`; autonomous runs never fail
    pub async fn run(
        &self,
        mode: ExecutionMode,
        tickers: &[Ticker],
        days: u32,
        include_sentiment: bool,
    ) -> Result<PipelineResult> {
        match mode {
            ExecutionMode::Manual => self.run_manual(tickers, days, include_sentiment).await,
            ExecutionMode::Hybrid => self.run_hybrid(tickers, days, include_sentiment).await,
            ExecutionMode::Autonomous => {
                let query = prompts::autonomous_query(tickers, days);
                Ok(self.run_autonomous(&query).await)
            }
        }
    }

    /// Fixed step sequence without any model call
    ///
    /// Non-fatal step errors are logged and the run continues; a model or
    /// chart failure aborts it.
    pub async fn run_manual(
        &self,
        tickers: &[Ticker],
        days: u32,
        include_sentiment: bool,
    ) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id, mode = %ExecutionMode::Manual);

        async {
            let mut state = AnalysisState::new();
            let steps = self
                .execute_steps(tickers, days, include_sentiment, &mut state)
                .await?;
            Ok(Self::finish(run_id, ExecutionMode::Manual, steps, state))
        }
        .instrument(span)
        .await
    }

    /// Manual run followed by one executive-summary request
    pub async fn run_hybrid(
        &self,
        tickers: &[Ticker],
        days: u32,
        include_sentiment: bool,
    ) -> Result<PipelineResult> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            PipelineError::Config("hybrid mode needs an LLM provider (set GOOGLE_API_KEY)".into())
        })?;

        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id, mode = %ExecutionMode::Hybrid);

        async {
            let mut state = AnalysisState::new();
            let steps = self
                .execute_steps(tickers, days, include_sentiment, &mut state)
                .await?;

            let prompt = prompts::synthesis_prompt(&prompts::prompt_date(), &steps)?;
            let request = CompletionRequest::builder(&self.settings.model)
                .add_message(Message::user(prompt))
                .max_tokens(self.settings.max_tokens)
                .temperature(self.settings.temperature)
                .build();

            info!(provider = provider.name(), "Requesting executive summary");
            let response = provider.complete(request).await?;

            let mut result = Self::finish(run_id, ExecutionMode::Hybrid, steps, state);
            if response.is_truncated() {
                warn!("Executive summary truncated at max tokens");
            }
            result.final_response = response.text();
            result.synthesis_mode = Some(SynthesisMode::Hybrid);
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Let the model sequence the tools
    ///
    /// Failures end up in the result as a warning response and a
    /// `Critical Error` step.
    pub async fn run_autonomous(&self, query: &str) -> PipelineResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id, mode = %ExecutionMode::Autonomous);

        async {
            let mut state = AnalysisState::new();
            let mut steps = Vec::new();

            let system = prompts::autonomous_system_prompt(&prompts::prompt_date(), query);
            let outcome = match (&self.provider, system) {
                (None, _) => {
                    LoopState::Failed("no LLM provider configured (set GOOGLE_API_KEY)".into())
                }
                (Some(_), Err(e)) => LoopState::Failed(e.to_string()),
                (Some(provider), Ok(system)) => {
                    let registry = analysis_registry(
                        self.source.clone(),
                        self.config.clone(),
                        self.sentiment_seed,
                    );
                    AutonomousLoop::new(provider.as_ref(), &registry, &self.settings)
                        .run(system, query.to_string(), &mut state, &mut steps)
                        .await
                }
            };

            let final_response = match outcome {
                LoopState::Done(text) => text,
                LoopState::Failed(message) => {
                    error!(error = %message, "Autonomous run failed");
                    let response = format!("⚠️ Autonomous Agent Error: {message}");
                    steps.push(StepRecord::failed("Critical Error", message));
                    response
                }
                LoopState::Deciding | LoopState::CallingTool(_) => String::new(),
            };

            PipelineResult {
                run_id,
                mode: ExecutionMode::Autonomous,
                steps,
                final_response,
                data_state: state,
                synthesis_mode: None,
            }
        }
        .instrument(span)
        .await
    }

    async fn execute_steps(
        &self,
        tickers: &[Ticker],
        days: u32,
        include_sentiment: bool,
        state: &mut AnalysisState,
    ) -> Result<Vec<StepRecord>> {
        let mut steps = Vec::new();

        let report =
            fetch_portfolio(self.source.as_ref(), tickers, self.config.default_period, state).await;
        steps.push(if report.loaded() > 0 {
            StepRecord::succeeded("Fetching Data", report.to_string())
        } else {
            StepRecord::failed("Fetching Data", report.to_string())
        });

        let risk = calculate_risk(self.source.as_ref(), &self.config, state, Some(tickers))
            .await
            .map(|r| r.to_string());
        record(&mut steps, "Risk Analysis", risk)?;

        for ticker in tickers {
            let outcome =
                forecast_ticker(&self.config, state, ticker, Some(days)).map(|f| f.to_string());
            record(&mut steps, format!("Forecasting {ticker}"), outcome)?;
        }

        if include_sentiment && self.config.enable_sentiment {
            let mut rng = self
                .sentiment_seed
                .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            for ticker in tickers {
                let outcome =
                    analyze_sentiment(true, state, ticker, &mut rng).map(|s| s.to_string());
                record(&mut steps, format!("Sentiment {ticker}"), outcome)?;
            }
        }

        let ranking = rank_portfolio(state).map(|r| r.to_string());
        record(&mut steps, "Portfolio Ranking", ranking)?;

        Ok(steps)
    }

    fn finish(
        run_id: Uuid,
        mode: ExecutionMode,
        steps: Vec<StepRecord>,
        state: AnalysisState,
    ) -> PipelineResult {
        let final_response = steps.last().map(|s| s.result.clone()).unwrap_or_default();
        PipelineResult {
            run_id,
            mode,
            steps,
            final_response,
            data_state: state,
            synthesis_mode: None,
        }
    }
}

/// Append a step outcome, or abort on a fatal error
fn record(
    steps: &mut Vec<StepRecord>,
    name: impl Into<String>,
    outcome: std::result::Result<String, StepError>,
) -> Result<()> {
    let name = name.into();
    match outcome {
        Err(e) if e.is_fatal() => {
            error!(step = %name, error = %e, "Fatal step failure");
            Err(PipelineError::Step(e))
        }
        outcome => {
            if let Err(e) = &outcome {
                warn!(step = %name, kind = ?e.kind, "Step failed");
            }
            steps.push(StepRecord::from_outcome(name, &outcome));
            Ok(())
        }
    }
}

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    source: Option<Arc<dyn MarketDataSource>>,
    provider: Option<Arc<dyn LLMProvider>>,
    rate_limit: Option<u32>,
    config: Option<AnalysisConfig>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    max_rounds: Option<usize>,
    sentiment_seed: Option<u64>,
}

impl PipelineBuilder {
    pub fn source(mut self, source: Arc<dyn MarketDataSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Wrap the provider in a token bucket of `calls_per_minute`
    pub fn rate_limit(mut self, calls_per_minute: u32) -> Self {
        self.rate_limit = Some(calls_per_minute);
        self
    }

    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Fix the sentiment draws for reproducible runs
    pub fn sentiment_seed(mut self, seed: u64) -> Self {
        self.sentiment_seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let source = self
            .source
            .ok_or_else(|| PipelineError::Config("market data source not set".into()))?;

        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let provider = match (self.provider, self.rate_limit) {
            (Some(p), Some(rate)) => {
                Some(Arc::new(RateLimitedProvider::new(p, rate)) as Arc<dyn LLMProvider>)
            }
            (provider, _) => provider,
        };

        let settings = LoopSettings {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            max_rounds: self.max_rounds.unwrap_or(MAX_ROUNDS),
        };

        Ok(Pipeline {
            source,
            provider,
            config: Arc::new(config),
            settings,
            sentiment_seed: self.sentiment_seed,
        })
    }
}
