//! Token-bucket rate limiting around an LLM provider

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use portfolio_llm::{CompletionRequest, CompletionResponse, LLMProvider, Result};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Waits for a token before each completion request
///
/// The quota allows a burst of `calls_per_minute` requests and refills at the
/// same rate. Waiting never fails; requests are delayed, not rejected.
pub struct RateLimitedProvider {
    inner: Arc<dyn LLMProvider>,
    rate_limiter: SharedRateLimiter,
    calls_per_minute: u32,
}

impl RateLimitedProvider {
    /// Wrap `inner`; a zero rate is treated as one call per minute
    pub fn new(inner: Arc<dyn LLMProvider>, calls_per_minute: u32) -> Self {
        let rate = NonZeroU32::new(calls_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            inner,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rate))),
            calls_per_minute: rate.get(),
        }
    }

    pub fn calls_per_minute(&self) -> u32 {
        self.calls_per_minute
    }
}

#[async_trait]
impl LLMProvider for RateLimitedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.rate_limiter.until_ready().await;
        debug!(provider = self.inner.name(), "Rate limiter released request");
        self.inner.complete(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
