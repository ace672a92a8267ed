//! Bounded retry around any [`LlmProvider`].
//!
//! Only errors whose [`ModelError::retry_policy`] is
//! [`RetryPolicy::Retryable`] are retried. With the default configuration
//! (`max_retries = 0`) the wrapper behaves exactly like the provider it wraps.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{CompletionRequest, LlmProvider, ModelError, RetryPolicy};
use tracing::warn;

/// Back-off schedule for [`RetryingProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each subsequent one.
    pub base_delay: Duration,
    /// Upper bound for the computed delay. A larger server `Retry-After` wins.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Sets how many times a transient failure is retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Wraps a provider and retries transient failures.
pub struct RetryingProvider<P> {
    inner: P,
    config: RetryConfig,
}

impl<P> RetryingProvider<P> {
    /// Wraps `inner` with the given schedule.
    pub fn new(inner: P, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: LlmProvider> LlmProvider for RetryingProvider<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        let mut attempt = 0;
        loop {
            let err = match self.inner.complete(request.clone()).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            let server_delay = match err.retry_policy() {
                RetryPolicy::NonRetryable => return Err(err),
                RetryPolicy::Retryable { after } => after.unwrap_or_default(),
            };
            if attempt >= self.config.max_retries {
                return Err(err);
            }

            let delay = self.config.backoff(attempt).max(server_delay);
            warn!(
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying model call"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
