//! Retry configuration, delay calculation and the shared retry loop.
//!
//! Every collaborator call in [`SummaryService`](crate::SummaryService) goes
//! through [`with_retry`], which classifies each failure and retries the
//! retryable ones with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::classify::{self, Phase, ProcessedError};
use crate::error::UpstreamError;
use crate::telemetry;

/// Configuration for retry behaviour on retryable failures.
///
/// ```rust
/// # use huginn::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 10s.
    ///
    /// A rate-limit hint longer than this ends the retry loop instead of
    /// waiting it out.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    ///
    /// Uses exponential backoff: `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Delay before the next attempt, or `None` if the failure should not be
    /// retried at all.
    ///
    /// A `retry_after` hint takes precedence over the backoff, unless it
    /// exceeds `max_delay`.
    pub fn next_delay(&self, attempt: u32, error: &ProcessedError) -> Option<Duration> {
        if !error.retryable {
            return None;
        }
        match error.retry_after() {
            Some(hint) if hint > self.max_delay => None,
            Some(hint) => Some(hint),
            None => Some(self.delay_for_attempt(attempt)),
        }
    }
}

/// Run `f` until it succeeds, fails with a non-retryable error, or runs out
/// of attempts.
///
/// Every failure is classified against `phase`; the classification of the
/// last failure is returned.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, phase: Phase, f: F) -> Result<T, ProcessedError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let err = match f().await {
            Ok(value) => return Ok(value),
            Err(raw) => classify::classify(Some(&raw), phase),
        };

        attempt += 1;
        if attempt >= attempts {
            return Err(err);
        }
        let Some(delay) = config.next_delay(attempt - 1, &err) else {
            return Err(err);
        };

        metrics::counter!(telemetry::RETRIES_TOTAL, "phase" => phase.as_str()).increment(1);
        warn!(
            %phase,
            category = %err.category,
            attempt,
            max_attempts = attempts,
            delay_ms = delay.as_millis() as u64,
            "retrying after retryable error"
        );
        tokio::time::sleep(delay).await;
    }
}
