use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use huginn::retry::with_retry;
use huginn::{ErrorCategory, Phase, RetryConfig, UpstreamError};

/// Upstream call that fails N times then succeeds.
struct FailThenSucceed {
    fail_count: AtomicU32,
    fail_with: fn() -> UpstreamError,
    total_calls: AtomicU32,
}

impl FailThenSucceed {
    fn new(failures: u32, fail_with: fn() -> UpstreamError) -> Self {
        Self {
            fail_count: AtomicU32::new(failures),
            fail_with,
            total_calls: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }

    async fn call(&self) -> Result<&'static str, UpstreamError> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_count.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::Relaxed);
            return Err((self.fail_with)());
        }
        Ok("ok")
    }
}

fn network() -> UpstreamError {
    UpstreamError::native("network error: connection reset")
}

fn not_found() -> UpstreamError {
    UpstreamError::http(404, "no such thread")
}

// ============================================================================
// RetryConfig
// ============================================================================

#[test]
fn retry_config_defaults() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(500));
    assert_eq!(config.max_delay, Duration::from_secs(10));
}

#[test]
fn retry_config_disabled() {
    assert_eq!(RetryConfig::disabled().max_attempts, 1);
}

#[test]
fn retry_config_builder() {
    let config = RetryConfig::new()
        .max_attempts(5)
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(2));
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(2));
}

// ============================================================================
// with_retry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn retries_transient_then_succeeds() {
    let upstream = Arc::new(FailThenSucceed::new(2, network));
    let result = with_retry(&RetryConfig::default(), Phase::ForumFetch, || upstream.call()).await;
    assert_eq!(result.unwrap(), "ok");
    assert_eq!(upstream.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn backoff_waits_between_attempts() {
    let upstream = FailThenSucceed::new(2, network);
    let start = tokio::time::Instant::now();
    let config = RetryConfig::new().initial_delay(Duration::from_millis(100));
    with_retry(&config, Phase::ForumFetch, || upstream.call())
        .await
        .unwrap();
    // 100ms + 200ms
    assert_eq!(start.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn non_retryable_stops_immediately() {
    let upstream = FailThenSucceed::new(5, not_found);
    let err = with_retry(&RetryConfig::default(), Phase::ForumFetch, || upstream.call())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::NotFound);
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausts_attempts_and_returns_last_error() {
    let upstream = FailThenSucceed::new(10, network);
    let config = RetryConfig::new().max_attempts(4);
    let err = with_retry(&config, Phase::ForumFetch, || upstream.call())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::Network);
    assert!(err.retryable);
    assert_eq!(upstream.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn disabled_makes_single_attempt() {
    let upstream = FailThenSucceed::new(1, network);
    let result = with_retry(&RetryConfig::disabled(), Phase::ForumFetch, || upstream.call()).await;
    assert!(result.is_err());
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn short_rate_limit_hint_is_honoured() {
    let upstream = FailThenSucceed::new(1, || {
        UpstreamError::rate_limited("slow down", Duration::from_secs(2))
    });
    let start = tokio::time::Instant::now();
    with_retry(&RetryConfig::default(), Phase::AiGeneration, || upstream.call())
        .await
        .unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(upstream.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn long_rate_limit_hint_is_not_waited_out() {
    let upstream = FailThenSucceed::new(1, || UpstreamError::http(429, "slow down"));
    let err = with_retry(&RetryConfig::default(), Phase::AiGeneration, || upstream.call())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::RateLimit);
    assert_eq!(err.retry_after_seconds, Some(60));
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failures_are_classified_against_phase() {
    let upstream = FailThenSucceed::new(10, || UpstreamError::native("bad model output"));
    let err = with_retry(&RetryConfig::disabled(), Phase::AiGeneration, || upstream.call())
        .await
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::AIProcessing);
}
