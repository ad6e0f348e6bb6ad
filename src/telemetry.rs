//! Telemetry metric name constants.
//!
//! Centralised metric names for huginn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `huginn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `status` — outcome: "ok" or "error"
//! - `source` — where the summary came from: "cache", "generated",
//!   "insufficient_content" or "fallback"
//! - `phase` — call site: "forum_fetch", "ai_generation", "validation"
//! - `category` — error category (e.g. "rate_limit", "timeout")

/// Total summary requests completed by the tracker.
///
/// Labels: `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "huginn_requests_total";

/// End-to-end request duration in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "huginn_request_duration_seconds";

/// Time spent in the AI summariser, in seconds.
pub const AI_PROCESSING_SECONDS: &str = "huginn_ai_processing_seconds";

/// Summaries served, by origin.
///
/// Labels: `source`.
pub const SUMMARIES_TOTAL: &str = "huginn_summaries_total";

/// Total retry attempts (not counting the initial call).
///
/// Labels: `phase`.
pub const RETRIES_TOTAL: &str = "huginn_retries_total";

/// Classified failures.
///
/// Labels: `category`.
pub const ERRORS_TOTAL: &str = "huginn_errors_total";

/// Total summary cache hits.
pub const CACHE_HITS_TOTAL: &str = "huginn_cache_hits_total";

/// Total summary cache misses (absent or expired).
pub const CACHE_MISSES_TOTAL: &str = "huginn_cache_misses_total";

/// Entries evicted to stay under the cache capacity.
pub const CACHE_EVICTIONS_TOTAL: &str = "huginn_cache_evictions_total";
