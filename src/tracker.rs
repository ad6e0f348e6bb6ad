//! Per-request performance tracking.
//!
//! [`PerformanceTracker`] follows a summary request from start to finish:
//! whether it was served from cache, how long the AI step took, and the
//! total latency. It is purely observational. No method returns an error
//! and nothing here changes how a request is handled; a call with an
//! unknown request id is logged and ignored.
//!
//! In-flight records live in a bounded TTL cache (moka), so a request that
//! never reaches [`complete_request`](PerformanceTracker::complete_request)
//! is eventually forgotten instead of leaking.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::telemetry;

/// Opaque identifier handed out by [`PerformanceTracker::start_request`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timing data for one summary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub request_id: RequestId,
    pub thread_id: String,
    pub started_at: DateTime<Utc>,
    pub cache_hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_processing_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PerformanceRecord {
    /// Wall time from start to completion, once completed.
    pub fn total_ms(&self) -> Option<u64> {
        self.completed_at.map(|done| {
            u64::try_from((done - self.started_at).num_milliseconds()).unwrap_or(0)
        })
    }
}

/// Configuration for the tracker's in-flight record store.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// How long an uncompleted record is kept. Default: 10 minutes.
    pub record_ttl: Duration,
    /// Maximum in-flight records. Default: 10,000.
    pub max_records: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            record_ttl: Duration::from_secs(600),
            max_records: 10_000,
        }
    }
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ttl(mut self, ttl: Duration) -> Self {
        self.record_ttl = ttl;
        self
    }

    pub fn max_records(mut self, n: u64) -> Self {
        self.max_records = n;
        self
    }
}

/// Aggregate counters since the tracker was created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub total_requests: u64,
    pub completed_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors: u64,
    /// Mean end-to-end latency of completed requests.
    pub avg_total_ms: Option<f64>,
    /// Mean AI latency over requests that reached the summariser.
    pub avg_ai_processing_ms: Option<f64>,
}

impl PerformanceSnapshot {
    /// Share of completed requests served from cache, in `0.0..=1.0`.
    pub fn hit_rate(&self) -> Option<f64> {
        (self.completed_requests > 0)
            .then(|| self.cache_hits as f64 / self.completed_requests as f64)
    }
}

#[derive(Default)]
struct Totals {
    started: AtomicU64,
    completed: AtomicU64,
    hits: AtomicU64,
    errors: AtomicU64,
    total_ms: AtomicU64,
    ai_ms: AtomicU64,
    ai_samples: AtomicU64,
}

/// Records per-request timings. Cheap to share behind an `Arc`.
pub struct PerformanceTracker {
    records: moka::sync::Cache<RequestId, PerformanceRecord>,
    totals: Totals,
    clock: Arc<dyn Clock>,
}

impl PerformanceTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &TrackerConfig, clock: Arc<dyn Clock>) -> Self {
        let records = moka::sync::Cache::builder()
            .max_capacity(config.max_records)
            .time_to_live(config.record_ttl)
            .build();
        Self {
            records,
            totals: Totals::default(),
            clock,
        }
    }

    /// Open a record for a request on `thread_id`.
    pub fn start_request(&self, thread_id: &str) -> RequestId {
        let request_id = RequestId::generate();
        let record = PerformanceRecord {
            request_id: request_id.clone(),
            thread_id: thread_id.to_string(),
            started_at: self.clock.now(),
            cache_hit: false,
            ai_processing_ms: None,
            completed_at: None,
            error: None,
        };
        self.records.insert(request_id.clone(), record);
        self.totals.started.fetch_add(1, Ordering::Relaxed);
        request_id
    }

    /// Note that the request was answered from cache.
    pub fn mark_cache_hit(&self, request_id: &RequestId) {
        self.update(request_id, "mark_cache_hit", |record| record.cache_hit = true);
    }

    /// Note how long the AI summariser took.
    pub fn record_ai_processing_time(&self, request_id: &RequestId, elapsed: Duration) {
        metrics::histogram!(telemetry::AI_PROCESSING_SECONDS).record(elapsed.as_secs_f64());
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.update(request_id, "record_ai_processing_time", |record| {
            record.ai_processing_ms = Some(ms);
        });
    }

    /// Close the record and return it.
    ///
    /// Returns `None` if the id is unknown (already completed, expired, or
    /// never issued).
    pub fn complete_request(
        &self,
        request_id: &RequestId,
        error: Option<&str>,
    ) -> Option<PerformanceRecord> {
        let Some(mut record) = self.records.remove(request_id) else {
            warn!(%request_id, "complete_request for unknown request id");
            return None;
        };
        record.completed_at = Some(self.clock.now());
        record.error = error.map(str::to_string);
        let total_ms = record.total_ms().unwrap_or(0);

        self.totals.completed.fetch_add(1, Ordering::Relaxed);
        self.totals.total_ms.fetch_add(total_ms, Ordering::Relaxed);
        if record.cache_hit {
            self.totals.hits.fetch_add(1, Ordering::Relaxed);
        }
        if record.error.is_some() {
            self.totals.errors.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(ai_ms) = record.ai_processing_ms {
            self.totals.ai_ms.fetch_add(ai_ms, Ordering::Relaxed);
            self.totals.ai_samples.fetch_add(1, Ordering::Relaxed);
        }

        let status = if record.error.is_some() { "error" } else { "ok" };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => status).increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS).record(total_ms as f64 / 1000.0);
        info!(
            %request_id,
            thread_id = %record.thread_id,
            cache_hit = record.cache_hit,
            ai_processing_ms = record.ai_processing_ms,
            total_ms,
            error = record.error.as_deref(),
            "summary request completed"
        );
        Some(record)
    }

    /// The in-flight record for a request, if any.
    pub fn get(&self, request_id: &RequestId) -> Option<PerformanceRecord> {
        self.records.get(request_id)
    }

    /// Aggregate counters.
    pub fn snapshot(&self) -> PerformanceSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let completed = load(&self.totals.completed);
        let hits = load(&self.totals.hits);
        let ai_samples = load(&self.totals.ai_samples);
        PerformanceSnapshot {
            total_requests: load(&self.totals.started),
            completed_requests: completed,
            cache_hits: hits,
            cache_misses: completed.saturating_sub(hits),
            errors: load(&self.totals.errors),
            avg_total_ms: (completed > 0)
                .then(|| load(&self.totals.total_ms) as f64 / completed as f64),
            avg_ai_processing_ms: (ai_samples > 0)
                .then(|| load(&self.totals.ai_ms) as f64 / ai_samples as f64),
        }
    }

    fn update(&self, request_id: &RequestId, op: &str, f: impl FnOnce(&mut PerformanceRecord)) {
        match self.records.get(request_id) {
            Some(mut record) => {
                f(&mut record);
                self.records.insert(request_id.clone(), record);
            }
            None => warn!(%request_id, op, "unknown request id"),
        }
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}
