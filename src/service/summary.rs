//! SummaryService - cache-first thread summaries with retry and fallback

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::cache::{SummaryCache, last_post_timestamp};
use crate::classify::{self, Phase, ProcessedError};
use crate::clock::Clock;
use crate::error::UpstreamError;
use crate::fallback::{build_fallback_at, insufficient_content, is_suitable_with_threshold};
use crate::retry::{RetryConfig, with_retry};
use crate::telemetry;
use crate::tracker::{PerformanceTracker, RequestId};
use crate::traits::{Summarizer, ThreadDataProvider};
use crate::types::{Post, SummaryData, Thread, ThreadData, ThreadStats};

/// Where a [`SummaryOutcome`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarySource {
    /// Served from the summary cache.
    Cache,
    /// Freshly produced by the summariser (and now cached).
    Generated,
    /// The thread was too short to analyse; the verdict is cached.
    InsufficientContent,
    /// Placeholder content after a failure. Not cached.
    Fallback(ProcessedError),
}

impl SummarySource {
    fn label(&self) -> &'static str {
        match self {
            SummarySource::Cache => "cache",
            SummarySource::Generated => "generated",
            SummarySource::InsufficientContent => "insufficient_content",
            SummarySource::Fallback(_) => "fallback",
        }
    }
}

/// The answer to a summary request. Always carries usable content.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub request_id: RequestId,
    pub data: SummaryData,
    pub thread_stats: ThreadStats,
    pub source: SummarySource,
}

impl SummaryOutcome {
    /// The classified failure, when this is fallback content.
    pub fn error(&self) -> Option<&ProcessedError> {
        match &self.source {
            SummarySource::Fallback(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error().is_some()
    }
}

struct Resolved {
    data: SummaryData,
    thread_stats: ThreadStats,
    source: SummarySource,
}

/// Cache-first summary pipeline.
///
/// Create via [`SummaryService::builder()`](super::SummaryService::builder).
pub struct SummaryService {
    threads: Arc<dyn ThreadDataProvider>,
    summarizer: Arc<dyn Summarizer>,
    cache: Arc<SummaryCache>,
    tracker: Arc<PerformanceTracker>,
    clock: Arc<dyn Clock>,
    retry: RetryConfig,
    timeout: Duration,
    min_content_chars: usize,
    sweep_interval: Option<Duration>,
}

impl SummaryService {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        threads: Arc<dyn ThreadDataProvider>,
        summarizer: Arc<dyn Summarizer>,
        cache: Arc<SummaryCache>,
        tracker: Arc<PerformanceTracker>,
        clock: Arc<dyn Clock>,
        retry: RetryConfig,
        timeout: Duration,
        min_content_chars: usize,
        sweep_interval: Option<Duration>,
    ) -> Self {
        Self {
            threads,
            summarizer,
            cache,
            tracker,
            clock,
            retry,
            timeout,
            min_content_chars,
            sweep_interval,
        }
    }

    pub fn cache(&self) -> &Arc<SummaryCache> {
        &self.cache
    }

    pub fn tracker(&self) -> &Arc<PerformanceTracker> {
        &self.tracker
    }

    /// Start the periodic expired-entry sweep, if one is configured.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn spawn_sweeper(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.sweep_interval
            .map(|interval| self.cache.spawn_sweeper(interval))
    }

    /// Summarise a thread.
    ///
    /// Never fails: every failure path ends in fallback content, with the
    /// classified error in [`SummarySource::Fallback`].
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    pub async fn summarize(&self, thread_id: &str) -> SummaryOutcome {
        let request_id = self.tracker.start_request(thread_id);
        tracing::Span::current().record("request_id", request_id.as_str());

        let resolved = self.resolve(&request_id, thread_id).await;

        let error_label = match &resolved.source {
            SummarySource::Fallback(err) => Some(err.category.as_str()),
            _ => None,
        };
        self.tracker.complete_request(&request_id, error_label);
        metrics::counter!(telemetry::SUMMARIES_TOTAL, "source" => resolved.source.label())
            .increment(1);

        SummaryOutcome {
            request_id,
            data: resolved.data,
            thread_stats: resolved.thread_stats,
            source: resolved.source,
        }
    }

    async fn resolve(&self, request_id: &RequestId, thread_id: &str) -> Resolved {
        if thread_id.trim().is_empty() {
            let err = classify::classify(
                Some(&UpstreamError::native("thread id is required")),
                Phase::Validation,
            );
            return self.fallback(err, None);
        }

        let fetched = self
            .bounded(
                Phase::ForumFetch,
                with_retry(&self.retry, Phase::ForumFetch, || self.threads.fetch(thread_id)),
            )
            .await;
        let ThreadData { thread, posts } = match fetched {
            Ok(data) => data,
            Err(err) => return self.fallback(err, Some(thread_id)),
        };

        let thread_stats = thread_stats(&thread, &posts);
        let freshness = last_post_timestamp(&thread, &posts);

        if let Some(entry) = self.cache.get(thread_id, &freshness) {
            self.tracker.mark_cache_hit(request_id);
            return Resolved {
                data: entry.data,
                thread_stats,
                source: SummarySource::Cache,
            };
        }

        if !is_suitable_with_threshold(&thread, &posts, self.min_content_chars) {
            debug!(thread_id, "thread below content threshold, skipping summariser");
            let data = insufficient_content();
            self.cache.set(thread_id, &freshness, data.clone());
            return Resolved {
                data,
                thread_stats,
                source: SummarySource::InsufficientContent,
            };
        }

        let started = tokio::time::Instant::now();
        let generated = self
            .bounded(
                Phase::AiGeneration,
                with_retry(&self.retry, Phase::AiGeneration, || {
                    self.summarizer.generate(&thread, &posts)
                }),
            )
            .await;
        self.tracker
            .record_ai_processing_time(request_id, started.elapsed());

        match generated {
            Ok(data) => {
                self.cache.set(thread_id, &freshness, data.clone());
                Resolved {
                    data,
                    thread_stats,
                    source: SummarySource::Generated,
                }
            }
            Err(err) => self.fallback(err, Some(thread_id)),
        }
    }

    /// Bound a phase, retries included, by the overall timeout.
    async fn bounded<T>(
        &self,
        phase: Phase,
        fut: impl Future<Output = Result<T, ProcessedError>>,
    ) -> Result<T, ProcessedError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(classify::classify(
                Some(&UpstreamError::native(format!(
                    "{phase} did not respond in time"
                ))),
                phase,
            )),
        }
    }

    fn fallback(&self, err: ProcessedError, thread_id: Option<&str>) -> Resolved {
        let fallback = build_fallback_at(&err, thread_id, self.clock.now());
        Resolved {
            data: fallback.data,
            thread_stats: fallback.thread_stats,
            source: SummarySource::Fallback(err),
        }
    }
}

/// Post count, distinct participants (thread author included) and creation
/// time of a thread.
fn thread_stats(thread: &Thread, posts: &[Post]) -> ThreadStats {
    let contributors: HashSet<&str> = thread
        .author
        .as_deref()
        .into_iter()
        .chain(posts.iter().filter_map(|p| p.author.as_deref()))
        .collect();
    ThreadStats {
        post_count: posts.len(),
        contributor_count: contributors.len(),
        created_at: thread.created_at,
    }
}
