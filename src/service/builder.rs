//! Builder for configuring summary service instances

use std::sync::Arc;
use std::time::Duration;

use super::SummaryService;
use crate::cache::{CacheConfig, SummaryCache};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::fallback::MIN_CONTENT_CHARS;
use crate::retry::RetryConfig;
use crate::tracker::{PerformanceTracker, TrackerConfig};
use crate::traits::{Summarizer, ThreadDataProvider};
use crate::{HuginnError, Result};

/// Default overall bound on each upstream phase, retries included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`SummaryService`].
///
/// A thread provider and a summariser are required. Everything else has a
/// default; a shared cache or tracker can be passed in so several services
/// (or an admin endpoint) see the same state.
pub struct SummaryServiceBuilder {
    threads: Option<Arc<dyn ThreadDataProvider>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    cache: Option<Arc<SummaryCache>>,
    cache_config: CacheConfig,
    tracker: Option<Arc<PerformanceTracker>>,
    tracker_config: TrackerConfig,
    clock: Option<Arc<dyn Clock>>,
    retry: RetryConfig,
    timeout: Duration,
    min_content_chars: usize,
    sweep_interval: Option<Duration>,
}

impl SummaryService {
    /// Create a new builder for configuring the service.
    pub fn builder() -> SummaryServiceBuilder {
        SummaryServiceBuilder::new()
    }
}

impl SummaryServiceBuilder {
    pub fn new() -> Self {
        Self {
            threads: None,
            summarizer: None,
            cache: None,
            cache_config: CacheConfig::default(),
            tracker: None,
            tracker_config: TrackerConfig::default(),
            clock: None,
            retry: RetryConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            min_content_chars: MIN_CONTENT_CHARS,
            sweep_interval: None,
        }
    }

    /// Apply every section of a loaded [`Config`].
    pub fn config(mut self, config: &Config) -> Self {
        self.cache_config = config.cache.to_cache_config();
        self.sweep_interval = config.cache.sweep_interval();
        self.retry = config.retry.to_retry_config();
        self.tracker_config = config.tracker.to_tracker_config();
        self.timeout = Duration::from_secs(config.generation.timeout_secs);
        self.min_content_chars = config.generation.min_content_chars;
        self
    }

    /// Set the forum data source.
    pub fn thread_provider(mut self, provider: Arc<dyn ThreadDataProvider>) -> Self {
        self.threads = Some(provider);
        self
    }

    /// Set the AI summariser.
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Use an existing cache instead of creating one.
    ///
    /// The cache keeps its own configuration; [`cache_config`](Self::cache_config)
    /// is ignored.
    pub fn cache(mut self, cache: Arc<SummaryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configure the cache the builder creates.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Use an existing performance tracker.
    pub fn tracker(mut self, tracker: Arc<PerformanceTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Configure the tracker the builder creates.
    pub fn tracker_config(mut self, config: TrackerConfig) -> Self {
        self.tracker_config = config;
        self
    }

    /// Inject a clock. Applies to the cache and tracker the builder creates
    /// and to fallback timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the retry policy for upstream calls.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set the overall bound on each upstream phase. Default: 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the content-suitability threshold. Default: 50 characters.
    pub fn min_content_chars(mut self, n: usize) -> Self {
        self.min_content_chars = n;
        self
    }

    /// Sweep expired cache entries on this interval once
    /// [`SummaryService::spawn_sweeper`] is called.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<SummaryService> {
        let threads = self.threads.ok_or_else(|| {
            HuginnError::Configuration("no thread provider configured".to_string())
        })?;
        let summarizer = self
            .summarizer
            .ok_or_else(|| HuginnError::Configuration("no summarizer configured".to_string()))?;
        if self.timeout.is_zero() {
            return Err(HuginnError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = self.cache.unwrap_or_else(|| {
            Arc::new(SummaryCache::with_clock(self.cache_config, clock.clone()))
        });
        let tracker = self.tracker.unwrap_or_else(|| {
            Arc::new(PerformanceTracker::with_clock(
                &self.tracker_config,
                clock.clone(),
            ))
        });

        Ok(SummaryService::new(
            threads,
            summarizer,
            cache,
            tracker,
            clock,
            self.retry,
            self.timeout,
            self.min_content_chars,
            self.sweep_interval,
        ))
    }
}

impl Default for SummaryServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
