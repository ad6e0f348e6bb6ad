//! Huginn - freshness-keyed summary cache for forum threads
//!
//! Huginn sits between a forum front-end and an AI summariser. It keeps
//! generated thread summaries in an in-memory cache keyed on the thread's
//! last activity, classifies upstream failures into a small fixed taxonomy,
//! retries the ones worth retrying, and falls back to safe placeholder
//! content when nothing else works. A request therefore always gets a
//! usable summary back.
//!
//! The forum client and the summariser themselves are collaborators,
//! plugged in through [`ThreadDataProvider`] and [`Summarizer`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use huginn::{
//!     Post, SummaryData, SummaryService, Summarizer, Thread, ThreadData,
//!     ThreadDataProvider, UpstreamError,
//! };
//!
//! struct Forum;
//!
//! #[async_trait]
//! impl ThreadDataProvider for Forum {
//!     async fn fetch(&self, thread_id: &str) -> Result<ThreadData, UpstreamError> {
//!         Err(UpstreamError::http(404, format!("thread {thread_id} not found")))
//!     }
//! }
//!
//! struct Ai;
//!
//! #[async_trait]
//! impl Summarizer for Ai {
//!     async fn generate(&self, _: &Thread, _: &[Post]) -> Result<SummaryData, UpstreamError> {
//!         Err(UpstreamError::Unknown)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let service = SummaryService::builder()
//!         .thread_provider(Arc::new(Forum))
//!         .summarizer(Arc::new(Ai))
//!         .build()?;
//!
//!     let outcome = service.summarize("thread-123").await;
//!     println!("{}", outcome.data.summary[0]);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod fallback;
pub mod retry;
pub mod service;
pub mod telemetry;
pub mod tracker;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheEntry, SummaryCache, build_key, last_post_timestamp};
pub use classify::{ErrorCategory, Phase, ProcessedError, classify};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{HuginnError, Result, UpstreamError};
pub use fallback::{
    FallbackSummary, build_fallback, build_fallback_at, insufficient_content,
    is_suitable_for_analysis,
};
pub use retry::RetryConfig;
pub use service::{SummaryOutcome, SummaryService, SummaryServiceBuilder, SummarySource};
pub use tracker::{
    PerformanceRecord, PerformanceSnapshot, PerformanceTracker, RequestId, TrackerConfig,
};
pub use traits::{Summarizer, ThreadDataProvider};

// Re-export all types
pub use types::{
    Contributor, HealthLabel, HealthScore, Post, Sentiment, SummaryData, Thread, ThreadData,
    ThreadStats,
};
