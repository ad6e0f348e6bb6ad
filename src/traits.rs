//! Collaborator traits.
//!
//! The forum API client and the AI summariser live outside this crate.
//! Implementations normalise their failures into [`UpstreamError`] before
//! returning, so nothing downstream has to guess at error shapes.

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::types::{Post, SummaryData, Thread, ThreadData};

/// Source of forum threads and their posts.
#[async_trait]
pub trait ThreadDataProvider: Send + Sync {
    /// Fetch a thread and all of its posts.
    ///
    /// Expected failures: 404 for unknown threads, network errors, timeouts.
    async fn fetch(&self, thread_id: &str) -> Result<ThreadData, UpstreamError>;
}

/// Produces an AI summary of a thread.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, thread: &Thread, posts: &[Post]) -> Result<SummaryData, UpstreamError>;
}
