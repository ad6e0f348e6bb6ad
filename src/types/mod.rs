//! Public types for the huginn API.

mod forum;
mod summary;

pub use forum::{Post, Thread, ThreadData};
pub use summary::{Contributor, HealthLabel, HealthScore, Sentiment, SummaryData, ThreadStats};
