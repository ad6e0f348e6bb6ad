//! Placeholder summaries and the content-suitability gate.
//!
//! Two kinds of stand-in content exist:
//!
//! - [`build_fallback`] — the answer when a real summary could not be
//!   produced. Never cached: the next request should try again.
//! - [`insufficient_content`] — the answer for a thread with too little text
//!   to be worth summarising. This is a stable verdict for its freshness key
//!   and is cached like a generated summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::ProcessedError;
use crate::types::{HealthLabel, HealthScore, Post, Sentiment, SummaryData, Thread, ThreadStats};

/// Minimum body length, in characters, that makes a thread or post worth
/// summarising. A body must be strictly longer than this.
pub const MIN_CONTENT_CHARS: usize = 50;

const INSUFFICIENT_SUMMARY: &str = "Thread has insufficient content for analysis";
const INSUFFICIENT_KEY_POINT: &str = "No meaningful discussion content available";

/// A fallback summary plus the statistics block shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackSummary {
    #[serde(flatten)]
    pub data: SummaryData,
    pub thread_stats: ThreadStats,
}

/// Build the placeholder returned when summarisation failed.
///
/// The summary line names the thread when `thread_id` is known. Every
/// category gets the same neutral shape; `error` is accepted so callers can
/// pass the classified failure straight through.
pub fn build_fallback(error: &ProcessedError, thread_id: Option<&str>) -> FallbackSummary {
    build_fallback_at(error, thread_id, Utc::now())
}

/// [`build_fallback`] with an explicit timestamp for `thread_stats.created_at`.
pub fn build_fallback_at(
    error: &ProcessedError,
    thread_id: Option<&str>,
    now: DateTime<Utc>,
) -> FallbackSummary {
    let subject = match thread_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => "this thread",
    };
    tracing::debug!(category = %error.category, subject, "building fallback summary");

    FallbackSummary {
        data: neutral_summary(
            vec![format!(
                "Unable to analyze thread {subject} - forum data temporarily unavailable"
            )],
            Vec::new(),
        ),
        thread_stats: ThreadStats {
            post_count: 0,
            contributor_count: 0,
            created_at: now,
        },
    }
}

/// The cached verdict for a thread too short to analyse.
pub fn insufficient_content() -> SummaryData {
    neutral_summary(
        vec![INSUFFICIENT_SUMMARY.to_string()],
        vec![INSUFFICIENT_KEY_POINT.to_string()],
    )
}

fn neutral_summary(summary: Vec<String>, key_points: Vec<String>) -> SummaryData {
    SummaryData {
        summary,
        key_points,
        contributors: Vec::new(),
        sentiment: Sentiment::Neutral,
        health_score: HealthScore::NEUTRAL,
        health_label: HealthLabel::NeedsAttention,
    }
}

/// Whether a thread has enough text to be worth summarising, using the
/// default [`MIN_CONTENT_CHARS`] threshold.
pub fn is_suitable_for_analysis(thread: &Thread, posts: &[Post]) -> bool {
    is_suitable_with_threshold(thread, posts, MIN_CONTENT_CHARS)
}

/// Suitability with an explicit threshold: the thread body, or any single
/// post body, must be longer than `min_chars` characters.
pub fn is_suitable_with_threshold(thread: &Thread, posts: &[Post], min_chars: usize) -> bool {
    let long_enough = |body: &str| body.chars().count() > min_chars;
    long_enough(&thread.body) || posts.iter().any(|p| long_enough(&p.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorCategory;

    fn thread(body: &str) -> Thread {
        Thread::new("t", body, Utc::now())
    }

    #[test]
    fn blank_thread_id_reads_this_thread() {
        let err = ProcessedError::new(ErrorCategory::Unknown, None);
        let fb = build_fallback(&err, Some("  "));
        assert!(fb.data.summary[0].contains("this thread"));
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(!is_suitable_for_analysis(&thread(&"x".repeat(50)), &[]));
        assert!(is_suitable_for_analysis(&thread(&"x".repeat(51)), &[]));
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 26 two-byte characters: 52 bytes, but only 26 chars.
        assert!(!is_suitable_for_analysis(&thread(&"é".repeat(26)), &[]));
    }

    #[test]
    fn custom_threshold() {
        assert!(is_suitable_with_threshold(&thread("hello world"), &[], 5));
        assert!(!is_suitable_with_threshold(&thread("hello"), &[], 5));
    }

    #[test]
    fn fallback_serialises_flat() {
        let err = ProcessedError::new(ErrorCategory::Network, None);
        let fb = build_fallback(&err, Some("t9"));
        let value = serde_json::to_value(&fb).unwrap();
        assert_eq!(value["healthScore"], 5);
        assert_eq!(value["threadStats"]["postCount"], 0);
        assert!(value["summary"][0].as_str().unwrap().contains("t9"));
    }
}
