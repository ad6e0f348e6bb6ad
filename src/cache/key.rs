//! Freshness keys.
//!
//! A summary is cached under `summary_<threadId>_<lastPostTimestamp>`. Any
//! new or edited post moves the last-post timestamp, which moves the key, so
//! stale summaries simply stop being found. Nothing is ever invalidated
//! explicitly.
//!
//! Thread ids are not escaped. An id containing `_` can in principle collide
//! with a different `(id, timestamp)` pair (`a_1` + `2` vs `a` + `1_2`); with
//! numeric millisecond timestamps this needs a pathological id and is
//! accepted as a known limitation.

use crate::types::{Post, Thread};

const KEY_PREFIX: &str = "summary";

/// Build the cache key for a thread at a given freshness point.
///
/// Pure and deterministic: the output depends on nothing but the inputs.
pub fn build_key(thread_id: &str, last_post_timestamp: &str) -> String {
    format!("{KEY_PREFIX}_{thread_id}_{last_post_timestamp}")
}

/// Freshness timestamp for a thread, in epoch milliseconds.
///
/// The newest post's `created_at` when there are posts, otherwise the
/// thread's own `created_at`.
pub fn last_post_timestamp(thread: &Thread, posts: &[Post]) -> String {
    posts
        .iter()
        .map(|p| p.created_at)
        .max()
        .unwrap_or(thread.created_at)
        .timestamp_millis()
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn key_format() {
        assert_eq!(build_key("t1", "1704110400000"), "summary_t1_1704110400000");
    }

    #[test]
    fn key_deterministic() {
        assert_eq!(build_key("abc", "42"), build_key("abc", "42"));
    }

    #[test]
    fn key_differs_on_timestamp() {
        assert_ne!(build_key("abc", "42"), build_key("abc", "43"));
    }

    #[test]
    fn key_differs_on_thread() {
        assert_ne!(build_key("abc", "42"), build_key("abd", "42"));
    }

    #[test]
    fn timestamp_uses_newest_post() {
        let thread = Thread::new("t1", "body", at("2024-01-01T09:00:00Z"));
        let posts = vec![
            Post::new("p2", "later", at("2024-01-01T12:00:00Z")),
            Post::new("p1", "earlier", at("2024-01-01T10:00:00Z")),
        ];
        assert_eq!(last_post_timestamp(&thread, &posts), "1704110400000");
    }

    #[test]
    fn timestamp_falls_back_to_thread_creation() {
        let thread = Thread::new("t1", "body", at("2024-01-01T09:00:00Z"));
        assert_eq!(last_post_timestamp(&thread, &[]), "1704099600000");
    }
}
