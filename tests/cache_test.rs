//! Tests for [`SummaryCache`] — freshness-keyed TTL cache.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use huginn::{
    CacheConfig, Contributor, HealthLabel, HealthScore, ManualClock, Post, Sentiment,
    SummaryCache, SummaryData, Thread, build_key, last_post_timestamp,
};

fn make_summary(tag: &str) -> SummaryData {
    SummaryData {
        summary: vec![format!("{tag} summary"), "second line".into()],
        key_points: vec!["point one".into()],
        contributors: vec![Contributor::new("ada", "asked the question")],
        sentiment: Sentiment::Positive,
        health_score: HealthScore::new(8).unwrap(),
        health_label: HealthLabel::Healthy,
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn cache_at_t0(config: CacheConfig) -> (SummaryCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    (SummaryCache::with_clock(config, clock.clone()), clock)
}

// =========================================================================
// CacheConfig
// =========================================================================

#[test]
fn cache_config_defaults() {
    let config = CacheConfig::default();
    assert_eq!(config.max_entries, 1_000);
    assert_eq!(config.ttl, Duration::from_secs(24 * 3600));
}

#[test]
fn cache_config_builder() {
    let config = CacheConfig::new()
        .max_entries(500)
        .ttl(Duration::from_secs(60));
    assert_eq!(config.max_entries, 500);
    assert_eq!(config.ttl, Duration::from_secs(60));
}

// =========================================================================
// Round trip
// =========================================================================

#[test]
fn cache_miss_returns_none() {
    let cache = SummaryCache::new(CacheConfig::default());
    assert!(cache.get("t1", "1704067200000").is_none());
}

#[test]
fn set_then_get_round_trips() {
    let (cache, _) = cache_at_t0(CacheConfig::default());
    let data = make_summary("t1");
    cache.set("t1", "1704067200000", data.clone());

    let entry = cache.get("t1", "1704067200000").expect("cache hit");
    assert_eq!(entry.data, data);
    assert_eq!(entry.key, "summary_t1_1704067200000");
    assert_eq!(entry.generated_at, t0());
    assert_eq!(entry.expires_at, t0() + chrono::TimeDelta::hours(24));
}

#[test]
fn different_timestamp_is_miss() {
    let (cache, _) = cache_at_t0(CacheConfig::default());
    cache.set("t1", "100", make_summary("t1"));
    assert!(cache.get("t1", "101").is_none());
}

#[test]
fn different_thread_is_miss() {
    let (cache, _) = cache_at_t0(CacheConfig::default());
    cache.set("t1", "100", make_summary("t1"));
    assert!(cache.get("t2", "100").is_none());
}

#[test]
fn last_writer_wins() {
    let (cache, _) = cache_at_t0(CacheConfig::default());
    cache.set("t1", "100", make_summary("first"));
    cache.set("t1", "100", make_summary("second"));
    let entry = cache.get("t1", "100").unwrap();
    assert_eq!(entry.data.summary[0], "second summary");
}

// =========================================================================
// TTL
// =========================================================================

#[test]
fn entry_alive_just_before_ttl() {
    let ttl = Duration::from_secs(3600);
    let (cache, clock) = cache_at_t0(CacheConfig::new().ttl(ttl));
    cache.set("t1", "100", make_summary("t1"));

    clock.advance(ttl - Duration::from_secs(1));
    assert!(cache.get("t1", "100").is_some());
}

#[test]
fn entry_gone_just_after_ttl() {
    let ttl = Duration::from_secs(3600);
    let (cache, clock) = cache_at_t0(CacheConfig::new().ttl(ttl));
    cache.set("t1", "100", make_summary("t1"));

    clock.advance(ttl + Duration::from_secs(1));
    assert!(cache.get("t1", "100").is_none());
}

#[test]
fn entry_gone_exactly_at_ttl() {
    let ttl = Duration::from_secs(60);
    let (cache, clock) = cache_at_t0(CacheConfig::new().ttl(ttl));
    cache.set("t1", "100", make_summary("t1"));

    clock.advance(ttl);
    assert!(cache.get("t1", "100").is_none());
}

#[test]
fn rewrite_restarts_ttl() {
    let ttl = Duration::from_secs(60);
    let (cache, clock) = cache_at_t0(CacheConfig::new().ttl(ttl));
    cache.set("t1", "100", make_summary("t1"));
    clock.advance(Duration::from_secs(50));
    cache.set("t1", "100", make_summary("t1"));
    clock.advance(Duration::from_secs(50));
    assert!(cache.get("t1", "100").is_some());
}

// =========================================================================
// Eviction
// =========================================================================

#[test]
fn eviction_keeps_most_recent_inserts() {
    let max = 10;
    let extra = 5;
    let (cache, clock) = cache_at_t0(CacheConfig::new().max_entries(max));

    for i in 0..max + extra {
        cache.set(&format!("t{i}"), "100", make_summary("x"));
        clock.advance(Duration::from_millis(1));
    }

    assert_eq!(cache.len(), max);
    for i in 0..extra {
        assert!(cache.get(&format!("t{i}"), "100").is_none(), "t{i} should be evicted");
    }
    for i in extra..max + extra {
        assert!(cache.get(&format!("t{i}"), "100").is_some(), "t{i} should remain");
    }
}

#[test]
fn eviction_at_default_capacity_with_frozen_clock() {
    // All inserts share one timestamp; insertion order breaks the tie.
    let (cache, _) = cache_at_t0(CacheConfig::default());
    let max = CacheConfig::default().max_entries;
    let extra = 3;

    for i in 0..max + extra {
        cache.set(&format!("t{i}"), "1", make_summary("x"));
    }

    assert_eq!(cache.len(), max);
    let retrievable = (0..max + extra)
        .filter(|i| cache.get(&format!("t{i}"), "1").is_some())
        .count();
    assert_eq!(retrievable, max);
    assert!(cache.get("t0", "1").is_none());
    assert!(cache.get(&format!("t{}", max + extra - 1), "1").is_some());
}

#[test]
fn clear_empties_cache() {
    let (cache, _) = cache_at_t0(CacheConfig::default());
    cache.set("a", "1", make_summary("a"));
    cache.set("b", "1", make_summary("b"));
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get("a", "1").is_none());
}

// =========================================================================
// Freshness scenario
// =========================================================================

#[test]
fn new_reply_invalidates_cached_summary() {
    let (cache, _) = cache_at_t0(CacheConfig::default());
    let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);

    let thread = Thread::new("t1", "opening post", at("2024-01-01T09:00:00Z"));
    let mut posts = vec![
        Post::new("p1", "first reply", at("2024-01-01T10:00:00Z")),
        Post::new("p2", "second reply", at("2024-01-01T12:00:00Z")),
    ];

    let ts = last_post_timestamp(&thread, &posts);
    let noon_ms = at("2024-01-01T12:00:00Z").timestamp_millis().to_string();
    assert_eq!(ts, noon_ms);

    cache.set("t1", &ts, make_summary("t1"));
    let entry = cache.get("t1", &noon_ms).expect("hit at same freshness");
    assert_eq!(entry.key, build_key("t1", &noon_ms));

    posts.push(Post::new("p3", "late reply", at("2024-01-01T15:30:00Z")));
    let newer = last_post_timestamp(&thread, &posts);
    assert_ne!(newer, ts);
    assert!(cache.get("t1", &newer).is_none());
}

// =========================================================================
// Concurrency
// =========================================================================

#[test]
fn thread_safety() {
    let cache = Arc::new(SummaryCache::new(CacheConfig::default()));
    let mut handles = Vec::new();

    // Spawn writers
    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            cache.set(&format!("t{i}"), "1", make_summary("x"));
        }));
    }

    // Spawn concurrent readers
    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            // May or may not see the entry yet — shouldn't panic
            let _ = cache.get(&format!("t{i}"), "1");
        }));
    }

    for h in handles {
        h.join().expect("thread panicked");
    }

    // After all writers finish, all entries should be present
    for i in 0..10 {
        assert!(cache.get(&format!("t{i}"), "1").is_some());
    }
}

#[test]
fn concurrent_inserts_respect_capacity() {
    let max = 16;
    let cache = Arc::new(SummaryCache::new(CacheConfig::new().max_entries(max)));
    let handles: Vec<_> = (0..8)
        .map(|w| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..50 {
                    cache.set(&format!("w{w}-{i}"), "1", make_summary("x"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("thread panicked");
    }
    assert_eq!(cache.len(), max);
}

// =========================================================================
// Sweeper
// =========================================================================

#[tokio::test(start_paused = true)]
async fn sweeper_reclaims_expired_entries() {
    let clock = Arc::new(ManualClock::new(t0()));
    let cache = Arc::new(SummaryCache::with_clock(
        CacheConfig::new().ttl(Duration::from_secs(60)),
        clock.clone(),
    ));
    cache.set("t1", "1", make_summary("x"));
    let handle = cache.spawn_sweeper(Duration::from_secs(30));

    clock.advance(Duration::from_secs(61));
    tokio::time::sleep(Duration::from_secs(31)).await;
    tokio::task::yield_now().await;

    assert!(cache.is_empty());
    handle.abort();
}

// =========================================================================
// Metrics
// =========================================================================

#[test]
fn metrics_with_recorder() {
    use metrics_util::MetricKind;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let (cache, _) = cache_at_t0(CacheConfig::new().max_entries(1));
        cache.get("t1", "1");
        cache.set("t1", "1", make_summary("x"));
        cache.get("t1", "1");
        cache.set("t2", "1", make_summary("y"));
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let counter = |name: &str| -> u64 {
        snapshot
            .iter()
            .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
            .map(|(_, _, _, val)| match val {
                DebugValue::Counter(c) => *c,
                _ => 0,
            })
            .sum()
    };

    assert_eq!(counter(huginn::telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter(huginn::telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(counter(huginn::telemetry::CACHE_EVICTIONS_TOTAL), 1);
}
