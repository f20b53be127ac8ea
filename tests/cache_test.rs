//! Tests for [`TtlCache`] — expiry on a paused clock, capacity sweeps and
//! cache metrics.

use std::time::Duration;

use kontragent::cache::{CacheConfig, CacheRegistry, TtlCache};
use kontragent::telemetry;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

fn cache(ttl_secs: u64, max_items: usize) -> TtlCache<String, u32> {
    TtlCache::new(
        "test",
        CacheConfig::new()
            .ttl(Duration::from_secs(ttl_secs))
            .max_items(max_items),
    )
}

#[tokio::test(start_paused = true)]
async fn value_within_ttl_is_returned() {
    let cache = cache(60, 10);
    cache.set("a".into(), 1);

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(cache.get(&"a".into()), Some(1));
}

#[tokio::test(start_paused = true)]
async fn value_after_ttl_is_gone() {
    let cache = cache(60, 10);
    cache.set("a".into(), 1);

    tokio::time::advance(Duration::from_secs(60)).await;
    assert_eq!(cache.get(&"a".into()), None);
    // the expired entry was purged by the read
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn overwrite_restarts_ttl() {
    let cache = cache(60, 10);
    cache.set("a".into(), 1);
    tokio::time::advance(Duration::from_secs(40)).await;
    cache.set("a".into(), 2);
    tokio::time::advance(Duration::from_secs(40)).await;

    assert_eq!(cache.get(&"a".into()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn sweep_prefers_expired_entries() {
    let cache = cache(60, 3);
    cache.set("old1".into(), 1);
    cache.set("old2".into(), 2);
    tokio::time::advance(Duration::from_secs(30)).await;
    cache.set("fresh".into(), 3);
    tokio::time::advance(Duration::from_secs(31)).await;

    cache.set("new".into(), 4);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&"fresh".into()), Some(3));
    assert_eq!(cache.get(&"new".into()), Some(4));
}

#[test]
fn capacity_is_bounded() {
    let cache = cache(3600, 20);
    for i in 0..100u32 {
        cache.set(format!("k{i}"), i);
        assert!(cache.len() <= 20);
    }
    // the latest insert always survives
    assert_eq!(cache.get(&"k99".into()), Some(99));
}

#[test]
fn capacity_of_one_still_stores() {
    let cache = cache(3600, 1);
    cache.set("a".into(), 1);
    cache.set("b".into(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"b".into()), Some(2));
}

#[test]
fn registry_namespaces_are_independent() {
    let registry = CacheRegistry::default();
    registry.party.set("7707083893".into(), None);
    registry.analysis.set("7707083893".into(), "text".into());

    assert_eq!(registry.party.get(&"7707083893".into()), Some(None));
    assert!(registry.branches.get(&"7707083893".into()).is_none());

    registry.clear();
    assert!(registry.party.is_empty());
    assert!(registry.analysis.is_empty());
}

#[test]
fn hits_and_misses_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let cache = cache(3600, 10);
        cache.set("a".into(), 1);
        cache.get(&"a".into());
        cache.get(&"a".into());
        cache.get(&"b".into());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let counter = |name: &str| -> u64 {
        snapshot
            .iter()
            .filter(|(key, _, _, _)| {
                key.kind() == MetricKind::Counter
                    && key.key().name() == name
                    && key.key().labels().any(|l| l.key() == "cache" && l.value() == "test")
            })
            .map(|(_, _, _, value)| match value {
                DebugValue::Counter(v) => *v,
                _ => 0,
            })
            .sum()
    };
    assert_eq!(counter(telemetry::CACHE_HITS_TOTAL), 2);
    assert_eq!(counter(telemetry::CACHE_MISSES_TOTAL), 1);
}
