//! Tests for metrics emitted by the upstream clients and the lookup layer.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::time::Duration;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use kontragent::providers::DadataClient;
use kontragent::{CacheRegistry, LookupClient, telemetry};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum counter values for `name` whose labels include every `(key, value)`.
fn counter_total(snapshot: &SnapshotVec, name: &str, labels: &[(&str, &str)]) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            labels.iter().all(|(k, v)| {
                key.key()
                    .labels()
                    .any(|label| label.key() == *k && label.value() == *v)
            })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn lookup_client(server: &MockServer) -> LookupClient {
    let dadata = DadataClient::with_base_url("test_key", server.uri(), Duration::from_secs(5))
        .expect("client should build");
    LookupClient::new(Arc::new(dadata), Arc::new(CacheRegistry::default()), 5)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` keeps the sync `with_local_recorder` closure on the
/// current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn successful_lookup_records_request_and_cache_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [{"value": "ООО ТЕСТ", "data": {"inn": "7707083893"}}]
        })))
        .mount(&server)
        .await;
    let client = lookup_client(&server);

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                assert!(client.fetch_company("7707083893").await.is_some());
                assert!(client.fetch_company("7707083893").await.is_some());
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_total(
            &snapshot,
            telemetry::REQUESTS_TOTAL,
            &[("provider", "dadata"), ("status", "ok")]
        ),
        1,
        "second lookup should be served from cache"
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL, &[("cache", "party")]),
        1
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL, &[("cache", "party")]),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn failed_lookup_records_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let client = lookup_client(&server);

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                assert!(client.fetch_company("7707083893").await.is_none());
                assert!(client.fetch_company("7707083893").await.is_none());
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();
    // failures are not cached, so both calls go upstream
    assert_eq!(
        counter_total(
            &snapshot,
            telemetry::REQUESTS_TOTAL,
            &[("provider", "dadata"), ("status", "error")]
        ),
        2
    );
    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL, &[("status", "ok")]),
        0
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"suggestions": []})))
        .mount(&server)
        .await;

    assert!(lookup_client(&server).fetch_company("7707083893").await.is_none());
}
