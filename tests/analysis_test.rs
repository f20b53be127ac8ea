//! Wiremock integration tests for the AI mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kontragent::lookup::analysis::ANALYSIS_FAILED_MESSAGE;
use kontragent::providers::{AnalysisProvider, McpToolConfig, OpenAiMcpClient};
use kontragent::{AnalysisClient, CacheRegistry, KontragentError, Result};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tool() -> McpToolConfig {
    McpToolConfig {
        server_url: "https://mcp.example.test/mcp".to_string(),
        dadata_api_key: "dd_api".to_string(),
        dadata_secret_key: "dd_secret".to_string(),
    }
}

fn openai(server: &MockServer) -> OpenAiMcpClient {
    OpenAiMcpClient::with_base_url("sk-test", server.uri(), tool(), Duration::from_secs(5))
        .expect("client should build")
}

/// Test the Responses API request and `output_text` extraction.
#[tokio::test]
async fn test_analyze_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-mini",
            "tools": [{
                "type": "mcp",
                "server_label": "dadata",
                "server_url": "https://mcp.example.test/mcp",
                "headers": {"authorization": "Bearer dd_api:dd_secret"},
                "require_approval": "never"
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"output_text": "Verdict: normal.\nStatus: active."})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = openai(&mock_server).analyze("7707083893").await.unwrap();
    assert_eq!(text, "Verdict: normal.\nStatus: active.");
}

/// Test that the configured model is sent.
#[tokio::test]
async fn test_model_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(body_partial_json(json!({"model": "gpt-4.1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "ok"}]}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = openai(&mock_server)
        .model("gpt-4.1")
        .analyze("7707083893")
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

/// Test error mapping of the provider.
#[tokio::test]
async fn test_analyze_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&mock_server)
        .await;

    let err = openai(&mock_server).analyze("7707083893").await.unwrap_err();
    assert!(matches!(err, KontragentError::AuthenticationFailed));
}

/// Test that an answer without text blocks is shown raw.
#[tokio::test]
async fn test_raw_output_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "  "})))
        .mount(&mock_server)
        .await;

    // `output` is a non-null string, so the raw fallback still yields text
    let text = openai(&mock_server).analyze("7707083893").await.unwrap();
    assert_eq!(text, "\"  \"");
}

/// Test caching of successful analyses through AnalysisClient.
#[tokio::test]
async fn test_analysis_is_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output_text": "fine"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AnalysisClient::new(
        Arc::new(openai(&mock_server)),
        Arc::new(CacheRegistry::default()),
        2,
    );
    assert_eq!(client.analyze("7707083893").await, "fine");
    assert_eq!(client.analyze(" 7707083893 ").await, "fine");
}

/// Test that failures give the user message and are retried next time.
#[tokio::test]
async fn test_failure_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let caches = Arc::new(CacheRegistry::default());
    let client = AnalysisClient::new(Arc::new(openai(&mock_server)), caches.clone(), 2);
    assert_eq!(client.analyze("7707083893").await, ANALYSIS_FAILED_MESSAGE);
    assert_eq!(client.analyze("7707083893").await, ANALYSIS_FAILED_MESSAGE);
    assert!(caches.analysis.is_empty());
}

/// Test the message naming missing keys.
#[tokio::test]
async fn test_unavailable_names_missing_keys() {
    let client = AnalysisClient::unavailable(
        vec!["DADATA_SECRET_KEY", "OPENAI_API_KEY"],
        Arc::new(CacheRegistry::default()),
    );
    let text = client.analyze("7707083893").await;
    assert!(text.contains("AI mode unavailable, missing: DADATA_SECRET_KEY, OPENAI_API_KEY"));
    assert!(matches!(
        client.availability(),
        Err(KontragentError::MissingCredentials(missing)) if missing.len() == 2
    ));
}

/// Model that takes a while to answer and records the peak number of
/// requests in flight.
#[derive(Default)]
struct SlowModel {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl AnalysisProvider for SlowModel {
    fn name(&self) -> &str {
        "slow"
    }

    async fn analyze(&self, identifier: &str) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("analysis of {identifier}"))
    }
}

/// Test that concurrent analyses never exceed the configured limit.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_is_capped() {
    const MAX_CONCURRENT: usize = 2;

    let model = Arc::new(SlowModel::default());
    let client = Arc::new(AnalysisClient::new(
        model.clone(),
        Arc::new(CacheRegistry::default()),
        MAX_CONCURRENT,
    ));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..MAX_CONCURRENT + 3 {
        let client = client.clone();
        tasks.spawn(async move {
            let identifier = format!("77070838{i:02}");
            let text = client.analyze(&identifier).await;
            assert_eq!(text, format!("analysis of {identifier}"));
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert_eq!(model.peak.load(Ordering::SeqCst), MAX_CONCURRENT);
}
