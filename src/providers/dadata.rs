//! DaData `findById/party` client.
//!
//! See: <https://dadata.ru/api/find-party/>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::traits::PartyProvider;
use crate::telemetry;
use crate::types::{LookupQuery, Record};
use crate::{KontragentError, Result};

/// Default `findById/party` endpoint.
pub const DEFAULT_FIND_URL: &str =
    "https://suggestions.dadata.ru/suggestions/api/4_1/rs/findById/party";

/// Default total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest slice of an error body kept for logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Client for the DaData party lookup endpoint.
#[derive(Clone)]
pub struct DadataClient {
    api_key: String,
    http: Client,
    find_url: String,
    timeout: Duration,
}

impl DadataClient {
    /// Create a client for the public endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_FIND_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client for a custom endpoint (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        find_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| KontragentError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self::with_http_client(api_key, find_url, http, timeout))
    }

    /// Create a client sharing an existing connection pool.
    ///
    /// `timeout` bounds each request, so clients with different budgets can
    /// share one pool.
    pub fn with_http_client(
        api_key: impl Into<String>,
        find_url: impl Into<String>,
        http: Client,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http,
            find_url: find_url.into(),
            timeout,
        }
    }

    async fn post(&self, query: &LookupQuery) -> Result<Vec<Record>> {
        let response = self
            .http
            .post(&self.find_url)
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&query.to_request_body())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, retry_after, &body));
        }

        let body = response.text().await?;
        let parsed: FindByIdResponse = serde_json::from_str(&body)?;
        let suggestions = parsed.suggestions.unwrap_or_default();
        debug!(
            identifier = %query.identifier,
            count = suggestions.len(),
            "dadata response"
        );
        Ok(suggestions)
    }
}

/// Map a non-200 status to an error, keeping a bounded slice of the body.
fn error_for_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> KontragentError {
    match status.as_u16() {
        401 | 403 => KontragentError::AuthenticationFailed,
        429 => KontragentError::RateLimited { retry_after },
        code => KontragentError::Api {
            status: code,
            message: body.chars().take(ERROR_BODY_LIMIT).collect(),
        },
    }
}

#[derive(Deserialize)]
struct FindByIdResponse {
    #[serde(default)]
    suggestions: Option<Vec<Record>>,
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl PartyProvider for DadataClient {
    fn name(&self) -> &str {
        "dadata"
    }

    async fn find_by_id(&self, query: &LookupQuery) -> Result<Vec<Record>> {
        let result = self.post(query).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => "dadata",
            "status" => status,
        )
        .increment(1);
        result
    }
}
