//! OpenAI Responses API client with the DaData MCP server attached as a tool.
//!
//! The model calls the registry itself through the remote MCP tool; this
//! client only sends the prompt and pulls the text out of the response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::traits::AnalysisProvider;
use crate::telemetry;
use crate::{KontragentError, Result};

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default DaData MCP endpoint.
pub const DEFAULT_MCP_SERVER_URL: &str = "https://mcp.dadata.ru/mcp";

/// Tool calls make these requests slow; the budget is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Credentials and endpoint of the remote registry tool.
#[derive(Debug, Clone)]
pub struct McpToolConfig {
    pub server_url: String,
    pub dadata_api_key: String,
    pub dadata_secret_key: String,
}

/// Client for `POST /responses` with a single MCP tool.
#[derive(Clone)]
pub struct OpenAiMcpClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    tool: McpToolConfig,
    timeout: Duration,
}

impl OpenAiMcpClient {
    /// Create a client for the public API with default model and timeout.
    pub fn new(api_key: impl Into<String>, tool: McpToolConfig) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, tool, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        tool: McpToolConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| KontragentError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self::with_http_client(api_key, base_url, tool, http, timeout))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_http_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        tool: McpToolConfig,
        http: Client,
        timeout: Duration,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            tool,
            timeout,
        }
    }

    /// Override the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn create_response(&self, identifier: &str) -> Result<String> {
        let url = format!("{}/responses", self.base_url.trim_end_matches('/'));
        let authorization = format!(
            "Bearer {}:{}",
            self.tool.dadata_api_key, self.tool.dadata_secret_key
        );
        let prompt = analysis_prompt(identifier);
        let request = ResponsesRequest {
            model: &self.model,
            input: &prompt,
            tools: [McpTool {
                kind: "mcp",
                server_label: "dadata",
                server_url: &self.tool.server_url,
                headers: McpHeaders {
                    authorization: &authorization,
                },
                require_approval: "never",
            }],
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => KontragentError::AuthenticationFailed,
                429 => KontragentError::RateLimited { retry_after: None },
                code => KontragentError::Api {
                    status: code,
                    message: body.chars().take(500).collect(),
                },
            });
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        let text = extract_output_text(&body);
        if text.is_empty() {
            return Err(KontragentError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Prompt sent to the model.
pub fn analysis_prompt(identifier: &str) -> String {
    format!(
        "Check the counterparty with INN/OGRN {identifier}. \
         Start with a short verdict (risk/normal), then list the facts: status, \
         registration/liquidation, address, management, OKVED, capital, branches, contacts. \
         Do not invent anything: if data is missing, write 'no data'."
    )
}

/// Pull the answer text out of a Responses API payload.
///
/// Prefers the aggregated `output_text`; otherwise concatenates the `text`
/// of every content block in `output`; if there is none, the raw `output`
/// (or the whole payload) is stringified so the user still sees something.
pub fn extract_output_text(response: &Value) -> String {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return text.trim().to_string();
        }
    }

    let joined: String = response
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();
    let joined = joined.trim();
    if !joined.is_empty() {
        return joined.to_string();
    }

    match response.get("output") {
        Some(output) if !output.is_null() => output.to_string(),
        _ => response.to_string(),
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: [McpTool<'a>; 1],
}

#[derive(Serialize)]
struct McpTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    server_label: &'static str,
    server_url: &'a str,
    headers: McpHeaders<'a>,
    require_approval: &'static str,
}

#[derive(Serialize)]
struct McpHeaders<'a> {
    authorization: &'a str,
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl AnalysisProvider for OpenAiMcpClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn analyze(&self, identifier: &str) -> Result<String> {
        let result = self.create_response(identifier).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => "openai",
            "status" => status,
        )
        .increment(1);
        result
    }
}
