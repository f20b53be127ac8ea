//! Builder for configuring service instances

use std::sync::Arc;

use tracing::info;

use super::KontragentService;
use crate::cache::CacheRegistry;
use crate::config::{Config, DADATA_API_KEY_ENV, Secrets};
use crate::format::PartyStateTable;
use crate::lookup::{AnalysisClient, LookupClient};
use crate::providers::{
    AnalysisProvider, DadataClient, McpToolConfig, OpenAiMcpClient, PartyProvider,
};
use crate::{KontragentError, Result};

/// Main entry point for creating service instances.
pub struct Kontragent;

impl Kontragent {
    /// Create a new builder for configuring the service.
    pub fn builder() -> KontragentBuilder {
        KontragentBuilder::new()
    }
}

/// Builder for configuring service instances.
#[derive(Default)]
pub struct KontragentBuilder {
    config: Option<Config>,
    secrets: Option<Secrets>,
    party_provider: Option<Arc<dyn PartyProvider>>,
    analysis_provider: Option<Arc<dyn AnalysisProvider>>,
    party_states: Option<PartyStateTable>,
    http_client: Option<reqwest::Client>,
}

impl KontragentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration instead of the defaults.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use these keys instead of reading the environment at build time.
    pub fn secrets(mut self, secrets: Secrets) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Replace the DaData client with another registry provider.
    pub fn party_provider(mut self, provider: Arc<dyn PartyProvider>) -> Self {
        self.party_provider = Some(provider);
        self
    }

    /// Replace the OpenAI client with another analysis provider.
    pub fn analysis_provider(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.analysis_provider = Some(provider);
        self
    }

    /// Reason-code table for status lines (default: the process-wide one).
    pub fn party_states(mut self, table: PartyStateTable) -> Self {
        self.party_states = Some(table);
        self
    }

    /// Share an existing connection pool with the upstream clients.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the service.
    ///
    /// Fails with [`KontragentError::MissingCredentials`] when no registry
    /// provider was given and `DADATA_API_KEY` is not set. Missing AI keys
    /// do not fail the build; the AI mode reports them instead.
    pub fn build(self) -> Result<KontragentService> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let secrets = self.secrets.unwrap_or_else(Secrets::from_env);
        let caches = Arc::new(CacheRegistry::new(&config.cache.settings()));

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| KontragentError::Configuration(format!("HTTP client: {e}")))?,
        };

        let party_provider: Arc<dyn PartyProvider> = match self.party_provider {
            Some(provider) => provider,
            None => {
                let api_key = secrets
                    .dadata_api_key
                    .clone()
                    .ok_or_else(|| KontragentError::MissingCredentials(vec![DADATA_API_KEY_ENV]))?;
                Arc::new(DadataClient::with_http_client(
                    api_key,
                    config.dadata.find_url.clone(),
                    http_client.clone(),
                    config.dadata.timeout(),
                ))
            }
        };
        let lookup = LookupClient::new(
            party_provider,
            caches.clone(),
            config.dadata.max_concurrent,
        );

        let analysis = match self.analysis_provider {
            Some(provider) => AnalysisClient::new(provider, caches.clone(), config.ai.max_concurrent),
            None => match (
                &secrets.dadata_api_key,
                &secrets.dadata_secret_key,
                &secrets.openai_api_key,
            ) {
                (Some(dadata_api_key), Some(dadata_secret_key), Some(openai_api_key)) => {
                    let tool = McpToolConfig {
                        server_url: config.ai.mcp_server_url.clone(),
                        dadata_api_key: dadata_api_key.clone(),
                        dadata_secret_key: dadata_secret_key.clone(),
                    };
                    let client = OpenAiMcpClient::with_http_client(
                        openai_api_key.clone(),
                        config.ai.base_url.clone(),
                        tool,
                        http_client.clone(),
                        config.ai.timeout(),
                    )
                    .model(config.ai.model.clone());
                    AnalysisClient::new(Arc::new(client), caches.clone(), config.ai.max_concurrent)
                }
                _ => AnalysisClient::unavailable(secrets.missing_for_analysis(), caches.clone()),
            },
        };

        let party_states = self
            .party_states
            .unwrap_or_else(|| PartyStateTable::global().clone());

        info!(
            registry_concurrency = config.dadata.max_concurrent,
            ai_available = analysis.availability().is_ok(),
            reason_codes = party_states.len(),
            "kontragent service ready"
        );

        Ok(KontragentService {
            config,
            caches,
            lookup,
            analysis,
            party_states,
        })
    }
}
