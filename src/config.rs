//! Configuration loading.
//!
//! Settings come from a TOML file, resolved in this order:
//! 1. an explicit path (`--config <path>`)
//! 2. `~/.kontragent/config.toml` (user)
//! 3. `/etc/kontragent/config.toml` (system)
//!
//! With no file at all the built-in defaults apply. Every key is optional.
//!
//! API keys are never read from the file; [`Secrets`] takes them from the
//! environment.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheConfig, CacheSettings};
use crate::chunk::{DEFAULT_CHUNK_LIMIT, TRANSPORT_LIMIT};
use crate::format::DEFAULT_MAX_LINES;
use crate::providers::{dadata, openai};
use crate::validate::{DEFAULT_MAX_ITEMS, Strictness};
use crate::{KontragentError, Result};

/// Environment variable with the DaData API key.
pub const DADATA_API_KEY_ENV: &str = "DADATA_API_KEY";
/// Environment variable with the DaData secret key (AI mode only).
pub const DADATA_SECRET_KEY_ENV: &str = "DADATA_SECRET_KEY";
/// Environment variable with the OpenAI API key (AI mode only).
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dadata: DadataConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Registry endpoint and limits.
#[derive(Debug, Clone, Deserialize)]
pub struct DadataConfig {
    #[serde(default = "default_find_url")]
    pub find_url: String,
    /// Total request timeout in seconds (default: 15).
    #[serde(default = "default_dadata_timeout")]
    pub timeout_secs: u64,
    /// Concurrent registry requests (default: 5).
    #[serde(default = "default_dadata_concurrency")]
    pub max_concurrent: usize,
}

impl Default for DadataConfig {
    fn default() -> Self {
        Self {
            find_url: default_find_url(),
            timeout_secs: default_dadata_timeout(),
            max_concurrent: default_dadata_concurrency(),
        }
    }
}

impl DadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_find_url() -> String {
    dadata::DEFAULT_FIND_URL.to_string()
}

fn default_dadata_timeout() -> u64 {
    dadata::DEFAULT_TIMEOUT.as_secs()
}

fn default_dadata_concurrency() -> usize {
    crate::lookup::DEFAULT_MAX_CONCURRENT
}

/// AI-mode endpoint, model and limits.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_mcp_server_url")]
    pub mcp_server_url: String,
    /// Total request timeout in seconds (default: 120).
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
    /// Concurrent AI requests (default: 2).
    #[serde(default = "default_ai_concurrency")]
    pub max_concurrent: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            mcp_server_url: default_mcp_server_url(),
            timeout_secs: default_ai_timeout(),
            max_concurrent: default_ai_concurrency(),
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_ai_base_url() -> String {
    openai::DEFAULT_BASE_URL.to_string()
}

fn default_ai_model() -> String {
    openai::DEFAULT_MODEL.to_string()
}

fn default_mcp_server_url() -> String {
    openai::DEFAULT_MCP_SERVER_URL.to_string()
}

fn default_ai_timeout() -> u64 {
    openai::DEFAULT_TIMEOUT.as_secs()
}

fn default_ai_concurrency() -> usize {
    crate::lookup::analysis::DEFAULT_MAX_CONCURRENT
}

/// `[cache.party]`, `[cache.branches]`, `[cache.analysis]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSection {
    #[serde(default)]
    pub party: Option<CacheNamespaceConfig>,
    #[serde(default)]
    pub branches: Option<CacheNamespaceConfig>,
    #[serde(default)]
    pub analysis: Option<CacheNamespaceConfig>,
}

/// Overrides for one cache namespace; unset keys keep the namespace default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheNamespaceConfig {
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl CacheNamespaceConfig {
    fn apply(&self, mut base: CacheConfig) -> CacheConfig {
        if let Some(ttl) = self.ttl_secs {
            base = base.ttl(Duration::from_secs(ttl));
        }
        if let Some(max_items) = self.max_items {
            base = base.max_items(max_items);
        }
        base
    }
}

impl CacheSection {
    /// Namespace settings with the overrides applied.
    pub fn settings(&self) -> CacheSettings {
        let defaults = CacheSettings::default();
        let apply = |section: &Option<CacheNamespaceConfig>, base: CacheConfig| match section {
            Some(section) => section.apply(base),
            None => base,
        };
        CacheSettings {
            party: apply(&self.party, defaults.party),
            branches: apply(&self.branches, defaults.branches),
            analysis: apply(&self.analysis, defaults.analysis),
        }
    }
}

/// Presentation and input handling.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Maximum characters per message (default: 4000).
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
    /// Field lines on the raw page (default: 120).
    #[serde(default = "default_raw_dump_max_lines")]
    pub raw_dump_max_lines: usize,
    /// Verify INN check digits, not just the format (default: false).
    #[serde(default)]
    pub strict_checksum: bool,
    /// Identifiers taken from one message (default: 50).
    #[serde(default = "default_max_identifiers")]
    pub max_identifiers: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chunk_limit: default_chunk_limit(),
            raw_dump_max_lines: default_raw_dump_max_lines(),
            strict_checksum: false,
            max_identifiers: default_max_identifiers(),
        }
    }
}

impl DisplayConfig {
    pub fn strictness(&self) -> Strictness {
        if self.strict_checksum {
            Strictness::Checksum
        } else {
            Strictness::Format
        }
    }
}

fn default_chunk_limit() -> usize {
    DEFAULT_CHUNK_LIMIT
}

fn default_raw_dump_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

fn default_max_identifiers() -> usize {
    DEFAULT_MAX_ITEMS
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist; otherwise the first existing standard
    /// location is used, and defaults when there is none.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse one TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KontragentError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            KontragentError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the crate cannot honour.
    ///
    /// `display.chunk_limit` must be at least 1 and below [`TRANSPORT_LIMIT`].
    pub fn validate(&self) -> Result<()> {
        let limit = self.display.chunk_limit;
        if limit == 0 || limit >= TRANSPORT_LIMIT {
            return Err(KontragentError::Configuration(format!(
                "display.chunk_limit must be between 1 and {}, got {limit}",
                TRANSPORT_LIMIT - 1
            )));
        }
        Ok(())
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(KontragentError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".kontragent").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/kontragent/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

/// API keys taken from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub dadata_api_key: Option<String>,
    pub dadata_secret_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Secrets")
            .field("dadata_api_key", &mask(&self.dadata_api_key))
            .field("dadata_secret_key", &mask(&self.dadata_secret_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .finish()
    }
}

impl Secrets {
    /// Read the three keys from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read keys through `lookup`; blank values count as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            dadata_api_key: read(DADATA_API_KEY_ENV),
            dadata_secret_key: read(DADATA_SECRET_KEY_ENV),
            openai_api_key: read(OPENAI_API_KEY_ENV),
        }
    }

    /// Names of the keys the AI mode needs but does not have.
    pub fn missing_for_analysis(&self) -> Vec<&'static str> {
        [
            (DADATA_API_KEY_ENV, &self.dadata_api_key),
            (DADATA_SECRET_KEY_ENV, &self.dadata_secret_key),
            (OPENAI_API_KEY_ENV, &self.openai_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.dadata.timeout_secs, 15);
        assert_eq!(config.dadata.max_concurrent, 5);
        assert_eq!(config.ai.model, "gpt-4.1-mini");
        assert_eq!(config.ai.max_concurrent, 2);
        assert_eq!(config.display.chunk_limit, 4000);
        assert_eq!(config.display.strictness(), Strictness::Format);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [display]
            strict_checksum = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.display.strictness(), Strictness::Checksum);
        // Defaults preserved
        assert_eq!(config.display.raw_dump_max_lines, 120);
        assert_eq!(config.dadata.find_url, dadata::DEFAULT_FIND_URL);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [dadata]
            find_url = "http://localhost:8080/findById/party"
            timeout_secs = 5
            max_concurrent = 3

            [ai]
            base_url = "http://localhost:8081/v1"
            model = "gpt-4.1"
            mcp_server_url = "http://localhost:8082/mcp"
            timeout_secs = 60
            max_concurrent = 1

            [cache.party]
            ttl_secs = 60
            max_items = 10

            [cache.analysis]
            max_items = 7

            [display]
            chunk_limit = 1000
            raw_dump_max_lines = 20
            max_identifiers = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.dadata.timeout(), Duration::from_secs(5));
        assert_eq!(config.ai.model, "gpt-4.1");

        let caches = config.cache.settings();
        assert_eq!(caches.party.ttl, Duration::from_secs(60));
        assert_eq!(caches.party.max_items, 10);
        assert_eq!(caches.analysis.max_items, 7);
        assert_eq!(caches.analysis.ttl, Duration::from_secs(2 * 60 * 60));
        assert_eq!(caches.branches.max_items, 2000);

        assert_eq!(config.display.chunk_limit, 1000);
        assert_eq!(config.display.max_identifiers, 5);
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(toml::from_str::<Config>("[server]\naddress = \"x\"").is_err());
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dadata]\nmax_concurrent = 9\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.dadata.max_concurrent, 9);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/kontragent.toml"))).unwrap_err();
        assert!(matches!(err, KontragentError::Configuration(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dadata\n").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn chunk_limit_must_fit_the_transport() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for limit in [0, 4096, 10_000] {
            fs::write(&path, format!("[display]\nchunk_limit = {limit}\n")).unwrap();
            let err = Config::load_from_file(&path).unwrap_err();
            assert!(matches!(err, KontragentError::Configuration(_)));
            assert!(err.to_string().contains("chunk_limit"));
        }

        fs::write(&path, "[display]\nchunk_limit = 4095\n").unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap().display.chunk_limit, 4095);
    }

    #[test]
    fn secrets_trim_and_ignore_blank() {
        let env: HashMap<&str, &str> = HashMap::from([
            (DADATA_API_KEY_ENV, "  key  "),
            (DADATA_SECRET_KEY_ENV, "   "),
        ]);
        let secrets = Secrets::from_lookup(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(secrets.dadata_api_key.as_deref(), Some("key"));
        assert!(secrets.dadata_secret_key.is_none());
        assert_eq!(
            secrets.missing_for_analysis(),
            [DADATA_SECRET_KEY_ENV, OPENAI_API_KEY_ENV]
        );
    }

    #[test]
    fn debug_does_not_leak_keys() {
        let secrets = Secrets {
            dadata_api_key: Some("very-secret".into()),
            ..Secrets::default()
        };
        let shown = format!("{secrets:?}");
        assert!(!shown.contains("very-secret"));
        assert!(shown.contains("set"));
    }
}
