//! AI-mode lookups: cached, tightly limited, always answering with text.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::cache::CacheRegistry;
use crate::providers::AnalysisProvider;
use crate::KontragentError;

/// Default number of concurrent AI requests.
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Shown when the model call fails; details go to the log only.
pub const ANALYSIS_FAILED_MESSAGE: &str = "❌ AI request failed, try again later.";

enum Backend {
    Ready(Arc<dyn AnalysisProvider>),
    Unavailable(Vec<&'static str>),
}

/// AI analysis with its own cache namespace and concurrency cap.
pub struct AnalysisClient {
    backend: Backend,
    caches: Arc<CacheRegistry>,
    permits: Semaphore,
}

impl AnalysisClient {
    /// Wrap a configured provider.
    pub fn new(
        provider: Arc<dyn AnalysisProvider>,
        caches: Arc<CacheRegistry>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            backend: Backend::Ready(provider),
            caches,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// A client that answers every request with the list of missing keys.
    pub fn unavailable(missing: Vec<&'static str>, caches: Arc<CacheRegistry>) -> Self {
        Self {
            backend: Backend::Unavailable(missing),
            caches,
            permits: Semaphore::new(1),
        }
    }

    /// `Err(MissingCredentials)` when the mode cannot run.
    pub fn availability(&self) -> crate::Result<()> {
        match &self.backend {
            Backend::Ready(_) => Ok(()),
            Backend::Unavailable(missing) => {
                Err(KontragentError::MissingCredentials(missing.clone()))
            }
        }
    }

    /// Analysis text for `identifier`, or a user-facing failure message.
    pub async fn analyze(&self, identifier: &str) -> String {
        let provider = match &self.backend {
            Backend::Ready(provider) => provider,
            Backend::Unavailable(missing) => {
                return format!(
                    "❌ AI {}",
                    KontragentError::MissingCredentials(missing.clone())
                );
            }
        };

        let identifier = identifier.trim();
        if let Some(cached) = self.caches.analysis.get(&identifier.to_string()) {
            debug!(identifier, "analysis cache hit");
            return cached;
        }

        let result = match self.permits.acquire().await {
            Ok(_permit) => provider.analyze(identifier).await,
            Err(_) => Err(KontragentError::Configuration(
                "analysis limiter closed".into(),
            )),
        };

        match result {
            Ok(text) => {
                self.caches
                    .analysis
                    .set(identifier.to_string(), text.clone());
                text
            }
            Err(e) => {
                error!(
                    provider = provider.name(),
                    identifier,
                    error = %e,
                    "analysis request failed"
                );
                ANALYSIS_FAILED_MESSAGE.to_string()
            }
        }
    }
}
