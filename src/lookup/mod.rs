//! Cached, concurrency-limited registry lookups.
//!
//! [`LookupClient`] sits between the router and a [`PartyProvider`]. It is
//! the boundary where upstream failures stop: every provider error is logged
//! with its context and turned into an empty result, so callers only ever
//! see "found" or "not found".
//!
//! # Caching
//!
//! Successful responses are cached, empty ones included: an identifier the
//! registry does not know is remembered for the TTL and not asked again.
//! Failed requests are not cached, so the next attempt reaches upstream.
//!
//! Single-party lookups use the `party` namespace keyed on the identifier;
//! everything else uses `branches` keyed on [`LookupQuery::cache_key`].

pub mod analysis;

pub use analysis::AnalysisClient;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::cache::CacheRegistry;
use crate::providers::PartyProvider;
use crate::types::{BranchType, LookupQuery, Record};
use crate::{KontragentError, Result};

/// Default number of concurrent registry requests.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Registry lookups with caching, a concurrency cap and graceful degradation.
pub struct LookupClient {
    provider: Arc<dyn PartyProvider>,
    caches: Arc<CacheRegistry>,
    permits: Semaphore,
}

impl LookupClient {
    /// Wrap `provider`, sharing `caches`, allowing `max_concurrent` requests.
    pub fn new(
        provider: Arc<dyn PartyProvider>,
        caches: Arc<CacheRegistry>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            provider,
            caches,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Caches shared with other clients.
    pub fn caches(&self) -> &Arc<CacheRegistry> {
        &self.caches
    }

    /// All suggestions matching `query`; empty when none or on failure.
    pub async fn fetch_companies(&self, query: &LookupQuery) -> Vec<Record> {
        match self.try_fetch_companies(query).await {
            Ok(suggestions) => {
                if is_single_main(query) {
                    self.caches
                        .party
                        .set(query.identifier.clone(), suggestions.first().cloned());
                }
                suggestions
            }
            Err(_) => Vec::new(),
        }
    }

    /// The head-office record for `identifier`, if the registry has one.
    pub async fn fetch_company(&self, identifier: &str) -> Option<Record> {
        let identifier = identifier.trim();
        if let Some(cached) = self.caches.party.get(&identifier.to_string()) {
            debug!(identifier, found = cached.is_some(), "party cache hit");
            return cached;
        }

        let query = LookupQuery::main(identifier);
        match self.try_fetch_companies(&query).await {
            Ok(suggestions) => {
                let item = suggestions.into_iter().next();
                if item.is_none() {
                    debug!(identifier, "registry has no record");
                }
                self.caches.party.set(identifier.to_string(), item.clone());
                item
            }
            Err(_) => None,
        }
    }

    /// Branches of the organisation behind `identifier`.
    pub async fn fetch_branches(&self, identifier: &str, count: u32) -> Vec<Record> {
        self.fetch_companies(&LookupQuery::branches(identifier, count))
            .await
    }

    /// Cache-aware request that still reports failures, for internal callers
    /// that must not cache them.
    async fn try_fetch_companies(&self, query: &LookupQuery) -> Result<Vec<Record>> {
        let key = query.cache_key();
        if let Some(cached) = self.caches.branches.get(&key) {
            debug!(key = %key, count = cached.len(), "branches cache hit");
            return Ok(cached);
        }

        match self.request(query).await {
            Ok(suggestions) => {
                self.caches.branches.set(key, suggestions.clone());
                Ok(suggestions)
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(
                        provider = self.provider.name(),
                        identifier = %query.identifier,
                        error = %e,
                        retry_after = ?e.retry_after(),
                        "registry unavailable, reporting not found"
                    );
                } else {
                    error!(
                        provider = self.provider.name(),
                        identifier = %query.identifier,
                        error = %e,
                        "registry request failed, reporting not found"
                    );
                }
                Err(e)
            }
        }
    }

    async fn request(&self, query: &LookupQuery) -> Result<Vec<Record>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| KontragentError::Configuration("registry limiter closed".into()))?;
        self.provider.find_by_id(query).await
    }
}

/// The shape `fetch_company` issues; its result also fills the party cache.
fn is_single_main(query: &LookupQuery) -> bool {
    query.branch_type == Some(BranchType::Main)
        && query.count == 1
        && query.kpp.is_none()
        && query.entity_type.is_none()
        && query.statuses.is_none()
}
