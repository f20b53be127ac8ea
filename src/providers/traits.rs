//! Provider traits for the upstream services.
//!
//! Providers are thin: they speak the wire protocol and report failures as
//! [`KontragentError`](crate::KontragentError). Caching, concurrency limits
//! and the "failures look like not-found" policy live one level up, in
//! [`crate::lookup`], so that tests can swap a provider for an in-memory
//! fake and count calls.

use async_trait::async_trait;

use crate::Result;
use crate::types::{LookupQuery, Record};

// ============================================================================
// Registry Provider
// ============================================================================

/// Source of registry records (DaData `findById/party`).
#[async_trait]
pub trait PartyProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Return every suggestion the registry has for `query`.
    ///
    /// An empty list is a successful "nothing found"; transport, status and
    /// decoding problems are errors.
    async fn find_by_id(&self, query: &LookupQuery) -> Result<Vec<Record>>;
}

// ============================================================================
// Analysis Provider
// ============================================================================

/// Generative model that inspects a party through its own registry tool.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Free-form analysis text for `identifier`.
    async fn analyze(&self, identifier: &str) -> Result<String>;
}
