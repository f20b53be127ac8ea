//! Caching subsystem.
//!
//! Three independent [`TtlCache`] namespaces, grouped in a [`CacheRegistry`]
//! that is built once at startup and shared by the lookup clients:
//!
//! - `party` — single-party lookups keyed on the identifier. Stores
//!   `Option<Record>` so that "registry says this identifier does not exist"
//!   is remembered as distinctly as a hit.
//! - `branches` — multi-result lookups keyed on [`LookupQuery::cache_key`](crate::types::LookupQuery::cache_key).
//! - `analysis` — AI-mode texts keyed on the identifier.
//!
//! Keeping the namespaces apart means capacity pressure in one never evicts
//! entries of another, and each can have its own TTL.

pub mod ttl;

pub use ttl::{CacheConfig, TtlCache};

use std::time::Duration;

use crate::types::Record;

/// Per-namespace cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub party: CacheConfig,
    pub branches: CacheConfig,
    pub analysis: CacheConfig,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            party: CacheConfig::new()
                .ttl(Duration::from_secs(30 * 60))
                .max_items(5_000),
            branches: CacheConfig::new()
                .ttl(Duration::from_secs(30 * 60))
                .max_items(2_000),
            analysis: CacheConfig::new()
                .ttl(Duration::from_secs(2 * 60 * 60))
                .max_items(2_000),
        }
    }
}

/// The process-wide set of caches.
pub struct CacheRegistry {
    pub party: TtlCache<String, Option<Record>>,
    pub branches: TtlCache<String, Vec<Record>>,
    pub analysis: TtlCache<String, String>,
}

impl CacheRegistry {
    /// Build the three namespaces from the given settings.
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            party: TtlCache::new("party", settings.party),
            branches: TtlCache::new("branches", settings.branches),
            analysis: TtlCache::new("analysis", settings.analysis),
        }
    }

    /// Drop every entry in every namespace.
    pub fn clear(&self) {
        self.party.clear();
        self.branches.clear();
        self.analysis.clear();
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(&CacheSettings::default())
    }
}
