//! Bounded in-memory TTL cache.
//!
//! Expiry is checked lazily on `get`. Size is bounded approximately: when an
//! insertion finds the store at capacity, expired entries are purged first
//! and, if that was not enough, an arbitrary tenth of the entries is dropped.
//! There is no LRU ordering; the bound is what matters, not which entries
//! survive.
//!
//! Timestamps come from [`tokio::time::Instant`], so tests running on a
//! paused runtime (`#[tokio::test(start_paused = true)]`) can move the clock
//! with `tokio::time::advance` instead of sleeping.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;

/// Capacity and lifetime of a single cache namespace.
///
/// ```rust
/// # use kontragent::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_items(500)
///     .ttl(Duration::from_secs(60));
/// assert_eq!(config.max_items, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Soft upper bound on stored entries. Default: 2,000.
    pub max_items: usize,
    /// Lifetime of an entry from the moment it is stored. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: 2_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the soft capacity.
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    /// Set the time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Thread-safe key → value store with per-entry expiry.
///
/// `get` and `set` each take the internal lock once, so concurrent callers
/// observe whole operations. Two tasks that both miss and both `set` the
/// same key simply race; the last write wins.
pub struct TtlCache<K, V> {
    name: &'static str,
    config: CacheConfig,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache. `name` labels log lines and metrics.
    pub fn new(name: &'static str, config: CacheConfig) -> Self {
        Self {
            name,
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Namespace label given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Configured capacity and TTL.
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Return the stored value if present and not expired.
    ///
    /// An expired entry found here is removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let hit = match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };
        drop(entries);

        if hit.is_some() {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => self.name).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => self.name).increment(1);
        }
        hit
    }

    /// Store `value` for `config.ttl`, making room first when at capacity.
    pub fn set(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if entries.len() >= self.config.max_items {
            let evicted = Self::sweep(&mut entries, now, self.config.max_items);
            if evicted > 0 {
                debug!(cache = self.name, evicted, "cache sweep");
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "cache" => self.name)
                    .increment(evicted as u64);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.config.ttl,
            },
        );
    }

    /// Number of stored entries, expired ones included until they are swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Purge expired entries; if still at capacity, drop an arbitrary tenth.
    fn sweep(entries: &mut HashMap<K, CacheEntry<V>>, now: Instant, max_items: usize) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));

        if entries.len() >= max_items {
            let victims: Vec<K> = entries
                .keys()
                .take((max_items / 10).max(1))
                .cloned()
                .collect();
            for key in &victims {
                entries.remove(key);
            }
        }

        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(max_items: usize, ttl_secs: u64) -> TtlCache<String, u32> {
        TtlCache::new(
            "test",
            CacheConfig::new()
                .max_items(max_items)
                .ttl(Duration::from_secs(ttl_secs)),
        )
    }

    #[test]
    fn config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_items, 2_000);
        assert_eq!(config.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn miss_on_empty() {
        let cache = cache(10, 60);
        assert!(cache.get(&"absent".to_string()).is_none());
    }

    #[test]
    fn overwrite_replaces_value() {
        let cache = cache(10, 60);
        cache.set("k".into(), 1);
        cache.set("k".into(), 2);
        assert_eq!(cache.get(&"k".to_string()), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = cache(10, 60);
        cache.set("k".into(), 7);
        assert_eq!(cache.get(&"k".to_string()), Some(7));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&"k".to_string()), Some(7));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&"k".to_string()).is_none());
        // the expired entry was purged by the lookup
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_purges_expired_before_evicting_live() {
        let cache = cache(4, 10);
        cache.set("old-1".into(), 1);
        cache.set("old-2".into(), 2);
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.set("new-1".into(), 3);
        cache.set("new-2".into(), 4);
        tokio::time::advance(Duration::from_secs(6)).await;

        // at capacity: the two expired entries make room, live ones survive
        cache.set("new-3".into(), 5);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&"new-1".to_string()), Some(3));
        assert_eq!(cache.get(&"new-2".to_string()), Some(4));
        assert_eq!(cache.get(&"new-3".to_string()), Some(5));
    }

    #[test]
    fn full_cache_of_live_entries_evicts_a_tenth() {
        let cache = cache(20, 600);
        for i in 0..20 {
            cache.set(format!("k{i}"), i);
        }
        assert_eq!(cache.len(), 20);

        cache.set("extra".into(), 99);
        // 2 evicted (20 / 10), then one inserted
        assert_eq!(cache.len(), 19);
        assert_eq!(cache.get(&"extra".to_string()), Some(99));
    }

    #[test]
    fn tiny_capacity_still_evicts_one() {
        let cache = cache(1, 600);
        cache.set("a".into(), 1);
        cache.set("b".into(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b".to_string()), Some(2));
    }

    #[test]
    fn clear_drops_everything() {
        let cache = cache(10, 60);
        cache.set("a".into(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&"a".to_string()).is_none());
    }
}
