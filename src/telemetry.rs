//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `kontragent_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `provider` — upstream name ("dadata", "openai")
//! - `status` — outcome: "ok" or "error"
//! - `cache` — cache namespace ("party", "branches", "analysis")

/// Total outbound requests to upstream services.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "kontragent_requests_total";

/// Total cache hits.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "kontragent_cache_hits_total";

/// Total cache misses (absent or expired).
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "kontragent_cache_misses_total";

/// Entries dropped by the capacity sweep (expired purge + arbitrary eviction).
///
/// Labels: `cache`.
pub const CACHE_EVICTIONS_TOTAL: &str = "kontragent_cache_evictions_total";
