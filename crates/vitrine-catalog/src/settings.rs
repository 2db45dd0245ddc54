//! Resolved runtime settings for the catalog pipeline.
//!
//! The application layer reads raw values from its config file and the
//! environment; the `resolve_*` helpers here apply the fallback rules so every
//! entry point ends up with the same numbers.

use std::fmt;
use std::time::Duration;

/// Page size sent in the `limit` header when nothing valid is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Cache lifetime used when the configured TTL is absent or not positive.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Upper bound on pages fetched for one listing.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Total cache weight (roughly, cached courses) across all entries.
/// Longest TTL a listing is kept for (30 days); larger values are clamped.
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

pub const DEFAULT_CACHE_MAX_WEIGHT: u64 = 10_000;

/// Transport timeout for one upstream request.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Upstream connection settings.
#[derive(Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
    pub timeout: Duration,
    /// `0` disables the bound.
    pub max_pages: u32,
}

// api_key stays out of logs
impl fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_weight: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_weight: DEFAULT_CACHE_MAX_WEIGHT,
        }
    }
}

/// Everything the course service needs to be built.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub upstream: UpstreamSettings,
    pub cache: CacheSettings,
}

/// Positive page size, or [`DEFAULT_PAGE_SIZE`].
#[must_use]
pub fn resolve_page_size(raw: Option<i64>) -> u32 {
    raw.filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Positive TTL in seconds, or [`DEFAULT_CACHE_TTL_SECS`]. Never zero, never
/// above [`MAX_CACHE_TTL_SECS`].
#[must_use]
pub fn resolve_cache_ttl(raw: Option<i64>) -> Duration {
    let secs = raw
        .filter(|v| *v > 0)
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(DEFAULT_CACHE_TTL_SECS)
        .min(MAX_CACHE_TTL_SECS);
    Duration::from_secs(secs)
}
