//! In-process cache of aggregated course listings.
//!
//! Entries expire at an absolute instant and carry a weight derived from the
//! number of courses they hold. Total weight is bounded; inserting past the
//! bound first drops expired entries, then the entries closest to expiry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::Course;
use crate::settings::CacheSettings;

/// Heaviest weight a single entry can carry.
pub const MAX_ENTRY_WEIGHT: u64 = 1000;

/// Time source for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Test helper, enabled by the
/// `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<Instant>,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: std::sync::Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Cache key for a course listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// `courses:{institution}:{coupon}`, with `_` standing in for a missing
    /// or empty coupon.
    #[must_use]
    pub fn courses(institution_id: i32, coupon_id: Option<&str>) -> Self {
        let coupon = coupon_id.filter(|c| !c.is_empty()).unwrap_or("_");
        Self(format!("courses:{institution_id}:{coupon}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capacity weight for a listing of `len` courses: at least 1, at most
/// [`MAX_ENTRY_WEIGHT`].
#[must_use]
pub fn entry_weight(len: usize) -> u64 {
    u64::try_from(len)
        .unwrap_or(MAX_ENTRY_WEIGHT)
        .clamp(1, MAX_ENTRY_WEIGHT)
}

#[derive(Debug, Clone)]
struct CachedCourses {
    courses: Arc<[Course]>,
    expires_at: Instant,
    weight: u64,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<CacheKey, CachedCourses>,
    total_weight: u64,
}

impl Entries {
    fn remove(&mut self, key: &CacheKey) -> Option<CachedCourses> {
        let removed = self.map.remove(key)?;
        self.total_weight -= removed.weight;
        Some(removed)
    }

    fn purge_expired(&mut self, now: Instant) {
        let expired: Vec<CacheKey> = self
            .map
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            self.remove(&key);
        }
    }

    fn evict_soonest_expiring(&mut self) -> bool {
        let victim = self
            .map
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                debug!(cache_key = %key, "Evicting cache entry to make room");
                self.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// Shared, TTL-bounded cache of course listings.
///
/// Values are handed out as `Arc<[Course]>`: every hit shares the same
/// allocation and callers must not expect to own it.
pub struct ResultCache {
    entries: RwLock<Entries>,
    enabled: bool,
    max_weight: u64,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    /// Create a cache on the wall clock.
    #[must_use]
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a cache on a custom clock.
    #[must_use]
    pub fn with_clock(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            enabled: settings.enabled,
            max_weight: settings.max_weight.max(1),
            clock,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up an unexpired listing. Always a miss when caching is disabled.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<[Course]>> {
        if !self.enabled {
            return None;
        }

        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.map.get(key) {
                Some(entry) if now < entry.expires_at => {
                    return Some(Arc::clone(&entry.courses));
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime.
        let mut entries = self.entries.write().await;
        if entries
            .map
            .get(key)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            debug!(cache_key = %key, "Dropping expired cache entry");
            entries.remove(key);
        }
        None
    }

    /// Store a listing for `ttl`. No-op when caching is disabled.
    ///
    /// Overwrites any existing entry for the key.
    pub async fn put(&self, key: CacheKey, courses: Arc<[Course]>, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let weight = entry_weight(courses.len());
        if weight > self.max_weight {
            debug!(cache_key = %key, weight, max_weight = self.max_weight, "Listing too heavy to cache");
            return;
        }

        let now = self.clock.now();
        let Some(expires_at) = now.checked_add(ttl) else {
            warn!(cache_key = %key, ttl_secs = ttl.as_secs(), "Cache TTL out of range, not caching");
            return;
        };

        let mut entries = self.entries.write().await;
        entries.remove(&key);
        entries.purge_expired(now);

        while entries.total_weight + weight > self.max_weight {
            if !entries.evict_soonest_expiring() {
                break;
            }
        }

        entries.total_weight += weight;
        entries.map.insert(
            key,
            CachedCourses {
                courses,
                expires_at,
                weight,
            },
        );
    }

    /// Remove one entry.
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            debug!(cache_key = %key, "Cache entry invalidated");
        }
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.map.clear();
        entries.total_weight = 0;
    }

    /// Number of stored entries, expired ones included until they are purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Sum of entry weights.
    pub async fn total_weight(&self) -> u64 {
        self.entries.read().await.total_weight
    }
}

impl fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("enabled", &self.enabled)
            .field("max_weight", &self.max_weight)
            .finish_non_exhaustive()
    }
}
