//! Course query façade: cache lookup, aggregation, cache fill.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::aggregator::PaginationAggregator;
use crate::cache::{CacheKey, ResultCache};
use crate::client::{PageSource, UpstreamClient};
use crate::error::CatalogResult;
use crate::models::Course;
use crate::settings::CatalogSettings;

/// Entry point used by the HTTP layer.
///
/// Never fails: upstream trouble shows up as a shorter (possibly empty) list.
pub struct CourseService {
    aggregator: PaginationAggregator,
    cache: Arc<ResultCache>,
    ttl: Duration,
}

impl CourseService {
    pub fn new(aggregator: PaginationAggregator, cache: Arc<ResultCache>, ttl: Duration) -> Self {
        if cache.is_enabled() {
            info!(ttl_secs = ttl.as_secs(), "In-memory cache TTL configured");
        } else {
            info!("Caching is disabled - all requests will fetch fresh data");
        }

        Self {
            aggregator,
            cache,
            ttl,
        }
    }

    /// Wire the real upstream client and a wall-clock cache from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream client cannot be built.
    pub fn from_settings(settings: &CatalogSettings) -> CatalogResult<Self> {
        let client: Arc<dyn PageSource> = Arc::new(UpstreamClient::new(&settings.upstream)?);
        let aggregator = PaginationAggregator::new(client, settings.upstream.max_pages);
        let cache = Arc::new(ResultCache::new(&settings.cache));
        Ok(Self::new(aggregator, cache, settings.cache.ttl))
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Courses for an institution and optional coupon.
    ///
    /// The returned slice may be shared with other callers through the cache.
    #[instrument(skip(self))]
    pub async fn get_courses(&self, institution_id: i32, coupon_id: Option<&str>) -> Arc<[Course]> {
        let key = CacheKey::courses(institution_id, coupon_id);

        if self.cache.is_enabled() {
            if let Some(cached) = self.cache.get(&key).await {
                info!(cache_key = %key, "Cache hit");
                return cached;
            }
            info!(cache_key = %key, "Cache miss");
        } else {
            info!(institution_id, "Caching disabled, fetching fresh data");
        }

        let harvest = match AssertUnwindSafe(self.aggregator.aggregate(institution_id, coupon_id))
            .catch_unwind()
            .await
        {
            Ok(harvest) => harvest,
            Err(_) => {
                error!(institution_id, "Error fetching courses from API");
                return Arc::from(Vec::new());
            }
        };

        let courses: Arc<[Course]> = harvest.into_courses().into();

        if self.cache.is_enabled() {
            self.cache.put(key, Arc::clone(&courses), self.ttl).await;
        }

        courses
    }
}
