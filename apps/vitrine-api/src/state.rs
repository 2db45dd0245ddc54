//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Instant;

use vitrine_catalog::CourseService;

use crate::error::{ApiError, ApiResult};

/// What to do when a request carries no `ie_id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstitutionPolicy {
    /// Reject the request with 400.
    Required,
    /// Use this institution instead.
    DefaultTo(i32),
}

impl InstitutionPolicy {
    /// Turn the raw header value into an institution id.
    ///
    /// A present value that is not an integer is always rejected.
    pub fn resolve(self, raw: Option<&str>) -> ApiResult<i32> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse::<i32>()
                .map_err(|_| ApiError::bad_request("ie_id header must be an integer")),
            None => match self {
                InstitutionPolicy::Required => {
                    Err(ApiError::bad_request("ie_id header is required"))
                }
                InstitutionPolicy::DefaultTo(id) => Ok(id),
            },
        }
    }
}

/// Application state shared across all handlers.
///
/// Cloned per request; the service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<CourseService>,

    pub institution_policy: InstitutionPolicy,

    /// Service startup time for uptime calculation
    pub startup_time: Arc<Instant>,

    pub version: &'static str,
}

impl AppState {
    pub fn new(courses: Arc<CourseService>, institution_policy: InstitutionPolicy) -> Self {
        Self {
            courses,
            institution_policy,
            startup_time: Arc::new(Instant::now()),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.startup_time.elapsed().as_secs()
    }
}
