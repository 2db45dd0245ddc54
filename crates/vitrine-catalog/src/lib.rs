//! Course catalog aggregation for the vitrine API.
//!
//! Pulls every page of an institution's course listing from the upstream
//! catalog, converts the records, and keeps the flattened result in a
//! TTL-bounded in-process cache.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vitrine_catalog::{CacheSettings, CatalogSettings, CourseService, UpstreamSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = CatalogSettings {
//!     upstream: UpstreamSettings {
//!         base_url: "https://catalog.example.com".to_string(),
//!         api_key: "key".to_string(),
//!         page_size: 20,
//!         timeout: Duration::from_secs(30),
//!         max_pages: 500,
//!     },
//!     cache: CacheSettings::default(),
//! };
//!
//! let service = CourseService::from_settings(&settings)?;
//! let courses = service.get_courses(1, None).await;
//! println!("{} courses", courses.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod service;
pub mod settings;

pub use aggregator::{Harvest, PaginationAggregator, PartialFailure};
pub use cache::{CacheKey, Clock, ResultCache, SystemClock};

#[cfg(any(test, feature = "test-util"))]
pub use cache::ManualClock;
pub use client::{PageSource, UpstreamClient};
pub use error::{CatalogError, CatalogResult};
pub use models::{Course, UpstreamCourse, UpstreamPage};
pub use service::CourseService;
pub use settings::{CacheSettings, CatalogSettings, UpstreamSettings};
