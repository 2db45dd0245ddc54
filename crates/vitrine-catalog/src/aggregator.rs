//! Drives the upstream page by page and flattens the listing.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::client::PageSource;
use crate::models::Course;

/// Why an aggregation stopped before the upstream said it was done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialFailure {
    /// Fetching or decoding `page` failed.
    Fetch { page: u32, error: String },
    /// The page bound was reached while the upstream still reported more.
    PageLimit { max_pages: u32 },
}

/// Best-effort result of one aggregation.
///
/// Callers that only want the list use [`Harvest::into_courses`]; the failure
/// marker is there for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub courses: Vec<Course>,
    pub pages_fetched: u32,
    pub partial_failure: Option<PartialFailure>,
}

impl Harvest {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.partial_failure.is_none()
    }

    #[must_use]
    pub fn into_courses(self) -> Vec<Course> {
        self.courses
    }
}

/// Sequential pagination over a [`PageSource`].
#[derive(Clone)]
pub struct PaginationAggregator {
    source: Arc<dyn PageSource>,
    max_pages: u32,
}

impl PaginationAggregator {
    /// `max_pages == 0` leaves the loop unbounded.
    pub fn new(source: Arc<dyn PageSource>, max_pages: u32) -> Self {
        Self { source, max_pages }
    }

    /// Fetch every page for an institution, in order.
    ///
    /// Stops when a page has no data container, when `hasNextPage` is false,
    /// or when the page bound is hit. A failed fetch ends the loop and keeps
    /// what was already collected; it is never propagated.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, institution_id: i32, coupon_id: Option<&str>) -> Harvest {
        let mut courses = Vec::new();
        let mut pages_fetched = 0u32;
        let mut page_number = 1u32;

        loop {
            if self.max_pages > 0 && page_number > self.max_pages {
                warn!(
                    institution_id,
                    max_pages = self.max_pages,
                    collected = courses.len(),
                    "Page limit reached while upstream still reports more pages"
                );
                return Harvest {
                    courses,
                    pages_fetched,
                    partial_failure: Some(PartialFailure::PageLimit {
                        max_pages: self.max_pages,
                    }),
                };
            }

            debug!(page = page_number, institution_id, "Fetching page");

            let page = match self
                .source
                .fetch_page(institution_id, coupon_id, page_number)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        error = %e,
                        page = page_number,
                        institution_id,
                        collected = courses.len(),
                        "Upstream page fetch failed, returning partial results"
                    );
                    return Harvest {
                        courses,
                        pages_fetched,
                        partial_failure: Some(PartialFailure::Fetch {
                            page: page_number,
                            error: e.to_string(),
                        }),
                    };
                }
            };

            let has_next_page = page.has_next_page();
            let Some(records) = page.data else {
                debug!(page = page_number, "Page has no data container, stopping");
                break;
            };

            let count = records.len();
            courses.extend(
                records
                    .into_iter()
                    .map(|record| Course::from_upstream(record, institution_id)),
            );
            pages_fetched += 1;

            info!(
                page = page_number,
                count, has_next_page, "Fetched upstream page"
            );

            if !has_next_page {
                break;
            }
            page_number = page_number.saturating_add(1);
        }

        info!(
            institution_id,
            total = courses.len(),
            pages = pages_fetched,
            "Completed fetching all pages"
        );

        Harvest {
            courses,
            pages_fetched,
            partial_failure: None,
        }
    }
}
