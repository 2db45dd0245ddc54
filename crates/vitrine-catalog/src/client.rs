//! HTTP client for the upstream course listing.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{CatalogError, CatalogResult};
use crate::models::UpstreamPage;
use crate::settings::UpstreamSettings;

/// Listing path, relative to the configured base URL.
pub const ITEMS_PATH: &str = "/api/vitrine/itens";

pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const INSTITUTION_HEADER: &str = "ie_id";
pub const LIMIT_HEADER: &str = "limit";
pub const PAGE_HEADER: &str = "page";

/// Source of upstream pages.
///
/// Page numbers start at 1.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        institution_id: i32,
        coupon_id: Option<&str>,
        page: u32,
    ) -> CatalogResult<UpstreamPage>;
}

/// reqwest-backed [`PageSource`] talking to the real catalog.
///
/// Institution, page size and page number travel as headers; only the coupon
/// goes in the query string.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    page_size: u32,
}

impl UpstreamClient {
    /// Create a client with its own connection pool and the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the base URL is invalid.
    pub fn new(settings: &UpstreamSettings) -> CatalogResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| CatalogError::Config(format!("Failed to create HTTP client: {e}")))?;

        Self::with_client(settings, http_client)
    }

    /// Create a client around an existing reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or invalid.
    pub fn with_client(
        settings: &UpstreamSettings,
        http_client: reqwest::Client,
    ) -> CatalogResult<Self> {
        let base = settings.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(CatalogError::Config(
                "upstream base URL is not configured".to_string(),
            ));
        }

        let endpoint = Url::parse(&format!("{base}{ITEMS_PATH}"))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key: settings.api_key.clone(),
            page_size: settings.page_size,
        })
    }

    /// Listing URL for a request, with `coupon` only when one was given.
    #[must_use]
    pub fn page_url(&self, coupon_id: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(coupon) = coupon_id.filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("coupon", coupon);
        }
        url
    }
}

#[async_trait]
impl PageSource for UpstreamClient {
    #[instrument(skip(self))]
    async fn fetch_page(
        &self,
        institution_id: i32,
        coupon_id: Option<&str>,
        page: u32,
    ) -> CatalogResult<UpstreamPage> {
        let url = self.page_url(coupon_id);
        debug!(%url, "Requesting upstream page");

        let response = self
            .http_client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(INSTITUTION_HEADER, institution_id.to_string())
            .header(LIMIT_HEADER, self.page_size.to_string())
            .header(PAGE_HEADER, page.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UpstreamHttp {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        decode_page(&body)
    }
}

/// Decode one page body.
///
/// A literal `null` body decodes to a page without a data container.
///
/// # Errors
///
/// Returns [`CatalogError::UpstreamDecode`] when the body is not a page.
pub fn decode_page(body: &str) -> CatalogResult<UpstreamPage> {
    let page: Option<UpstreamPage> =
        serde_json::from_str(body).map_err(|e| CatalogError::UpstreamDecode(e.to_string()))?;
    Ok(page.unwrap_or_default())
}
