//! Error types for the catalog pipeline.

use thiserror::Error;

/// Result type alias using `CatalogError`.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while talking to the upstream catalog.
///
/// None of these reach HTTP callers: the aggregator turns them into a shorter
/// course list.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream answered with a non-success status code.
    #[error("Upstream returned HTTP {status}")]
    UpstreamHttp { status: u16 },

    /// Upstream body is not JSON or does not look like a page.
    #[error("Failed to decode upstream page: {0}")]
    UpstreamDecode(String),

    /// HTTP transport error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}
