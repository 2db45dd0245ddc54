//! CORS layer mirroring the origin allow-list.

use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::origin::OriginAllowList;

/// Build the CORS layer.
///
/// An explicit list enables credentials, which rules out wildcard methods
/// and headers. An empty list accepts any origin without credentials.
pub fn build_cors_layer(allow_list: &OriginAllowList, max_age: Duration) -> CorsLayer {
    let layer = CorsLayer::new().max_age(max_age);

    if allow_list.allows_all() {
        return layer
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed = allow_list.clone();
    layer
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req: &axum::http::request::Parts| {
                let origin = origin.to_str().unwrap_or_default();
                let is_allowed = allowed.is_allowed(origin);
                if !is_allowed {
                    tracing::warn!(
                        target: "security",
                        event_type = "cors_rejected",
                        origin = %origin,
                        "CORS origin rejected"
                    );
                }
                is_allowed
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("ie_id"),
            header::HeaderName::from_static("couponid"),
        ])
}
