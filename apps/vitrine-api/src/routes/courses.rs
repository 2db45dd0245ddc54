//! Course listing endpoint.

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use std::sync::Arc;
use tracing::debug;

use vitrine_catalog::Course;

use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::state::AppState;

/// Header carrying the institution id.
pub const INSTITUTION_HEADER: &str = "ie_id";

/// Header carrying the optional coupon code.
pub const COUPON_HEADER: &str = "couponid";

/// Create course routes.
pub fn course_routes() -> Router<AppState> {
    Router::new().route("/api/courses", get(list_courses))
}

/// List every course of an institution, optionally priced with a coupon.
///
/// Upstream failures never surface here; they show up as a shorter or
/// empty list.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(
        ("ie_id" = Option<i32>, Header, description = "Institution id"),
        ("couponId" = Option<String>, Header, description = "Coupon code applied to prices")
    ),
    responses(
        (status = 200, description = "Flattened course listing", body = [Course]),
        (status = 400, description = "Missing or non-integer ie_id", body = ErrorResponse),
        (status = 403, description = "Origin not allowed"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Arc<[Course]>>> {
    let raw_institution = headers
        .get(INSTITUTION_HEADER)
        .map(|v| {
            v.to_str()
                .map_err(|_| ApiError::bad_request("ie_id header must be an integer"))
        })
        .transpose()?;
    let institution_id = state.institution_policy.resolve(raw_institution)?;

    let coupon_id = headers.get(COUPON_HEADER).and_then(|v| v.to_str().ok());

    debug!(institution_id, coupon = ?coupon_id, "Listing courses");

    let courses = state.courses.get_courses(institution_id, coupon_id).await;
    Ok(Json(courses))
}
