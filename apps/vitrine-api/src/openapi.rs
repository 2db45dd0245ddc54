//! `OpenAPI` documentation for the vitrine API.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::routes::health::{HealthResponse, HealthStatus};
use crate::state::AppState;
use vitrine_catalog::Course;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "vitrine API",
        description = "Flattened course catalog per institution"
    ),
    paths(
        crate::routes::courses::list_courses,
        crate::routes::health::health_handler,
    ),
    components(schemas(Course, ErrorResponse, HealthResponse, HealthStatus)),
    tags(
        (name = "Courses", description = "Course listing"),
        (name = "Health", description = "Service health and status")
    )
)]
pub struct ApiDoc;

/// Serves the generated document as JSON.
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
