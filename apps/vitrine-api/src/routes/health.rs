//! Liveness endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_secs: u64,
    pub cache_entries: usize,
    pub caching_enabled: bool,
}

/// Overall health status.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Create health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// Health check handler.
///
/// Does not probe the upstream; a slow catalog should not fail liveness.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.courses.cache();

    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: state.version.to_string(),
        uptime_secs: state.uptime_secs(),
        cache_entries: cache.len().await,
        caching_enabled: cache.is_enabled(),
    })
}
