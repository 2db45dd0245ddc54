//! HTTP surface of the vitrine course catalog.
//!
//! Wires the catalog service into an axum router behind the origin
//! allow-list, CORS, panic recovery, and request tracing.

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::response::{IntoResponse, Response};
use axum::Router;
use std::any::Any;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::error::ApiError;
use crate::middleware::{build_cors_layer, OriginAllowList, OriginLayer};
use crate::state::AppState;

/// Build the application router.
///
/// Layers, outermost first: tracing, origin allow-list, CORS, panic recovery.
pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    let allow_list = OriginAllowList::new(&cors.allowed_origins);

    Router::new()
        .merge(routes::course_routes())
        .merge(routes::health_routes())
        .merge(openapi::openapi_routes())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(build_cors_layer(
            &allow_list,
            Duration::from_secs(cors.max_age_secs),
        ))
        .layer(OriginLayer::new(allow_list))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    ApiError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
