//! Common test utilities for vitrine-api integration tests.

#![allow(dead_code)]

use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use vitrine_api::build_router;
use vitrine_api::config::VitrineConfig;
use vitrine_api::state::AppState;
use vitrine_catalog::CourseService;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const ITEMS_PATH: &str = "/api/vitrine/itens";

/// Configuration pointing at a mock upstream.
pub fn test_config(upstream: &str) -> VitrineConfig {
    let mut config = VitrineConfig::default();
    config.upstream.base_url = upstream.to_string();
    config.upstream.api_key = API_KEY.to_string();
    config.upstream.timeout_secs = 5;
    config
}

/// Build the full router from a configuration.
pub fn test_app(config: &VitrineConfig) -> Router {
    let service = CourseService::from_settings(&config.catalog_settings())
        .expect("test configuration should be valid");
    let state = AppState::new(Arc::new(service), config.institution_policy());
    build_router(state, &config.cors)
}

/// Upstream course record factory.
pub fn upstream_course(id: &str, price: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Curso {id}"),
        "type": "Graduação",
        "category": "Tecnologia",
        "thumb": format!("https://cdn.example.com/{id}.png"),
        "link": format!("https://example.com/cursos/{id}"),
        "price": price,
        "old_price": price
    })
}

/// Mount one upstream page for a given `page` header.
pub async fn mount_page(server: &MockServer, page: u32, items: Vec<Value>, has_next_page: bool) {
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .and(header("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": items,
            "metadata": { "hasNextPage": has_next_page }
        })))
        .mount(server)
        .await;
}

/// GET a path with extra headers.
pub async fn get(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
