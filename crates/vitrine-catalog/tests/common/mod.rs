//! Common test utilities for vitrine-catalog integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::time::Duration;
use vitrine_catalog::{CacheSettings, CatalogSettings, UpstreamSettings};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const ITEMS_PATH: &str = "/api/vitrine/itens";

/// Test data factory for upstream course records.
pub fn upstream_course(id: &str, title: &str, price: &str, old_price: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "type": "MBA",
        "category": "Tecnologia",
        "thumb": format!("https://cdn.example.com/{id}.png"),
        "link": format!("https://example.com/cursos/{id}"),
        "price": price,
        "old_price": old_price
    })
}

/// Wraps records in the upstream page envelope.
pub fn upstream_page(items: Vec<Value>, has_next_page: bool) -> Value {
    json!({
        "data": items,
        "metadata": { "hasNextPage": has_next_page }
    })
}

/// Settings pointing at a mock server.
pub fn catalog_settings(base_url: &str, caching: bool) -> CatalogSettings {
    CatalogSettings {
        upstream: UpstreamSettings {
            base_url: base_url.to_string(),
            api_key: API_KEY.to_string(),
            page_size: 20,
            timeout: Duration::from_secs(5),
            max_pages: 50,
        },
        cache: CacheSettings {
            enabled: caching,
            ..CacheSettings::default()
        },
    }
}

/// Mount a page answered only for the given `page` header, expected `times` times.
pub async fn mount_page(server: &MockServer, page: u32, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .and(header("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount a failing page.
pub async fn mount_page_status(server: &MockServer, page: u32, status: u16) {
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .and(header("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}
