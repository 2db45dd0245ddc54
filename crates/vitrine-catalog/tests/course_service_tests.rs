//! End-to-end tests for the course service against a mock catalog.

mod common;

use common::*;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use vitrine_catalog::{CourseService, PaginationAggregator, PartialFailure, UpstreamClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_two_page_listing_flattened_in_order() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        json!({
            "data": [{ "id": "c1", "title": "A", "price": "10", "old_price": "20" }],
            "hasNextPage": true
        }),
        1,
    )
    .await;
    mount_page(
        &server,
        2,
        json!({
            "data": [{ "id": "c2", "title": "B", "price": "5", "old_price": "5" }],
            "hasNextPage": false
        }),
        1,
    )
    .await;

    let service = CourseService::from_settings(&catalog_settings(&server.uri(), true)).unwrap();

    let courses = service.get_courses(7, None).await;

    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].id, "c1");
    assert_eq!(courses[0].ie, "7");
    assert_eq!(courses[0].price, Decimal::from(10));
    assert_eq!(courses[0].old_price, Decimal::from(20));
    assert_eq!(courses[1].id, "c2");
    assert_eq!(courses[1].ie, "7");
    assert_eq!(courses[1].price, Decimal::from(5));
    assert_eq!(courses[1].old_price, Decimal::from(5));
}

#[tokio::test]
async fn test_cached_listing_served_without_upstream_call() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        upstream_page(vec![upstream_course("c1", "A", "10", "20")], false),
        1,
    )
    .await;

    let service = CourseService::from_settings(&catalog_settings(&server.uri(), true)).unwrap();

    let first = service.get_courses(5, None).await;
    let second = service.get_courses(5, Some("")).await;

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_caching_disabled_fetches_every_time() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        upstream_page(vec![upstream_course("c1", "A", "10", "20")], false),
        2,
    )
    .await;

    let service = CourseService::from_settings(&catalog_settings(&server.uri(), false)).unwrap();

    service.get_courses(5, None).await;
    service.get_courses(5, None).await;
}

#[tokio::test]
async fn test_mid_pagination_failure_returns_partial_listing() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        upstream_page(vec![upstream_course("c1", "A", "10", "20")], true),
        1,
    )
    .await;
    mount_page_status(&server, 2, 500).await;

    let service = CourseService::from_settings(&catalog_settings(&server.uri(), true)).unwrap();

    let courses = service.get_courses(3, None).await;

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, "c1");
}

#[tokio::test]
async fn test_undecodable_page_ends_pagination_with_earlier_pages() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        upstream_page(vec![upstream_course("c1", "A", "10", "20")], true),
        2,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .and(header("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "nope" })))
        .expect(2)
        .mount(&server)
        .await;

    let settings = catalog_settings(&server.uri(), true);
    let client = UpstreamClient::new(&settings.upstream).unwrap();
    let aggregator = PaginationAggregator::new(Arc::new(client), settings.upstream.max_pages);

    let harvest = aggregator.aggregate(3, None).await;

    assert_eq!(harvest.courses.len(), 1);
    assert_eq!(harvest.courses[0].id, "c1");
    assert_eq!(harvest.pages_fetched, 1);
    assert!(matches!(
        harvest.partial_failure,
        Some(PartialFailure::Fetch { page: 2, .. })
    ));

    let service = CourseService::from_settings(&settings).unwrap();
    let courses = service.get_courses(3, None).await;

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, "c1");
}

#[tokio::test]
async fn test_upstream_down_returns_empty_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let service = CourseService::from_settings(&catalog_settings(&server.uri(), true)).unwrap();

    let courses = service.get_courses(3, Some("PROMO")).await;

    assert!(courses.is_empty());
}

#[tokio::test]
async fn test_distinct_coupons_cached_separately() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        1,
        upstream_page(vec![upstream_course("c1", "A", "10", "20")], false),
        2,
    )
    .await;

    let service = CourseService::from_settings(&catalog_settings(&server.uri(), true)).unwrap();

    service.get_courses(5, Some("A")).await;
    service.get_courses(5, Some("B")).await;
    service.get_courses(5, Some("A")).await;

    assert_eq!(service.cache().len().await, 2);
}
