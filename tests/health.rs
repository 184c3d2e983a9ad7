//! Integration tests for the informational endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, get};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(common::build_test_app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn index_describes_the_generation_endpoint() {
    let response = get(common::build_test_app(), "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("/api/create-pdf"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(common::build_test_app(), "/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
