#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response};
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;
use storybook::config::AppConfig;
use storybook::services::catalog::StoryCatalog;
use storybook::{AppState, router};
use tower::ServiceExt;

/// Build the full application router with the embedded catalog and default
/// settings, the same way `main.rs` does.
pub fn build_test_app() -> Router {
    let catalog = StoryCatalog::embedded().expect("embedded catalog loads");
    router(AppState::new(catalog, AppConfig::default()))
}

pub fn build_test_app_with(catalog: StoryCatalog, config: AppConfig) -> Router {
    router(AppState::new(catalog, config))
}

pub fn jpeg_data_url(width: u32, height: u32) -> String {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 160, 220])))
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(85))
        .expect("encode jpeg");
    format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(&bytes)
    )
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
