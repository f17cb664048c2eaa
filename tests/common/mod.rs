//! Common test helpers for integration tests.
//!
//! Builds routers over either storage strategy and sends requests through
//! them with `tower::ServiceExt::oneshot`, so no socket is opened.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use todo_service::api::{AppState, HtmlTemplate, ItemResponse, router};
use todo_service::infrastructure::{InMemoryItemRepository, SqliteItemRepository};

pub const JSON: &str = "application/json";
pub const FORM: &str = "application/x-www-form-urlencoded";

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates an `AppState` over an empty in-memory repository.
pub fn in_memory_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryItemRepository::new()),
        HtmlTemplate::default(),
    )
}

/// Creates an `AppState` over an empty in-memory `SQLite` database.
pub async fn sqlite_state() -> (AppState, SqliteItemRepository) {
    let repository = SqliteItemRepository::connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite should open");
    let state = AppState::new(Arc::new(repository.clone()), HtmlTemplate::default());
    (state, repository)
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

/// Sends one request through a fresh clone of `app`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder
        .body(Body::from(body.to_owned()))
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let header_value = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let location = header_value(header::LOCATION);
    let content_type = header_value(header::CONTENT_TYPE);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec();

    TestResponse {
        status,
        location,
        content_type,
        body,
    }
}

/// Saves `description` through the JSON path and asserts success.
pub async fn save_json(app: &Router, description: &str) {
    let body = serde_json::json!({ "description": description }).to_string();
    let response = send(app, Method::POST, "/save", Some(JSON), &body).await;
    assert_eq!(response.status, StatusCode::OK, "save failed: {}", response.text());
}

/// Returns the items listed by `GET /view`.
pub async fn view(app: &Router) -> Vec<ItemResponse> {
    let response = send(app, Method::GET, "/view", None, "").await;
    assert_eq!(response.status, StatusCode::OK);
    let listed = response.json();
    listed
        .as_array()
        .expect("view should return an item array")
        .iter()
        .map(|entry| ItemResponse {
            id: entry["ID"].as_i64().expect("ID should be an integer"),
            description: entry["Description"]
                .as_str()
                .expect("Description should be a string")
                .to_string(),
        })
        .collect()
}

/// Returns the descriptions listed by `GET /view`, in order.
pub async fn descriptions(app: &Router) -> Vec<String> {
    view(app)
        .await
        .into_iter()
        .map(|item| item.description)
        .collect()
}

/// Builds the router under test for `state`.
pub fn app(state: AppState) -> Router {
    router(state)
}
