#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use linkvault::{create_router, services::store::MemoryStore, utils::config::AppConfig, AppState};

/// Test configuration with a generous auth rate limit
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Use random port for testing
        auth_rate_limit_max_requests: 1000,
        ..AppConfig::default()
    }
}

/// Setup a test application over a fresh in-memory store
pub async fn setup_test_app() -> Router {
    setup_test_app_with_store(test_config()).await.0
}

/// Setup a test application and keep a handle on its store
pub async fn setup_test_app_with_store(config: AppConfig) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app_state = AppState::new(config, store.clone()).expect("valid test configuration");
    (create_router(app_state), store)
}

/// Send a request and decode the JSON response (Null if the body isn't JSON)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Register `username` and return its session token
pub async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/signup",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Save a link for the session holder and return the created item
pub async fn add_content(app: &Router, token: &str, title: &str, link: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/content",
        Some(token),
        Some(json!({ "title": title, "link": link, "type": "article", "tags": ["reading"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add content failed: {}", body);
    body["content"].clone()
}

/// The session holder's user id, read from their profile
pub async fn user_id(app: &Router, token: &str) -> String {
    let (status, body) = send(app, "GET", "/api/v1/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK, "profile failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}
