//! Shared fixtures for the integration tests: an app wired to a temporary
//! store and a canned completion provider, plus request helpers.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use smarttravel_server::ai::{CompletionProvider, PromptMessage};
use smarttravel_server::config::{AppConfig, AppState};
use smarttravel_server::store::UserStore;

/// Deterministic provider: replies to the last user turn.
pub struct EchoProvider;

#[async_trait]
impl CompletionProvider for EchoProvider {
    async fn complete(&self, history: &[PromptMessage]) -> anyhow::Result<String> {
        let last = history.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(format!("You said: {}", last))
    }
}

/// Provider that always fails, for the no-partial-persist path.
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(&self, _history: &[PromptMessage]) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("provider unavailable"))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        data_dir: PathBuf::new(),
        jwt_secret: "test-secret".to_string(),
        model: "test-model".to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        ai_timeout: Duration::from_secs(5),
    }
}

pub async fn test_app_with(
    provider: Arc<dyn CompletionProvider>,
) -> (Router, Arc<UserStore>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(UserStore::open(dir.path()).await.unwrap());
    let state = AppState {
        config: Arc::new(test_config()),
        store: store.clone(),
        provider,
    };
    (smarttravel_server::app(state), store, dir)
}

pub async fn test_app() -> (Router, Arc<UserStore>, TempDir) {
    test_app_with(Arc::new(EchoProvider)).await
}

/// Fire one request at the router; returns status, the first Set-Cookie
/// header (if any), and the JSON body (Null when empty or not JSON).
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, set_cookie, json)
}

/// The `name=value` pair from a Set-Cookie header, for replay in requests.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Sign up and log in a fresh user, returning their session cookie.
pub async fn signed_in_user(app: &Router, name: &str, email: &str) -> String {
    let (status, _, _) = request(
        app,
        "POST",
        "/api/v1/user/signup",
        None,
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, set_cookie, _) = request(
        app,
        "POST",
        "/api/v1/user/login",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    cookie_pair(&set_cookie.expect("login should set the session cookie"))
}
