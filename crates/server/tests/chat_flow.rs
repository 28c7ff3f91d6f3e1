mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn send_list_and_clear_messages() {
    let (app, _store, _dir) = test_app().await;
    let cookie = signed_in_user(&app, "Test User", "test@example.com").await;

    let (status, _, body) = request(
        &app,
        "POST",
        "/api/v1/chat/new",
        Some(&cookie),
        Some(json!({ "message": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chats = body["chats"].as_array().expect("chats array");
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0]["role"], "user");
    assert_eq!(chats[0]["content"], "Hi");
    assert_eq!(chats[1]["role"], "assistant");
    assert_eq!(chats[1]["content"], "You said: Hi");

    // A second exchange appends after the first.
    let (status, _, body) = request(
        &app,
        "POST",
        "/api/v1/chat/new",
        Some(&cookie),
        Some(json!({ "message": "Plan me a trip" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chats"].as_array().unwrap().len(), 4);

    let (status, _, body) = request(&app, "GET", "/api/v1/chat/all-chats", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
    assert_eq!(body["chats"].as_array().unwrap().len(), 4);

    let (status, _, body) = request(&app, "DELETE", "/api/v1/chat/delete", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");

    let (status, _, body) = request(&app, "GET", "/api/v1/chat/all-chats", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chats"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn provider_failure_persists_nothing() {
    let (app, store, _dir) = test_app_with(Arc::new(FailingProvider)).await;
    let cookie = signed_in_user(&app, "Test User", "test@example.com").await;

    let (status, _, body) = request(
        &app,
        "POST",
        "/api/v1/chat/new",
        Some(&cookie),
        Some(json!({ "message": "Hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Something went wrong");

    // Not even the user half of the exchange was written.
    let user = store
        .find_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(store.chats(&user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (app, _store, _dir) = test_app().await;
    let cookie = signed_in_user(&app, "Test User", "test@example.com").await;

    let (status, _, body) = request(
        &app,
        "POST",
        "/api/v1/chat/new",
        Some(&cookie),
        Some(json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "message");
}

#[tokio::test]
async fn chat_routes_require_a_session() {
    let (app, _store, _dir) = test_app().await;

    for (method, uri) in [
        ("POST", "/api/v1/chat/new"),
        ("GET", "/api/v1/chat/all-chats"),
        ("DELETE", "/api/v1/chat/delete"),
    ] {
        let body = (method == "POST").then(|| json!({ "message": "Hi" }));
        let (status, _, _) = request(&app, method, uri, None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn histories_are_isolated_per_user() {
    let (app, _store, _dir) = test_app().await;
    let alice = signed_in_user(&app, "Alice", "alice@example.com").await;
    let bob = signed_in_user(&app, "Bob", "bob@example.com").await;

    let (status, _, _) = request(
        &app,
        "POST",
        "/api/v1/chat/new",
        Some(&alice),
        Some(json!({ "message": "Hi from Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = request(&app, "GET", "/api/v1/chat/all-chats", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chats"].as_array().unwrap().len(), 0);
}
