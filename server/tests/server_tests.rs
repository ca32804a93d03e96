//! Server assembly tests: identity wiring, store dispatch and a router smoke test.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use todoflow_core::{Caller, InMemoryTodoStore, NewTodo, Priority, TodoStore};
use todoflow_server::{AnyStore, AuthConfig, AuthMode, StoreBackend, build_app, build_identity};
use todoflow_testing::{alice, sample_todo};
use tower::ServiceExt;

fn token_auth(tokens: &str) -> AuthConfig {
    AuthConfig {
        mode: AuthMode::Token,
        tokens: tokens.to_string(),
        header: "X-Authenticated-User".to_string(),
    }
}

fn headers(pairs: &[(&str, &str)]) -> axum::http::HeaderMap {
    let mut map = axum::http::HeaderMap::new();
    for (name, value) in pairs {
        map.insert(
            axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
    }
    map
}

#[test]
fn token_identity_resolves_configured_tokens() {
    let identity = build_identity(&token_auth(&format!("alice-token={}", alice()))).unwrap();

    let caller = identity.resolve(&headers(&[("authorization", "Bearer alice-token")]));
    assert_eq!(caller, Caller::User(alice()));

    let caller = identity.resolve(&headers(&[("authorization", "Bearer other")]));
    assert_eq!(caller, Caller::Anonymous);
}

#[test]
fn malformed_token_table_is_rejected() {
    assert!(build_identity(&token_auth("alice-token=not-a-uuid")).is_err());
    assert!(build_identity(&token_auth("missing-separator")).is_err());
}

#[test]
fn header_identity_reads_configured_header() {
    let auth = AuthConfig {
        mode: AuthMode::Header,
        tokens: String::new(),
        header: "X-Remote-User".to_string(),
    };
    let identity = build_identity(&auth).unwrap();

    let caller = identity.resolve(&headers(&[("x-remote-user", &alice().to_string())]));
    assert_eq!(caller, Caller::User(alice()));
    assert_eq!(identity.resolve(&headers(&[])), Caller::Anonymous);
}

#[tokio::test]
async fn any_store_delegates_to_memory() {
    let store = AnyStore::Memory(InMemoryTodoStore::new());
    assert_eq!(store.backend(), StoreBackend::Memory);

    let todo = sample_todo(alice(), "Buy milk", Priority::Low);
    store.insert(&todo).await.unwrap();

    let toggled = store.toggle_completed(todo.id).await.unwrap().unwrap();
    assert!(toggled.completed);
    assert_eq!(store.list_by_owner(alice()).await.unwrap(), vec![toggled]);
    assert!(store.delete(todo.id).await.unwrap());
    assert!(store.get(todo.id).await.unwrap().is_none());
    store.ping().await.unwrap();
}

#[tokio::test]
async fn assembled_app_serves_requests() {
    let app = build_app(
        AnyStore::Memory(InMemoryTodoStore::new()),
        &token_auth(&format!("alice-token={}", alice())),
    )
    .unwrap();

    let body = serde_json::to_string(&NewTodo::new("Buy milk", Priority::Low)).unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/todos")
                .header("authorization", "Bearer alice-token")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::get("/api/todos")
                .header("authorization", "Bearer alice-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["todos"][0]["text"], "Buy milk");
    assert_eq!(json["stats"]["total"], 1);
}
