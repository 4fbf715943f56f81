//! Shared helpers for the API integration tests.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use edu_platform::{AppState, build_router, db};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: fresh in-memory database with the schema applied.
pub async fn setup_app() -> Router {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Should open in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("Should apply migrations");
    build_router(AppState::new(Arc::new(pool)))
}

/// Test helper: send a request and decode the JSON body (`Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PUT", uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None).await
}

/// Create a node and return its id, panicking on anything but 201.
pub async fn create_node(app: &Router, collection: &str, parent: Option<&str>, title: &str) -> String {
    let (status, body) = post(
        app,
        &format!("/api/content/{}", collection),
        serde_json::json!({ "parent_id": parent, "title": title }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "creating {}: {}", collection, body);
    body["id"].as_str().unwrap().to_string()
}

/// Build a sector > ... > lesson chain and return the ids top-down.
pub async fn create_chain(app: &Router) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for collection in ["sectors", "topics", "subtopics", "modules", "submodules", "lessons"] {
        let parent = ids.last().map(String::as_str);
        let id = create_node(app, collection, parent, &format!("{} one", collection)).await;
        ids.push(id);
    }
    ids
}
