//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use signalbox_api::routes;
use signalbox_api::state::AppState;
use signalbox_core::store::MessageEventStore;
use signalbox_ingest::AppRegistry;
use signalbox_test_support::FixedClock;

/// Fixed timestamp used across all integration tests.
pub fn fixed_now() -> chrono::DateTime<chrono::Utc> {
    chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap()
}

/// Build the full app router over the given store, with a deterministic
/// clock and a registry of two known applications. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app(store: Arc<dyn MessageEventStore>) -> Router {
    let app_state = AppState::new(
        store,
        Arc::new(FixedClock(fixed_now())),
        Arc::new(AppRegistry::new(["app-one", "app-two"])),
    );

    Router::new()
        .merge(routes::webhooks::router())
        .merge(routes::messages::router())
        .with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value =
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// A well-formed `notification.sent` webhook payload for `app-one`.
pub fn sent_payload(external_id: &str, notification_id: &str) -> serde_json::Value {
    serde_json::json!({
        "event": "notification.sent",
        "app_id": "app-one",
        "external_id": external_id,
        "notification_id": notification_id,
        "headings": {"en": "Order shipped"},
        "contents": {"en": "Your parcel is on its way"}
    })
}
