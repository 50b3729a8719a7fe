//! Webhook ingestion and health endpoints.
//!
//! The provider POSTs one JSON payload per notification lifecycle event.
//! The contract with the provider: any non-2xx response triggers a retry,
//! so only structurally invalid requests (unparseable body, unresolvable
//! application) get a failure status. Payloads that are malformed beyond
//! repair are acknowledged with a 200 and dropped.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use signalbox_core::error::InboxError;
use signalbox_core::event::NewMessageEvent;
use signalbox_core::store::{InsertOutcome, MessageEventStore};
use signalbox_ingest::normalize;

use crate::error::ApiError;
use crate::state::AppState;

/// Total insert attempts on the write path. Reads are never retried.
const WRITE_ATTEMPTS: u32 = 3;

/// Response for an accepted (or deliberately ignored) webhook delivery.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// `stored`, `duplicate`, or `ignored`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WebhookResponse {
    fn stored(event_id: Uuid) -> Self {
        Self {
            status: "stored",
            event_id: Some(event_id),
            reason: None,
        }
    }

    fn duplicate() -> Self {
        Self {
            status: "duplicate",
            event_id: None,
            reason: None,
        }
    }

    fn ignored(reason: String) -> Self {
        Self {
            status: "ignored",
            event_id: None,
            reason: Some(reason),
        }
    }
}

/// POST /webhooks/onesignal
async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let app_id = state
        .registry
        .resolve(payload.get("app_id").and_then(Value::as_str))?;

    let event = match normalize(app_id, &payload) {
        Ok(event) => event,
        Err(InboxError::MalformedEvent(reason)) => {
            // The payload can never become valid; acknowledge it so the
            // provider does not retry forever.
            tracing::warn!(app_id, %reason, "ignoring malformed webhook payload");
            return Ok(Json(WebhookResponse::ignored(reason)));
        }
        Err(other) => return Err(other.into()),
    };

    tracing::info!(
        app_id,
        external_id = %event.external_id,
        event_type = event.event_type.as_str(),
        notification_id = event.notification_id.as_deref().unwrap_or("-"),
        "webhook event received"
    );

    match insert_with_retry(state.store.as_ref(), event).await? {
        InsertOutcome::Inserted(id) => Ok(Json(WebhookResponse::stored(id))),
        InsertOutcome::Duplicate => Ok(Json(WebhookResponse::duplicate())),
    }
}

/// Inserts with a bounded number of retries on transient store errors.
/// A failed write surfaces as 5xx so the provider redelivers; the dedup
/// key makes the redelivery collapse onto the eventual stored row.
async fn insert_with_retry(
    store: &dyn MessageEventStore,
    event: NewMessageEvent,
) -> Result<InsertOutcome, InboxError> {
    let mut attempt = 1;
    loop {
        match store.insert(event.clone()).await {
            Ok(outcome) => return Ok(outcome),
            Err(err) if err.is_transient() && attempt < WRITE_ATTEMPTS => {
                tracing::warn!(attempt, error = %err, "transient insert failure, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Health response, reporting store connectivity separately from the
/// ingestion path.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// GET /webhooks/health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_healthy = state.store.ping().await.is_ok();
    Json(HealthResponse {
        status: if database_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database_healthy {
            "healthy"
        } else {
            "unavailable"
        },
    })
}

/// Returns the webhook router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/onesignal", post(receive_webhook))
        .route("/webhooks/health", get(health_check))
}
