//! Inbox read and delete endpoints, called by the mobile client.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use signalbox_reader::{InboxPage, InboxQuery, clear_inbox, get_inbox};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for an inbox page request.
#[derive(Debug, Deserialize)]
pub struct InboxParams {
    /// RFC 3339 timestamp from a previous page's `next_cursor`.
    pub cursor: Option<DateTime<Utc>>,
    /// Requested page size; clamped server-side.
    pub limit: Option<i64>,
    /// Only events from the last N days; clamped to `1..=MAX_SINCE_DAYS`.
    pub since_days: Option<i64>,
    /// Comma-separated event types to include, e.g. `sent,delivered`.
    pub event_types: Option<String>,
}

/// Upper bound on the recency filter, matching the retention window.
const MAX_SINCE_DAYS: i64 = 90;

/// GET /messages/{app_id}/{external_id}
async fn get_user_messages(
    State(state): State<AppState>,
    Path((app_id, external_id)): Path<(String, String)>,
    Query(params): Query<InboxParams>,
) -> Result<Json<InboxPage>, ApiError> {
    let since = params
        .since_days
        .map(|days| state.clock.now() - chrono::Duration::days(days.clamp(1, MAX_SINCE_DAYS)));
    let kinds = params.event_types.map(|csv| {
        csv.split(',')
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .map(str::to_owned)
            .collect()
    });

    // Reads fail fast: no retry, so client latency stays predictable.
    let page = get_inbox(
        state.store.as_ref(),
        InboxQuery {
            app_id,
            external_id,
            cursor: params.cursor,
            since,
            limit: params.limit,
            kinds,
        },
    )
    .await?;

    tracing::debug!(
        app_id = %page.app_id,
        external_id = %page.external_id,
        count = page.message_count,
        "inbox page served"
    );

    Ok(Json(page))
}

/// Response for a per-user delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// DELETE /messages/{app_id}/{external_id}
async fn delete_user_messages(
    State(state): State<AppState>,
    Path((app_id, external_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = clear_inbox(state.store.as_ref(), &app_id, &external_id).await?;
    tracing::info!(%app_id, %external_id, deleted, "inbox cleared");
    Ok(Json(DeleteResponse { deleted }))
}

/// Returns the messages router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/messages/{app_id}/{external_id}",
        get(get_user_messages).delete(delete_user_messages),
    )
}
