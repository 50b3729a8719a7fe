//! Signalbox Reader — shapes event-store queries for client consumption.
//!
//! The mobile client renders its notification inbox from these views. The
//! reader validates identity, clamps page sizes, and turns full-page
//! results into a cursor the client can page further back with. It never
//! exposes the raw `event_payload`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use signalbox_core::error::InboxError;
use signalbox_core::event::MessageEvent;
use signalbox_core::store::{ListFilter, MessageEventStore};

/// Page size applied when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Upper bound on page size, bounding response size and query cost.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Parameters of one inbox page request.
#[derive(Debug, Clone, Default)]
pub struct InboxQuery {
    pub app_id: String,
    pub external_id: String,
    /// Pagination cursor: only events created strictly before this instant.
    pub cursor: Option<DateTime<Utc>>,
    /// Recency filter: only events created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Requested page size; clamped to `1..=MAX_PAGE_SIZE`.
    pub limit: Option<i64>,
    /// Optional event-type filter, e.g. only `sent` rows.
    pub kinds: Option<Vec<String>>,
}

/// One inbox entry as served to the client.
#[derive(Debug, Clone, Serialize)]
pub struct InboxMessage {
    pub id: Uuid,
    pub event_type: String,
    pub notification_id: Option<String>,
    pub message_contents: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEvent> for InboxMessage {
    fn from(event: MessageEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
            notification_id: event.notification_id,
            message_contents: event.message_contents,
            created_at: event.created_at,
        }
    }
}

/// One page of a user's inbox, newest first.
#[derive(Debug, Serialize)]
pub struct InboxPage {
    pub app_id: String,
    pub external_id: String,
    pub message_count: usize,
    pub messages: Vec<InboxMessage>,
    /// Present iff the page was full: pass it back as `cursor` to fetch
    /// the next page. Absence signals end of history.
    ///
    /// The cursor is a plain timestamp. Two rows sharing a `created_at`
    /// exactly at a page boundary cannot be told apart by it, so one of
    /// them may be skipped; timestamps are assigned per insert by the
    /// store, making such ties unexpected in practice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<DateTime<Utc>>,
}

/// Retrieves one page of the inbox for `(app_id, external_id)`.
///
/// # Errors
///
/// Returns `InvalidIdentity` for an empty `app_id` or `external_id`, and
/// propagates store errors unchanged (reads fail fast, no retry).
pub async fn get_inbox(
    store: &dyn MessageEventStore,
    query: InboxQuery,
) -> Result<InboxPage, InboxError> {
    validate_identity(&query.app_id, &query.external_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let events = store
        .list_by_user(
            &query.app_id,
            &query.external_id,
            ListFilter {
                before: query.cursor,
                since: query.since,
                kinds: query.kinds,
                limit,
            },
        )
        .await?;

    let page_is_full = events.len() as i64 == limit;
    let next_cursor = if page_is_full {
        events.last().map(|event| event.created_at)
    } else {
        None
    };
    let messages: Vec<InboxMessage> = events.into_iter().map(Into::into).collect();

    Ok(InboxPage {
        app_id: query.app_id,
        external_id: query.external_id,
        message_count: messages.len(),
        messages,
        next_cursor,
    })
}

/// Deletes every stored event for `(app_id, external_id)` and returns the
/// count removed. Deleting an empty inbox returns zero.
///
/// # Errors
///
/// Returns `InvalidIdentity` for an empty `app_id` or `external_id`.
pub async fn clear_inbox(
    store: &dyn MessageEventStore,
    app_id: &str,
    external_id: &str,
) -> Result<u64, InboxError> {
    validate_identity(app_id, external_id)?;
    store.delete_by_user(app_id, external_id).await
}

fn validate_identity(app_id: &str, external_id: &str) -> Result<(), InboxError> {
    if app_id.trim().is_empty() {
        return Err(InboxError::InvalidIdentity("app_id must not be empty".to_owned()));
    }
    if external_id.trim().is_empty() {
        return Err(InboxError::InvalidIdentity(
            "external_id must not be empty".to_owned(),
        ));
    }
    Ok(())
}
