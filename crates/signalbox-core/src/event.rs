//! The message-event model.
//!
//! A `MessageEvent` is one provider webhook callback (sent, delivered,
//! clicked, ...) for one notification to one user. Events sharing a
//! `notification_id` describe the lifecycle of a single logical
//! notification.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Canonical event categories. Providers send more event names than we
/// enumerate; unrecognized ones are kept as-is rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Sent,
    Delivered,
    Clicked,
    Dismissed,
    /// Any provider event name outside the known set, stored verbatim.
    Other(String),
}

impl EventKind {
    /// Maps a provider event name to a canonical kind. OneSignal sends
    /// `notification.sent` style names; the bare form is accepted too.
    #[must_use]
    pub fn parse(provider_name: &str) -> Self {
        let name = provider_name
            .strip_prefix("notification.")
            .unwrap_or(provider_name);
        match name {
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "clicked" => Self::Clicked,
            "dismissed" => Self::Dismissed,
            _ => Self::Other(provider_name.to_owned()),
        }
    }

    /// The canonical name persisted in the store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Clicked => "clicked",
            Self::Dismissed => "dismissed",
            Self::Other(name) => name,
        }
    }
}

/// A normalized event ready for insertion. `id` and `created_at` are
/// assigned by the store, never by the caller.
#[derive(Debug, Clone)]
pub struct NewMessageEvent {
    /// Owning application/tenant.
    pub app_id: String,
    /// End-user identity within that application.
    pub external_id: String,
    /// Canonical event category.
    pub event_type: EventKind,
    /// Correlates lifecycle events of one logical notification.
    pub notification_id: Option<String>,
    /// Storage-level idempotency key; redeliveries of the same logical
    /// event derive the same key.
    pub dedup_key: String,
    /// Extracted notification content (title, body, image, custom data).
    pub message_contents: Option<serde_json::Value>,
    /// The full original payload, stored verbatim for audit.
    pub event_payload: serde_json::Value,
}

/// A stored message event as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct MessageEvent {
    pub id: Uuid,
    pub app_id: String,
    pub external_id: String,
    pub event_type: String,
    pub notification_id: Option<String>,
    pub message_contents: Option<serde_json::Value>,
    pub event_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
