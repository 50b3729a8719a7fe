//! Event normalization.
//!
//! Maps a raw provider webhook payload (shape varies by event type) into a
//! canonical [`NewMessageEvent`]. The caller resolves the application first
//! (see [`crate::registry`]); this module only trusts the payload for the
//! remaining fields.

use serde_json::{Map, Value, json};

use signalbox_core::error::InboxError;
use signalbox_core::event::{EventKind, NewMessageEvent};

use crate::dedup;

/// Normalizes one webhook payload for the given (already resolved)
/// application.
///
/// # Errors
///
/// Returns `MalformedEvent` when the payload is missing the event-type
/// indicator or the user identity. Such payloads can never become valid,
/// so the webhook boundary acknowledges them without storing anything.
pub fn normalize(app_id: &str, payload: &Value) -> Result<NewMessageEvent, InboxError> {
    let provider_name = non_empty_str(payload, "event")
        .ok_or_else(|| InboxError::MalformedEvent("payload has no event type".to_owned()))?;
    let external_id = non_empty_str(payload, "external_id")
        .ok_or_else(|| InboxError::MalformedEvent("payload has no external_id".to_owned()))?;

    let event_type = EventKind::parse(provider_name);
    // OneSignal sends the notification id either as `notification_id` or
    // as a bare `id` depending on the event type.
    let notification_id = non_empty_str(payload, "notification_id")
        .or_else(|| non_empty_str(payload, "id"))
        .map(str::to_owned);

    let dedup_key = dedup::derive_key(
        app_id,
        external_id,
        event_type.as_str(),
        notification_id.as_deref(),
        non_empty_str(payload, "event_id"),
    );

    Ok(NewMessageEvent {
        app_id: app_id.to_owned(),
        external_id: external_id.to_owned(),
        event_type,
        notification_id,
        dedup_key,
        message_contents: extract_contents(payload),
        event_payload: payload.clone(),
    })
}

/// Pulls the renderable notification content out of the payload so the
/// inbox reader never has to interpret raw provider payloads.
fn extract_contents(payload: &Value) -> Option<Value> {
    let mut contents = Map::new();

    if let Some(title) = payload.get("headings").and_then(localized_text) {
        contents.insert("title".to_owned(), json!(title));
    }
    if let Some(body) = payload.get("contents").and_then(localized_text) {
        contents.insert("body".to_owned(), json!(body));
    }
    if let Some(data) = payload.get("data") {
        contents.insert("data".to_owned(), data.clone());
    }
    if let Some(url) = non_empty_str(payload, "url") {
        contents.insert("url".to_owned(), json!(url));
    }
    if let Some(image) = non_empty_str(payload, "big_picture") {
        contents.insert("image".to_owned(), json!(image));
    }
    if let Some(attachments) = payload.get("ios_attachments") {
        contents.insert("ios_attachments".to_owned(), attachments.clone());
    }

    if contents.is_empty() {
        None
    } else {
        Some(Value::Object(contents))
    }
}

/// Picks a display string from a localization map, preferring `en` and
/// falling back to any available language.
fn localized_text(localized: &Value) -> Option<&str> {
    let map = localized.as_object()?;
    map.get("en")
        .and_then(Value::as_str)
        .or_else(|| map.values().find_map(Value::as_str))
}

fn non_empty_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
