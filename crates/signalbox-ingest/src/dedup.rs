//! Dedup key derivation.
//!
//! Providers retry webhook delivery on any non-2xx or timeout, so the same
//! logical event can arrive more than once. Each normalized event carries a
//! stable key the store enforces uniqueness on:
//!
//! 1. a provider event id, when the payload carries one, scoped by app;
//! 2. otherwise a SHA-256 digest of the identifying fields
//!    (app, user, event type, notification id);
//! 3. when there is no notification id either, the event is not
//!    deduplicatable and gets a fresh unique key.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derives the storage dedup key for one normalized event.
#[must_use]
pub fn derive_key(
    app_id: &str,
    external_id: &str,
    event_type: &str,
    notification_id: Option<&str>,
    provider_event_id: Option<&str>,
) -> String {
    if let Some(event_id) = provider_event_id.filter(|id| !id.is_empty()) {
        return format!("evt:{app_id}:{event_id}");
    }
    match notification_id.filter(|id| !id.is_empty()) {
        Some(notification_id) => {
            let mut hasher = Sha256::new();
            for part in [app_id, external_id, event_type, notification_id] {
                hasher.update(part.as_bytes());
                hasher.update(b"\n");
            }
            format!("sha:{:x}", hasher.finalize())
        }
        None => format!("uniq:{}", Uuid::new_v4()),
    }
}
