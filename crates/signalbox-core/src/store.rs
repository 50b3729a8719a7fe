//! Event store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::InboxError;
use crate::event::{MessageEvent, NewMessageEvent};

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted(Uuid),
    /// A row with the same dedup key already exists. Not an error:
    /// providers redeliver on any non-2xx, so duplicates are expected.
    Duplicate,
}

/// Filter applied to a per-user listing.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Only events created strictly before this instant (pagination cursor).
    pub before: Option<DateTime<Utc>>,
    /// Only events created at or after this instant (recency filter).
    pub since: Option<DateTime<Utc>>,
    /// Only events whose `event_type` is in this set, when present.
    pub kinds: Option<Vec<String>>,
    /// Maximum rows returned. Callers clamp this before it reaches the store.
    pub limit: i64,
}

/// Durable, indexed persistence for message events.
///
/// Implementations must make `insert` safe under concurrent deliveries:
/// dedup is enforced by the storage engine, not by a check-then-act read.
#[async_trait]
pub trait MessageEventStore: Send + Sync {
    /// Persists one event. A detected duplicate is a success, not an error.
    async fn insert(&self, event: NewMessageEvent) -> Result<InsertOutcome, InboxError>;

    /// Lists events for one `(app_id, external_id)` pair, newest first.
    /// Never returns rows belonging to a different `app_id`.
    async fn list_by_user(
        &self,
        app_id: &str,
        external_id: &str,
        filter: ListFilter,
    ) -> Result<Vec<MessageEvent>, InboxError>;

    /// Removes all events for the pair; returns the number deleted.
    /// Zero is a valid result, not an error.
    async fn delete_by_user(&self, app_id: &str, external_id: &str) -> Result<u64, InboxError>;

    /// Removes all events created strictly before `cutoff`, across all
    /// applications and users. Returns the number deleted.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, InboxError>;

    /// Trivial round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), InboxError>;
}
