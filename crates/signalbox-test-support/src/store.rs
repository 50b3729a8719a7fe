//! Test stores — in-memory and fault-injecting `MessageEventStore`
//! implementations.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use signalbox_core::clock::Clock;
use signalbox_core::error::InboxError;
use signalbox_core::event::{MessageEvent, NewMessageEvent};
use signalbox_core::store::{InsertOutcome, ListFilter, MessageEventStore};

use crate::clock::SteppingClock;

/// In-memory store with the same dedup, ordering, and isolation semantics
/// as the Postgres implementation. Timestamps come from an injected clock;
/// the default steps one second per insert so orderings are deterministic.
pub struct InMemoryMessageEventStore {
    rows: Mutex<Vec<(String, MessageEvent)>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageEventStore {
    #[must_use]
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        Self::with_clock(Arc::new(SteppingClock::new(start, 1)))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Number of rows currently stored, across all users.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Snapshot of every stored row, for assertions.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageEvent> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }
}

impl Default for InMemoryMessageEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageEventStore for InMemoryMessageEventStore {
    async fn insert(&self, event: NewMessageEvent) -> Result<InsertOutcome, InboxError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|(key, _)| *key == event.dedup_key) {
            return Ok(InsertOutcome::Duplicate);
        }
        let id = Uuid::new_v4();
        rows.push((
            event.dedup_key,
            MessageEvent {
                id,
                app_id: event.app_id,
                external_id: event.external_id,
                event_type: event.event_type.as_str().to_owned(),
                notification_id: event.notification_id,
                message_contents: event.message_contents,
                event_payload: event.event_payload,
                created_at: self.clock.now(),
            },
        ));
        Ok(InsertOutcome::Inserted(id))
    }

    async fn list_by_user(
        &self,
        app_id: &str,
        external_id: &str,
        filter: ListFilter,
    ) -> Result<Vec<MessageEvent>, InboxError> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<MessageEvent> = rows
            .iter()
            .map(|(_, event)| event)
            .filter(|event| event.app_id == app_id && event.external_id == external_id)
            .filter(|event| filter.before.is_none_or(|before| event.created_at < before))
            .filter(|event| filter.since.is_none_or(|since| event.created_at >= since))
            .filter(|event| {
                filter
                    .kinds
                    .as_ref()
                    .is_none_or(|kinds| kinds.contains(&event.event_type))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        matching.truncate(usize::try_from(filter.limit).unwrap_or(0));
        Ok(matching)
    }

    async fn delete_by_user(&self, app_id: &str, external_id: &str) -> Result<u64, InboxError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(_, event)| !(event.app_id == app_id && event.external_id == external_id));
        Ok((before - rows.len()) as u64)
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, InboxError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(_, event)| event.created_at >= cutoff);
        Ok((before - rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), InboxError> {
        Ok(())
    }
}

/// Store whose every operation fails with `StoreUnavailable`.
#[derive(Debug, Default)]
pub struct FailingMessageEventStore;

#[async_trait]
impl MessageEventStore for FailingMessageEventStore {
    async fn insert(&self, _event: NewMessageEvent) -> Result<InsertOutcome, InboxError> {
        Err(InboxError::StoreUnavailable("injected failure".to_owned()))
    }

    async fn list_by_user(
        &self,
        _app_id: &str,
        _external_id: &str,
        _filter: ListFilter,
    ) -> Result<Vec<MessageEvent>, InboxError> {
        Err(InboxError::StoreUnavailable("injected failure".to_owned()))
    }

    async fn delete_by_user(&self, _app_id: &str, _external_id: &str) -> Result<u64, InboxError> {
        Err(InboxError::StoreUnavailable("injected failure".to_owned()))
    }

    async fn purge_older_than(&self, _cutoff: DateTime<Utc>) -> Result<u64, InboxError> {
        Err(InboxError::StoreUnavailable("injected failure".to_owned()))
    }

    async fn ping(&self) -> Result<(), InboxError> {
        Err(InboxError::StoreUnavailable("injected failure".to_owned()))
    }
}

/// Store that fails the first `failures` inserts, then delegates to an
/// in-memory store. Exercises the write-path retry policy.
pub struct FlakyMessageEventStore {
    inner: InMemoryMessageEventStore,
    failures_remaining: AtomicU32,
}

impl FlakyMessageEventStore {
    #[must_use]
    pub fn new(failures: u32) -> Self {
        Self {
            inner: InMemoryMessageEventStore::new(),
            failures_remaining: AtomicU32::new(failures),
        }
    }

    /// Snapshot of rows that made it past the injected failures.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageEvent> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl MessageEventStore for FlakyMessageEventStore {
    async fn insert(&self, event: NewMessageEvent) -> Result<InsertOutcome, InboxError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(InboxError::StoreUnavailable("injected failure".to_owned()));
        }
        self.inner.insert(event).await
    }

    async fn list_by_user(
        &self,
        app_id: &str,
        external_id: &str,
        filter: ListFilter,
    ) -> Result<Vec<MessageEvent>, InboxError> {
        self.inner.list_by_user(app_id, external_id, filter).await
    }

    async fn delete_by_user(&self, app_id: &str, external_id: &str) -> Result<u64, InboxError> {
        self.inner.delete_by_user(app_id, external_id).await
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, InboxError> {
        self.inner.purge_older_than(cutoff).await
    }

    async fn ping(&self) -> Result<(), InboxError> {
        self.inner.ping().await
    }
}
