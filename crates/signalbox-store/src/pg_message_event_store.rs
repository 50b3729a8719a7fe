//! `PostgreSQL` implementation of the `MessageEventStore` trait.
//!
//! Idempotency is enforced by the database: inserts land with
//! `ON CONFLICT (dedup_key) DO NOTHING`, so concurrent redeliveries of the
//! same logical event race safely. `created_at` is assigned by the database
//! at insert time and never by the caller. Every operation runs under a
//! bounded timeout and degrades to `StoreUnavailable` instead of hanging.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use signalbox_core::error::InboxError;
use signalbox_core::event::{MessageEvent, NewMessageEvent};
use signalbox_core::store::{InsertOutcome, ListFilter, MessageEventStore};

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed message event store.
#[derive(Debug, Clone)]
pub struct PgMessageEventStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgMessageEventStore {
    /// Creates a store with the default per-operation timeout.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_timeout(pool, DEFAULT_OP_TIMEOUT)
    }

    /// Creates a store with a custom per-operation timeout.
    #[must_use]
    pub fn with_timeout(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Runs one store operation under the bounded timeout, collapsing both
    /// driver errors and elapsed timeouts into `StoreUnavailable`.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, sqlx::Error>> + Send,
    ) -> Result<T, InboxError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                tracing::error!(op, %error, "store operation failed");
                Err(InboxError::StoreUnavailable(format!("{op}: {error}")))
            }
            Err(_) => {
                tracing::error!(
                    op,
                    timeout_ms = u64::try_from(self.op_timeout.as_millis()).unwrap_or(u64::MAX),
                    "store operation timed out"
                );
                Err(InboxError::StoreUnavailable(format!("{op}: timed out")))
            }
        }
    }
}

/// Row shape read back from `message_events`.
#[derive(sqlx::FromRow)]
struct MessageEventRow {
    id: Uuid,
    app_id: String,
    external_id: String,
    event_type: String,
    notification_id: Option<String>,
    message_contents: Option<serde_json::Value>,
    event_payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<MessageEventRow> for MessageEvent {
    fn from(row: MessageEventRow) -> Self {
        Self {
            id: row.id,
            app_id: row.app_id,
            external_id: row.external_id,
            event_type: row.event_type,
            notification_id: row.notification_id,
            message_contents: row.message_contents,
            event_payload: row.event_payload,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl MessageEventStore for PgMessageEventStore {
    async fn insert(&self, event: NewMessageEvent) -> Result<InsertOutcome, InboxError> {
        let id = Uuid::new_v4();
        let inserted: Option<(Uuid,)> = self
            .bounded(
                "insert",
                sqlx::query_as(
                    r"
                    INSERT INTO message_events
                        (id, app_id, external_id, event_type, notification_id,
                         dedup_key, message_contents, event_payload)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ON CONFLICT (dedup_key) DO NOTHING
                    RETURNING id
                    ",
                )
                .bind(id)
                .bind(&event.app_id)
                .bind(&event.external_id)
                .bind(event.event_type.as_str())
                .bind(&event.notification_id)
                .bind(&event.dedup_key)
                .bind(&event.message_contents)
                .bind(&event.event_payload)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(match inserted {
            Some((id,)) => InsertOutcome::Inserted(id),
            None => InsertOutcome::Duplicate,
        })
    }

    async fn list_by_user(
        &self,
        app_id: &str,
        external_id: &str,
        filter: ListFilter,
    ) -> Result<Vec<MessageEvent>, InboxError> {
        let rows: Vec<MessageEventRow> = self
            .bounded(
                "list_by_user",
                sqlx::query_as(
                    r"
                    SELECT id, app_id, external_id, event_type, notification_id,
                           message_contents, event_payload, created_at
                    FROM message_events
                    WHERE app_id = $1
                      AND external_id = $2
                      AND ($3::timestamptz IS NULL OR created_at < $3)
                      AND ($4::timestamptz IS NULL OR created_at >= $4)
                      AND ($5::text[] IS NULL OR event_type = ANY($5))
                    ORDER BY created_at DESC, id DESC
                    LIMIT $6
                    ",
                )
                .bind(app_id)
                .bind(external_id)
                .bind(filter.before)
                .bind(filter.since)
                .bind(&filter.kinds)
                .bind(filter.limit)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_by_user(&self, app_id: &str, external_id: &str) -> Result<u64, InboxError> {
        let result = self
            .bounded(
                "delete_by_user",
                sqlx::query("DELETE FROM message_events WHERE app_id = $1 AND external_id = $2")
                    .bind(app_id)
                    .bind(external_id)
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, InboxError> {
        let result = self
            .bounded(
                "purge_older_than",
                sqlx::query("DELETE FROM message_events WHERE created_at < $1")
                    .bind(cutoff)
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), InboxError> {
        self.bounded(
            "ping",
            sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool),
        )
        .await?;
        Ok(())
    }
}
