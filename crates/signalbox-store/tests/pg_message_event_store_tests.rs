//! Integration tests for `PgMessageEventStore`. Each test runs against a
//! fresh database prepared from the workspace migrations.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use signalbox_core::error::InboxError;
use signalbox_core::event::{EventKind, NewMessageEvent};
use signalbox_core::store::{InsertOutcome, ListFilter, MessageEventStore};
use signalbox_store::PgMessageEventStore;

/// Helper to build a `NewMessageEvent` with sensible defaults.
fn make_event(app_id: &str, external_id: &str, kind: EventKind, dedup_key: &str) -> NewMessageEvent {
    NewMessageEvent {
        app_id: app_id.to_owned(),
        external_id: external_id.to_owned(),
        event_type: kind,
        notification_id: Some("n-1".to_owned()),
        dedup_key: dedup_key.to_owned(),
        message_contents: Some(serde_json::json!({"title": "Hello"})),
        event_payload: serde_json::json!({"event": "notification.sent"}),
    }
}

fn default_filter() -> ListFilter {
    ListFilter {
        before: None,
        since: None,
        kinds: None,
        limit: 50,
    }
}

/// Rows get `created_at = NOW()`; tests that need a spread of timestamps
/// backdate rows directly.
async fn backdate(pool: &PgPool, id: Uuid, days: i64) {
    sqlx::query("UPDATE message_events SET created_at = created_at - make_interval(days => $2::int) WHERE id = $1")
        .bind(id)
        .bind(days)
        .execute(pool)
        .await
        .unwrap();
}

fn inserted_id(outcome: InsertOutcome) -> Uuid {
    match outcome {
        InsertOutcome::Inserted(id) => id,
        InsertOutcome::Duplicate => panic!("expected Inserted, got Duplicate"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_insert_and_list_round_trip(pool: PgPool) {
    let store = PgMessageEventStore::new(pool);
    let event = make_event("a1", "u1", EventKind::Sent, "k1");

    let outcome = store.insert(event.clone()).await.unwrap();
    let id = inserted_id(outcome);

    let listed = store.list_by_user("a1", "u1", default_filter()).await.unwrap();
    assert_eq!(listed.len(), 1);

    let row = &listed[0];
    assert_eq!(row.id, id);
    assert_eq!(row.app_id, "a1");
    assert_eq!(row.external_id, "u1");
    assert_eq!(row.event_type, "sent");
    assert_eq!(row.notification_id.as_deref(), Some("n-1"));
    assert_eq!(row.message_contents, event.message_contents);
    assert_eq!(row.event_payload, event.event_payload);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_dedup_key_collapses_to_one_row(pool: PgPool) {
    let store = PgMessageEventStore::new(pool);

    let first = store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap();
    let second = store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap();

    assert!(matches!(first, InsertOutcome::Inserted(_)));
    assert_eq!(second, InsertOutcome::Duplicate);

    let listed = store.list_by_user("a1", "u1", default_filter()).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_orders_newest_first_and_respects_cursor(pool: PgPool) {
    let store = PgMessageEventStore::new(pool.clone());

    let oldest = inserted_id(store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap());
    let middle = inserted_id(store.insert(make_event("a1", "u1", EventKind::Delivered, "k2")).await.unwrap());
    let newest = inserted_id(store.insert(make_event("a1", "u1", EventKind::Clicked, "k3")).await.unwrap());
    backdate(&pool, oldest, 2).await;
    backdate(&pool, middle, 1).await;

    let listed = store.list_by_user("a1", "u1", default_filter()).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![newest, middle, oldest]);
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    // Cursor at the newest row's timestamp excludes it (strictly before).
    let filter = ListFilter {
        before: Some(listed[0].created_at),
        ..default_filter()
    };
    let older = store.list_by_user("a1", "u1", filter).await.unwrap();
    let ids: Vec<Uuid> = older.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![middle, oldest]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_since_excludes_events_before_the_bound(pool: PgPool) {
    let store = PgMessageEventStore::new(pool.clone());
    let old = inserted_id(store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap());
    let recent = inserted_id(store.insert(make_event("a1", "u1", EventKind::Sent, "k2")).await.unwrap());
    backdate(&pool, old, 30).await;

    let filter = ListFilter {
        since: Some(Utc::now() - Duration::days(7)),
        ..default_filter()
    };
    let listed = store.list_by_user("a1", "u1", filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, recent);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_applies_limit_and_kind_filter(pool: PgPool) {
    let store = PgMessageEventStore::new(pool);
    store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap();
    store.insert(make_event("a1", "u1", EventKind::Clicked, "k2")).await.unwrap();
    store.insert(make_event("a1", "u1", EventKind::Clicked, "k3")).await.unwrap();

    let filter = ListFilter {
        limit: 2,
        ..default_filter()
    };
    assert_eq!(store.list_by_user("a1", "u1", filter).await.unwrap().len(), 2);

    let filter = ListFilter {
        kinds: Some(vec!["sent".to_owned()]),
        ..default_filter()
    };
    let listed = store.list_by_user("a1", "u1", filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].event_type, "sent");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_never_leaks_across_app_or_user(pool: PgPool) {
    let store = PgMessageEventStore::new(pool);
    store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap();
    store.insert(make_event("a2", "u1", EventKind::Sent, "k2")).await.unwrap();
    store.insert(make_event("a1", "u2", EventKind::Sent, "k3")).await.unwrap();

    let listed = store.list_by_user("a1", "u1", default_filter()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|e| e.app_id == "a1" && e.external_id == "u1"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_by_user_counts_and_isolates(pool: PgPool) {
    let store = PgMessageEventStore::new(pool);
    store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap();
    store.insert(make_event("a1", "u1", EventKind::Clicked, "k2")).await.unwrap();
    store.insert(make_event("a1", "u2", EventKind::Sent, "k3")).await.unwrap();

    assert_eq!(store.delete_by_user("a1", "u1").await.unwrap(), 2);
    assert_eq!(store.delete_by_user("a1", "u1").await.unwrap(), 0);

    let other = store.list_by_user("a1", "u2", default_filter()).await.unwrap();
    assert_eq!(other.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_purge_older_than_removes_only_expired_rows(pool: PgPool) {
    let store = PgMessageEventStore::new(pool.clone());
    let expired = inserted_id(store.insert(make_event("a1", "u1", EventKind::Sent, "k1")).await.unwrap());
    let fresh = inserted_id(store.insert(make_event("a1", "u1", EventKind::Sent, "k2")).await.unwrap());
    backdate(&pool, expired, 100).await;

    let purged = store.purge_older_than(Utc::now() - Duration::days(90)).await.unwrap();
    assert_eq!(purged, 1);

    let listed = store.list_by_user("a1", "u1", default_filter()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, fresh);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ping_round_trips(pool: PgPool) {
    let store = PgMessageEventStore::new(pool);
    store.ping().await.unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_operations_time_out_as_store_unavailable(pool: PgPool) {
    // A zero timeout elapses before any round trip completes; the store
    // must surface that as a transient error instead of hanging.
    let store = PgMessageEventStore::with_timeout(pool, std::time::Duration::ZERO);

    let err = store.ping().await.unwrap_err();
    assert!(matches!(err, InboxError::StoreUnavailable(_)));
    assert!(err.is_transient());

    let err = store
        .insert(make_event("a1", "u1", EventKind::Sent, "k1"))
        .await
        .unwrap_err();
    assert!(matches!(err, InboxError::StoreUnavailable(_)));
}
