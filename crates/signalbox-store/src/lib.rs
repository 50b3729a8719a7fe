//! Signalbox Store — `PostgreSQL` persistence for message events.

pub mod pg_message_event_store;

pub use pg_message_event_store::PgMessageEventStore;
