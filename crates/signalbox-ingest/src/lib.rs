//! Signalbox Ingest — webhook event normalization.
//!
//! Turns raw provider webhook payloads of heterogeneous shape into
//! canonical [`signalbox_core::event::NewMessageEvent`] records, resolving
//! the source application against a fixed registry and deriving a stable
//! dedup key so redeliveries collapse to one stored row.

pub mod dedup;
pub mod normalize;
pub mod registry;

pub use normalize::normalize;
pub use registry::AppRegistry;
