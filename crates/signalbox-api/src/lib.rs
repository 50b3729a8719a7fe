//! Signalbox API — HTTP surface for webhook ingestion and inbox reads.

pub mod error;
pub mod routes;
pub mod state;
pub mod sweeper;
