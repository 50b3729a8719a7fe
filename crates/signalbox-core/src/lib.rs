//! Signalbox Core — shared domain types and abstractions.
//!
//! This crate defines the message-event model, the error taxonomy, and the
//! traits the other crates depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod store;
