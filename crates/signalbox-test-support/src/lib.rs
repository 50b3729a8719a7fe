//! Shared test mocks and utilities for the Signalbox inbox backend.

mod clock;
mod store;

pub use clock::{FixedClock, SteppingClock};
pub use store::{FailingMessageEventStore, FlakyMessageEventStore, InMemoryMessageEventStore};
