//! Test clocks — deterministic `Clock` implementations.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use signalbox_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock that advances by a fixed step on every `now()` call, so
/// consecutive inserts get strictly increasing timestamps.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    step_seconds: i64,
    ticks: AtomicI64,
}

impl SteppingClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>, step_seconds: i64) -> Self {
        Self {
            start,
            step_seconds,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick * self.step_seconds)
    }
}
