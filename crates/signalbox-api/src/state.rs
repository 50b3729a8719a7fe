//! Shared application state.

use std::sync::Arc;

use signalbox_core::clock::Clock;
use signalbox_core::store::MessageEventStore;
use signalbox_ingest::AppRegistry;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The message event store.
    pub store: Arc<dyn MessageEventStore>,
    /// Time source for retention math.
    pub clock: Arc<dyn Clock>,
    /// Registered provider applications.
    pub registry: Arc<AppRegistry>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn MessageEventStore>,
        clock: Arc<dyn Clock>,
        registry: Arc<AppRegistry>,
    ) -> Self {
        Self {
            store,
            clock,
            registry,
        }
    }
}
