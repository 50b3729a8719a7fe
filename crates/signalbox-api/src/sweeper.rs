//! Retention sweeper.
//!
//! A background task that periodically purges events older than the
//! retention window. It is pure cleanup: a failed or skipped sweep leaves
//! the data intact and the next tick tries again, so errors are logged and
//! never tear the task down.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use signalbox_core::clock::Clock;
use signalbox_core::error::InboxError;
use signalbox_core::store::MessageEventStore;

/// How long events are kept, in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

/// How often the sweeper runs.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Sweeper settings.
#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    /// Events older than this are purged.
    pub retention: chrono::Duration,
    /// Wall-clock period between sweeps.
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            retention: chrono::Duration::days(DEFAULT_RETENTION_DAYS),
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Runs a single sweep and returns the number of purged events.
///
/// # Errors
///
/// Propagates store errors; the caller decides whether to log or abort.
pub async fn sweep_once(
    store: &dyn MessageEventStore,
    clock: &dyn Clock,
    retention: chrono::Duration,
) -> Result<u64, InboxError> {
    let cutoff = clock.now() - retention;
    store.purge_older_than(cutoff).await
}

/// Spawns the sweeper loop, decoupled from request handling.
pub fn spawn(
    store: Arc<dyn MessageEventStore>,
    clock: Arc<dyn Clock>,
    config: SweeperConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        loop {
            ticker.tick().await;
            match sweep_once(store.as_ref(), clock.as_ref(), config.retention).await {
                Ok(0) => tracing::debug!("retention sweep found nothing to purge"),
                Ok(purged) => tracing::info!(purged, "retention sweep purged expired events"),
                Err(error) => {
                    // Safe to skip: the next tick retries against intact data.
                    tracing::error!(%error, "retention sweep failed");
                }
            }
        }
    })
}
