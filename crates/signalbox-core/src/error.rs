//! Domain error types.

use thiserror::Error;

/// Top-level error type for the ingestion and inbox paths.
#[derive(Debug, Error)]
pub enum InboxError {
    /// The payload is unparseable or missing a required field. The payload
    /// can never become valid, so callers must not ask the provider to
    /// retry it.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// The payload names an application that is not in the registry.
    #[error("unknown application: {0}")]
    UnknownApplication(String),

    /// An empty `app_id` or `external_id` on a read/delete request.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// The event store is unreachable, timed out, or failed transiently.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl InboxError {
    /// Whether a retry of the same operation could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
