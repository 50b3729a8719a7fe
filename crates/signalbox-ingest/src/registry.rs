//! Application registry.
//!
//! The webhook endpoint trusts a fixed allowlist of provider application
//! ids, configured at startup. Payloads naming any other application are
//! rejected rather than stored under an arbitrary tenant.

use std::collections::HashSet;

use signalbox_core::error::InboxError;

/// The set of provider application ids this deployment serves.
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    app_ids: HashSet<String>,
}

impl AppRegistry {
    /// Builds a registry from an iterator of application ids.
    pub fn new<I, S>(app_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            app_ids: app_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a comma-separated id list, e.g. the `ONESIGNAL_APP_IDS`
    /// environment variable. Whitespace around entries is ignored.
    #[must_use]
    pub fn from_csv(csv: &str) -> Self {
        Self::new(
            csv.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_owned),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.app_ids.is_empty()
    }

    /// Resolves the application claimed by a payload against the registry.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` when the payload carries no `app_id` at all
    /// and `UnknownApplication` when the id is not registered.
    pub fn resolve(&self, claimed_app_id: Option<&str>) -> Result<&str, InboxError> {
        let app_id = claimed_app_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| InboxError::MalformedEvent("payload has no app_id".to_owned()))?;
        self.app_ids
            .get(app_id)
            .map(String::as_str)
            .ok_or_else(|| InboxError::UnknownApplication(app_id.to_owned()))
    }
}
