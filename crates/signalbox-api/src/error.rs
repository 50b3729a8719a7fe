//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use signalbox_core::error::InboxError;

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `InboxError` that implements `IntoResponse`.
///
/// `MalformedEvent` reaches this mapping only outside the webhook boundary;
/// the webhook handler acknowledges malformed payloads with a 200 so the
/// provider stops retrying something that can never become valid.
#[derive(Debug)]
pub struct ApiError(pub InboxError);

impl From<InboxError> for ApiError {
    fn from(err: InboxError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            InboxError::MalformedEvent(_) => (StatusCode::BAD_REQUEST, "malformed_event"),
            InboxError::UnknownApplication(_) => (StatusCode::NOT_FOUND, "unknown_application"),
            InboxError::InvalidIdentity(_) => (StatusCode::BAD_REQUEST, "invalid_identity"),
            InboxError::StoreUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
