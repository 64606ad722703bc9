//! Request-level errors
//!
//! Every handler returns [`ApiError`] on failure; the `IntoResponse` impl maps
//! each variant to the status code the caller sees.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors a request handler can produce
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Inbound request carried no usable auth token
    #[error("Missing or empty {0} header")]
    Unauthorized(&'static str),

    /// Caller-supplied input could not be turned into an outbound request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Management API answered with a non-success status
    #[error("Upstream request failed: {status}")]
    Upstream { status: StatusCode },

    /// Management API could not be reached
    #[error("Failed to reach management endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    /// Management API answered with a payload of the wrong shape
    #[error("Failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Status code sent back to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status } => *status,
            Self::Transport(_) | Self::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
