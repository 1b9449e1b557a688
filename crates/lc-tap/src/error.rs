//! TAP client and proxy error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors raised while talking to a TAP service or a proxy in front of one.
#[derive(Debug, Error)]
pub enum TapError {
    /// HTTP transport error (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, as text.
        message: String,
    },

    /// The response body was not the JSON a query result must be.
    #[error("parse error: {0}")]
    Parse(String),

    /// Binding or serving the proxy failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the proxy route, rendered as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no adql provided")]
    MissingQuery,

    #[error("no adql provided (use POST with JSON {{adql}})")]
    MethodNotAllowed,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    Upstream(#[from] TapError),
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuery | Self::MethodNotAllowed | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "adql proxy error");
        } else {
            tracing::debug!(error = %self, "rejected adql request");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
