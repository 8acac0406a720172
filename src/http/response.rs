//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map every relay failure to an HTTP status and a stable error kind
//! - Render failures as `{"error": <kind>, "message": <text>}`
//!
//! # Design Decisions
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Upstream transport failures and non-JSON bodies result in 502 Bad Gateway
//! - No failure escapes as a panic or a dropped connection

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Every failure the relay can answer with.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound body is not valid JSON.
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    /// Inbound body exceeds the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Inbound body could not be read.
    #[error("failed to read request body: {0}")]
    BadBody(String),

    /// Client exceeded its request window.
    #[error("Too many requests, please try again later.")]
    RateLimited { retry_after_secs: u64 },

    /// No route for the requested path.
    #[error("Cannot {method} {path}")]
    NotFound { method: String, path: String },

    /// Upstream call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    /// Status code and stable kind identifier.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            RelayError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "invalid_json"),
            RelayError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            RelayError::BadBody(_) => (StatusCode::BAD_REQUEST, "invalid_body"),
            RelayError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            RelayError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            RelayError::Upstream(UpstreamError::Timeout(_) | UpstreamError::ConnectTimeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout")
            }
            RelayError::Upstream(UpstreamError::Unreachable(_)) => {
                (StatusCode::BAD_GATEWAY, "upstream_unavailable")
            }
            RelayError::Upstream(UpstreamError::InvalidJson { .. }) => {
                (StatusCode::BAD_GATEWAY, "upstream_invalid_response")
            }
            RelayError::Upstream(UpstreamError::ResponseTooLarge { .. }) => {
                (StatusCode::BAD_GATEWAY, "upstream_response_too_large")
            }
            RelayError::Upstream(UpstreamError::Build(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream_misconfigured")
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();
        if status.is_server_error() {
            tracing::error!(kind, error = %self, "Relay request failed");
        } else {
            tracing::debug!(kind, error = %self, "Relay request rejected");
        }

        let retry_after = match &self {
            RelayError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = Json(ErrorBody {
            error: kind.to_string(),
            message: self.to_string(),
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
