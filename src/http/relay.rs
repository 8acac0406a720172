//! Relay handlers.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use serde_json::Value;

use crate::http::response::RelayError;
use crate::http::server::AppState;

/// Body of `GET /`.
pub const INSTRUCTIONS: &str = "This is just a test route, use POST instead";

/// GET / handler. Never contacts the upstream.
pub async fn instructions() -> &'static str {
    INSTRUCTIONS
}

/// POST / handler. Forwards the body and mirrors the upstream's status and JSON.
pub async fn relay(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Value>), RelayError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge {
                limit: state.max_body_bytes,
            }
        } else {
            RelayError::BadBody(rejection.body_text())
        }
    })?;

    let document = parse_body(&bytes)?;
    let reply = state.upstream.forward(&document).await?;

    if !reply.status.is_success() {
        tracing::info!(status = %reply.status, "Relaying upstream error status");
    }

    Ok((reply.status, Json(reply.body)))
}

/// Fallback for unknown paths.
pub async fn not_found(method: Method, uri: Uri) -> RelayError {
    RelayError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

/// Decode the inbound document. An empty body stands for `{}`.
pub fn parse_body(bytes: &[u8]) -> Result<Value, RelayError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| RelayError::InvalidJson(e.to_string()))
}
