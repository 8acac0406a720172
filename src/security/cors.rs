//! Cross-origin resource sharing policy.

use std::time::Duration;

use axum::http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;
use crate::http::request::X_REQUEST_ID;
use crate::security::rate_limit::{X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING};

/// Build the CORS layer. With `allow_any_origin` every origin may call the
/// relay; otherwise no cross-origin headers are emitted.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.allow_any_origin {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(X_REQUEST_ID),
            HeaderName::from_static(X_RATELIMIT_LIMIT),
            HeaderName::from_static(X_RATELIMIT_REMAINING),
            axum::http::header::RETRY_AFTER,
        ]);

    match config.max_age_secs {
        Some(secs) => layer.max_age(Duration::from_secs(secs)),
        None => layer,
    }
}
