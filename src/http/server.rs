//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handlers
//! - Wire up middleware (request ID, tracing, CORS, rate limit, body limit)
//! - Bind server to listener with peer address info
//! - Run the rate-limit janitor alongside the server
//! - Stop on the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::relay;
use crate::http::request::{make_request_span, MakeRelayRequestId};
use crate::observability::metrics;
use crate::security::cors::cors_layer;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub max_body_bytes: usize,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    limiter: Option<Arc<RateLimiterState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config.upstream, &config.timeouts, &config.limits)?;

        let state = AppState {
            upstream,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiterState::new(&config.rate_limit)));

        let router = Self::build_router(&config, state, limiter.clone());
        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers listed later wrap earlier ones, so the outermost is the request
    /// ID and the innermost is the body limit.
    fn build_router(
        config: &RelayConfig,
        state: AppState,
        limiter: Option<Arc<RateLimiterState>>,
    ) -> Router {
        let mut router = Router::new()
            .route("/", get(relay::instructions).post(relay::relay))
            .fallback(relay::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes));

        if let Some(limiter) = limiter {
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        router
            .layer(cors_layer(&config.cors))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
            .layer(SetRequestIdLayer::x_request_id(MakeRelayRequestId))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Relay server listening");

        let janitor = self.limiter.clone().map(|limiter| {
            let every = Duration::from_secs(self.config.rate_limit.purge_interval_secs);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(every);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let removed = limiter.limiter.purge_expired(Instant::now());
                    let tracked = limiter.limiter.tracked_clients();
                    metrics::record_tracked_clients(tracked);
                    tracing::debug!(removed, tracked, "Rate limit counters purged");
                }
            })
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        if let Some(janitor) = janitor {
            janitor.abort();
        }

        tracing::info!("HTTP server stopped");
        result
    }
}
