//! Static asset server.
//!
//! # Responsibilities
//! - Map request paths to files under the configured root
//! - Infer content type from the file extension
//! - Serve `index.html` for directory paths
//! - Answer unmatched paths with 404, whatever the method

use std::path::PathBuf;

use axum::{
    handler::HandlerWithoutStateExt,
    http::{Method, StatusCode, Uri},
    middleware,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::AssetsConfig;
use crate::observability::metrics;

/// HTTP server for the pre-built frontend.
pub struct AssetServer {
    router: Router,
    root: PathBuf,
}

impl AssetServer {
    pub fn new(config: &AssetsConfig) -> Self {
        let root = PathBuf::from(&config.root);
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Asset root is not a directory; every path will 404");
        }

        let files = ServeDir::new(&root)
            .append_index_html_on_directories(true)
            .call_fallback_on_method_not_allowed(true)
            .not_found_service(asset_not_found.into_service());

        let router = Router::new()
            .fallback_service(files)
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(TraceLayer::new_for_http());

        Self { router, root }
    }

    /// The assembled router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, root = %self.root.display(), "Static server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Static server stopped");
        Ok(())
    }
}

async fn asset_not_found(method: Method, uri: Uri) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Cannot {} {}", method, uri.path()))
}
