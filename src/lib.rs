//! Syntax analysis relay and static asset server.

pub mod assets;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use assets::AssetServer;
pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
