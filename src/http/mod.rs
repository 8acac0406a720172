//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, tracing span)
//!     → [security: CORS, rate limit]
//!     → relay.rs (decode body, forward upstream)
//!     → response.rs (mirror upstream reply or render RelayError)
//!     → Send to client
//! ```

pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRelayRequestId, RequestIdExt, X_REQUEST_ID};
pub use response::{ErrorBody, RelayError};
pub use server::{AppState, HttpServer};
