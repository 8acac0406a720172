//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (answer preflight, tag every response)
//!     → client_ip.rs (resolve client through trusted X-Forwarded-For hops)
//!     → rate_limit.rs (check per-client window)
//!     → Pass to relay handler
//! ```
//!
//! # Design Decisions
//! - CORS wraps the limiter so rejections still carry cross-origin headers
//! - No authentication of callers; the limiter is the only gate

pub mod client_ip;
pub mod cors;
pub mod rate_limit;
