//! Upstream analysis API subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound JSON body (serde_json::Value)
//!     → client.rs (serialize, POST to endpoint?key=...)
//!     → await response (bounded by connect + total timeout)
//!     → parse JSON body
//!     → UpstreamReply { status, body } or UpstreamError
//! ```
//!
//! # Design Decisions
//! - Exactly one outbound call per relayed request; no retries
//! - The endpoint URL is built once, at startup
//! - Every failure is typed before it reaches the HTTP layer

pub mod client;

pub use client::{UpstreamClient, UpstreamError, UpstreamReply};
