//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and asset server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the per-request span
//! - The upstream credential never appears in logs

pub mod logging;
pub mod metrics;
