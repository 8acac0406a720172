//! Static frontend assets.
//!
//! Runs as its own process and shares nothing with the relay beyond
//! configuration loading, logging and shutdown handling.

pub mod server;

pub use server::AssetServer;
