//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, overlay environment)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to the server once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing reads the environment mid-request
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The upstream credential is never serialized or logged

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_assets_config, load_config, parse_config, ConfigError};
pub use schema::{
    AssetsConfig, CorsConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RateLimitConfig, RelayConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_assets_config, validate_config, ValidationError};
