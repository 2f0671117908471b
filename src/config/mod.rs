//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compiled defaults (incl. route table)
//!     → loader.rs (optional TOML file, BACKEND_URL override)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → compiled into routes + upstream client at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so the relay runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{config_path, load_config, ConfigError, BACKEND_URL_ENV};
pub use schema::{
    default_routes, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, RouteConfig,
    DEFAULT_BACKEND_URL,
};
