//! Session relay library.
//!
//! A stateless HTTP relay between browsers and an upstream auth/resource
//! API. Each public endpoint forwards to a fixed upstream path, carrying the
//! session cookie in and `set-cookie` out according to its route policy.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
