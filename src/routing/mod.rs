//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → route.rs (parse method, build ForwardPolicy)
//!     → table.rs (immutable RouteTable)
//!     → http::server mounts one method router per public path
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Each route is an `Arc<ProxyRoute>` captured by its handler
//! - Deterministic: same method + path always selects the same route

pub mod route;
pub mod table;

pub use route::{ForwardPolicy, ProxyRoute};
pub use table::RouteTable;
