//! Session relay subsystem.
//!
//! # Data Flow
//! ```text
//! Client request (matched to a ProxyRoute by the http layer)
//!     → inbound.rs (cookie + JSON body, per ForwardPolicy)
//!     → upstream.rs (single hop, no retries)
//!     → response.rs (status + body as-is, set-cookie per policy)
//!     → or error.rs ({ "detail" } with 413/500/503)
//! ```
//!
//! # Design Decisions
//! - Cookies are opaque header values: copied, never parsed or logged
//! - Bodies are forwarded as bytes, so JSON passes through losslessly
//! - No state survives an invocation

pub mod error;
pub mod handler;
pub mod inbound;
pub mod response;
pub mod upstream;

pub use error::{ErrorBody, RelayError, RelayFailure};
pub use handler::relay;
pub use inbound::InboundRequest;
pub use response::UpstreamResponse;
pub use upstream::UpstreamClient;
