//! Compiled route entries.

use axum::http::Method;

use crate::config::validation::ValidationError;
use crate::config::RouteConfig;

/// How a route treats credentials and bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForwardPolicy {
    /// Read the inbound JSON body and forward it.
    pub body_required: bool,
    /// Copy the inbound `cookie` header to the upstream request.
    pub cookie_in: bool,
    /// Copy upstream `set-cookie` headers to the client response.
    pub cookie_out: bool,
    /// Availability probe; relay failures become 503 instead of 500.
    pub probe: bool,
}

/// An immutable `{method, public path} → {upstream path, policy}` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub upstream_path: String,
    pub policy: ForwardPolicy,
}

impl ProxyRoute {
    /// Whether the upstream request is sent with `content-type: application/json`.
    ///
    /// The upstream expects it on every POST, including bodiless ones like logout.
    pub fn sends_json(&self) -> bool {
        self.policy.body_required || self.method == Method::POST
    }
}

impl TryFrom<&RouteConfig> for ProxyRoute {
    type Error = ValidationError;

    fn try_from(config: &RouteConfig) -> Result<Self, Self::Error> {
        let method = Method::from_bytes(config.method.to_ascii_uppercase().as_bytes()).map_err(
            |_| ValidationError::Method {
                route: config.name.clone(),
                method: config.method.clone(),
            },
        )?;

        Ok(Self {
            name: config.name.clone(),
            method,
            path: config.path.clone(),
            upstream_path: config.upstream_path.clone(),
            policy: ForwardPolicy {
                body_required: config.body_required,
                cookie_in: config.cookie_in,
                cookie_out: config.cookie_out,
                probe: config.probe,
            },
        })
    }
}
