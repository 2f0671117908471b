//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstream origin used when neither the config file nor `BACKEND_URL` sets one.
pub const DEFAULT_BACKEND_URL: &str = "http://backend.99-apps.svc.cluster.local:8000";

/// Root configuration for the session relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API the relay forwards to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table. A `[[routes]]` array in the config file replaces the
    /// built-in table entirely.
    pub routes: Vec<RouteConfig>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: default_routes(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API. Route upstream paths are appended to it.
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for one upstream exchange in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound request body and upstream response body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One public endpoint and how it is forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// HTTP method, e.g. "GET".
    pub method: String,

    /// Public path served by the relay.
    pub path: String,

    /// Path on the upstream, appended to `upstream.base_url`.
    pub upstream_path: String,

    /// The inbound JSON body is read and forwarded.
    #[serde(default)]
    pub body_required: bool,

    /// The inbound `cookie` header is forwarded upstream.
    #[serde(default)]
    pub cookie_in: bool,

    /// Upstream `set-cookie` headers are forwarded to the client.
    #[serde(default)]
    pub cookie_out: bool,

    /// Availability probe: relay failures surface as 503.
    #[serde(default)]
    pub probe: bool,
}

impl RouteConfig {
    fn new(name: &str, method: &str, path: &str, upstream_path: &str) -> Self {
        Self {
            name: name.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            upstream_path: upstream_path.to_string(),
            body_required: false,
            cookie_in: false,
            cookie_out: false,
            probe: false,
        }
    }

    fn with_body(mut self) -> Self {
        self.body_required = true;
        self
    }

    fn with_cookie_in(mut self) -> Self {
        self.cookie_in = true;
        self
    }

    fn with_cookie_out(mut self) -> Self {
        self.cookie_out = true;
        self
    }

    fn as_probe(mut self) -> Self {
        self.probe = true;
        self
    }
}

/// The built-in route table.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("auth_login", "POST", "/auth/login", "/api/v1/auth/login")
            .with_body()
            .with_cookie_out(),
        RouteConfig::new("auth_logout", "POST", "/auth/logout", "/api/v1/auth/logout")
            .with_cookie_in()
            .with_cookie_out(),
        RouteConfig::new("auth_me", "GET", "/auth/me", "/api/v1/auth/me").with_cookie_in(),
        RouteConfig::new("auth_register", "POST", "/auth/register", "/api/v1/auth/register")
            .with_body(),
        RouteConfig::new("github_user", "GET", "/github/user", "/api/v1/github/user")
            .with_cookie_in(),
        RouteConfig::new("github_repos", "GET", "/github/repos", "/api/v1/github/repos")
            .with_cookie_in(),
        RouteConfig::new(
            "github_configure",
            "POST",
            "/github/configure",
            "/api/v1/github/configure",
        )
        .with_body()
        .with_cookie_in(),
        RouteConfig::new("health_ready", "GET", "/health/ready", "/api/v1/health/ready")
            .as_probe(),
        RouteConfig::new("health_live", "GET", "/health", "/api/v1/health").as_probe(),
    ]
}
