//! Upstream HTTP client.
//!
//! One instance is built at startup and shared read-only by every relay
//! invocation. The hyper-util connection pool is its only internal state.

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        HeaderValue, Request,
    },
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::de::IgnoredAny;

use crate::config::ProxyConfig;
use crate::relay::error::RelayError;
use crate::relay::inbound::InboundRequest;
use crate::relay::response::UpstreamResponse;
use crate::routing::ProxyRoute;

pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    base_url: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeouts.upstream_secs),
            max_body_bytes: config.limits.max_body_bytes,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Full upstream URL for a route.
    pub fn upstream_url(&self, route: &ProxyRoute) -> String {
        format!("{}{}", self.base_url, route.upstream_path)
    }

    /// Issue the upstream call for `route` and read back a JSON response.
    ///
    /// Only `content-type` and the forwarded cookie are sent as headers.
    pub async fn send(
        &self,
        route: &ProxyRoute,
        inbound: InboundRequest,
    ) -> Result<UpstreamResponse, RelayError> {
        let mut builder = Request::builder()
            .method(route.method.clone())
            .uri(self.upstream_url(route));

        if route.sends_json() {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(cookie) = inbound.cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let body = inbound.body.map(Body::from).unwrap_or_else(Body::empty);
        let request = builder.body(body).map_err(RelayError::UpstreamRequest)?;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(RelayError::UpstreamUnavailable)?;
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
                .await
                .map_err(RelayError::UpstreamBody)?;
            Ok::<_, RelayError>((parts, bytes))
        };

        let (parts, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| RelayError::UpstreamTimeout(self.timeout))??;

        serde_json::from_slice::<IgnoredAny>(&bytes)
            .map_err(RelayError::MalformedUpstreamResponse)?;

        Ok(UpstreamResponse {
            status: parts.status,
            body: bytes,
            set_cookies: parts.headers.get_all(SET_COOKIE).iter().cloned().collect(),
        })
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_routes;
    use crate::routing::RouteTable;
    use axum::http::Method;

    #[test]
    fn joins_base_url_and_upstream_path() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://backend:8000/".into();
        let client = UpstreamClient::new(&config);

        let table = RouteTable::from_config(&default_routes()).unwrap();
        let me = table.find(&Method::GET, "/auth/me").unwrap();
        assert_eq!(client.upstream_url(me), "http://backend:8000/api/v1/auth/me");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://gateway/backend".into();
        let client = UpstreamClient::new(&config);

        let table = RouteTable::from_config(&default_routes()).unwrap();
        let ready = table.find(&Method::GET, "/health/ready").unwrap();
        assert_eq!(
            client.upstream_url(ready),
            "http://gateway/backend/api/v1/health/ready"
        );
    }
}
