//! The single parameterized relay operation every route is served by.

use std::time::Instant;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::observability::metrics;
use crate::relay::inbound::InboundRequest;
use crate::relay::upstream::UpstreamClient;
use crate::routing::ProxyRoute;

/// Forward `request` along `route` and build the client response.
///
/// Never fails: every error becomes a `{ "detail": ... }` response.
pub async fn relay(upstream: &UpstreamClient, route: &ProxyRoute, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).to_string();

    tracing::debug!(
        request_id = %request_id,
        route = %route.name,
        method = %route.method,
        upstream_path = %route.upstream_path,
        "Relaying request"
    );

    let result = match InboundRequest::extract(request, route, upstream.max_body_bytes()).await {
        Ok(inbound) => upstream.send(route, inbound).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            let status = response.status.as_u16();
            tracing::info!(
                request_id = %request_id,
                route = %route.name,
                status,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Relayed"
            );
            metrics::record_request(&route.name, status, start);
            response.into_client_response(&route.policy)
        }
        Err(err) => {
            let failure = err.failure(&route.policy);
            if err.is_client_error() {
                tracing::warn!(
                    request_id = %request_id,
                    route = %route.name,
                    error = %err,
                    "Rejected inbound request"
                );
            } else {
                tracing::error!(
                    request_id = %request_id,
                    route = %route.name,
                    kind = err.kind(),
                    error = %err,
                    "Relay failed"
                );
            }
            metrics::record_failure(&route.name, err.kind());
            metrics::record_request(&route.name, failure.status.as_u16(), start);
            failure.into_response()
        }
    }
}
