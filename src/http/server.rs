//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router from the route table
//! - Wire up middleware (request ID, tracing)
//! - Answer unknown paths and methods with the `{ "detail" }` shape
//! - Bind server to listener with graceful shutdown

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::ALLOW, HeaderValue, Method, Request, StatusCode},
    response::IntoResponse,
    routing::{MethodFilter, MethodRouter},
    Json, Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ConfigError, ProxyConfig};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::relay::{relay, ErrorBody, UpstreamClient};
use crate::routing::{ProxyRoute, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid route: {0}")]
    Route(#[from] ValidationError),

    #[error("route {route:?}: method {method} cannot be mounted")]
    Method { route: String, method: Method },
}

/// HTTP server for the session relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The configuration is validated first, so a route table axum would
    /// refuse to mount is an error here rather than a panic.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let table = RouteTable::from_config(&config.routes)?;
        let state = AppState {
            upstream: Arc::new(UpstreamClient::new(&config)),
        };

        tracing::info!(
            upstream = %state.upstream.base_url(),
            routes = config.routes.len(),
            "Route table compiled"
        );

        let router = Self::build_router(&table, state)?;
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(table: &RouteTable, state: AppState) -> Result<Router, ServerError> {
        let mut router = Router::new();

        for (path, routes) in table.by_path() {
            let allow = allow_header(&routes);
            let mut method_router = MethodRouter::<AppState>::new()
                .fallback(move || async move { method_not_allowed(allow) });

            for route in routes {
                let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| {
                    ServerError::Method {
                        route: route.name.clone(),
                        method: route.method.clone(),
                    }
                })?;
                tracing::debug!(
                    route = %route.name,
                    method = %route.method,
                    path = %route.path,
                    upstream_path = %route.upstream_path,
                    "Mounting route"
                );

                method_router = method_router.on(
                    filter,
                    move |State(state): State<AppState>, request: Request<Body>| {
                        let route = Arc::clone(&route);
                        async move { relay(&state.upstream, &route, request).await }
                    },
                );
            }

            router = router.route(path, method_router);
        }

        Ok(router
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            ))
    }

    /// Run the server until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: "Not Found".to_string(),
        }),
    )
}

fn method_not_allowed(allow: HeaderValue) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, allow)],
        Json(ErrorBody {
            detail: "Method Not Allowed".to_string(),
        }),
    )
}

/// `Allow` value listing the methods mounted on one path.
fn allow_header(routes: &[Arc<ProxyRoute>]) -> HeaderValue {
    let methods: Vec<&str> = routes.iter().map(|r| r.method.as_str()).collect();
    HeaderValue::from_str(&methods.join(", ")).unwrap_or_else(|_| HeaderValue::from_static(""))
}
