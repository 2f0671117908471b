//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. Every error is
//! collected so a broken config file can be fixed in one pass.

use std::collections::HashSet;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ProxyConfig, RouteConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url {url:?} is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("route table is empty")]
    NoRoutes,

    #[error("route {route:?}: unsupported method {method:?}")]
    Method { route: String, method: String },

    #[error("route {route:?}: {field} {path:?} must start with '/' and contain no wildcards")]
    Path {
        route: String,
        field: &'static str,
        path: String,
    },

    #[error("route {route:?}: {method} routes cannot require a body")]
    BodyOnBodylessMethod { route: String, method: String },

    #[error("duplicate route name {0:?}")]
    DuplicateName(String),

    #[error("duplicate route {method} {path}")]
    DuplicateRoute { method: String, path: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(reason) = check_base_url(&config.upstream.base_url) {
        errors.push(ValidationError::BaseUrl {
            url: config.upstream.base_url.clone(),
            reason,
        });
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut names = HashSet::new();
    let mut endpoints = HashSet::new();
    for route in &config.routes {
        validate_route(route, &mut errors);

        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }
        let method = route.method.to_ascii_uppercase();
        if !endpoints.insert((method.clone(), route.path.as_str())) {
            errors.push(ValidationError::DuplicateRoute {
                method,
                path: route.path.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    let method = Method::from_bytes(route.method.to_ascii_uppercase().as_bytes()).ok();
    match method {
        Some(m) if ALLOWED_METHODS.contains(&m) => {
            if route.body_required && !(m == Method::POST || m == Method::PUT || m == Method::PATCH) {
                errors.push(ValidationError::BodyOnBodylessMethod {
                    route: route.name.clone(),
                    method: m.to_string(),
                });
            }
        }
        _ => errors.push(ValidationError::Method {
            route: route.name.clone(),
            method: route.method.clone(),
        }),
    }

    for (field, path) in [("path", &route.path), ("upstream_path", &route.upstream_path)] {
        if !is_literal_path(path) {
            errors.push(ValidationError::Path {
                route: route.name.clone(),
                field,
                path: path.clone(),
            });
        }
    }
}

/// Public and upstream paths are literal: no axum captures, no query strings.
fn is_literal_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains(['{', '}', '*', '?', '#', ' '])
        && !path.split('/').any(|segment| segment.starts_with(':'))
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("scheme {:?} is not supported, use http", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}
