//! Relay failure taxonomy and its client-visible shape.
//!
//! Upstream application errors (reachable upstream, non-2xx JSON body) are
//! not represented here: they are relayed like any other response.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::ForwardPolicy;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";
pub const UNAVAILABLE_DETAIL: &str = "Backend unavailable";
pub const TOO_LARGE_DETAIL: &str = "Request body too large";

/// Errors raised while relaying one request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("inbound body is not valid JSON: {0}")]
    InvalidRequestBody(#[source] serde_json::Error),

    #[error("failed to read inbound body: {0}")]
    InboundBody(#[source] axum::Error),

    #[error("inbound body exceeds {0} bytes")]
    InboundTooLarge(usize),

    #[error("failed to build upstream request: {0}")]
    UpstreamRequest(#[source] axum::http::Error),

    #[error("upstream unreachable: {0}")]
    UpstreamUnavailable(#[source] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("failed to read upstream body: {0}")]
    UpstreamBody(#[source] axum::Error),

    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(#[source] serde_json::Error),
}

impl RelayError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidRequestBody(_) | RelayError::InboundBody(_) => "invalid_body",
            RelayError::InboundTooLarge(_) => "too_large",
            RelayError::UpstreamRequest(_) => "internal",
            RelayError::UpstreamUnavailable(_) | RelayError::UpstreamBody(_) => "unavailable",
            RelayError::UpstreamTimeout(_) => "timeout",
            RelayError::MalformedUpstreamResponse(_) => "malformed",
        }
    }

    /// True when the failure is the client's, not the relay's or upstream's.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidRequestBody(_)
                | RelayError::InboundBody(_)
                | RelayError::InboundTooLarge(_)
        )
    }

    /// The generic failure the client sees for this error on a given route.
    ///
    /// Probe routes report these failures as 503 so that an unavailable
    /// upstream is distinguishable from a relay fault. Unreadable or
    /// non-JSON inbound bodies fail the same way an upstream fault does.
    pub fn failure(&self, policy: &ForwardPolicy) -> RelayFailure {
        match self {
            RelayError::InboundTooLarge(_) => RelayFailure {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                detail: TOO_LARGE_DETAIL,
            },
            RelayError::UpstreamRequest(_) => RelayFailure::internal(),
            RelayError::InvalidRequestBody(_)
            | RelayError::InboundBody(_)
            | RelayError::UpstreamUnavailable(_)
            | RelayError::UpstreamTimeout(_)
            | RelayError::UpstreamBody(_)
            | RelayError::MalformedUpstreamResponse(_) => {
                if policy.probe {
                    RelayFailure {
                        status: StatusCode::SERVICE_UNAVAILABLE,
                        detail: UNAVAILABLE_DETAIL,
                    }
                } else {
                    RelayFailure::internal()
                }
            }
        }
    }
}

/// JSON body of every relay-generated error: `{ "detail": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// A normalized, client-safe failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayFailure {
    pub status: StatusCode,
    pub detail: &'static str,
}

impl RelayFailure {
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: INTERNAL_ERROR_DETAIL,
        }
    }
}

impl IntoResponse for RelayFailure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed() -> RelayError {
        RelayError::MalformedUpstreamResponse(
            serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
        )
    }

    #[test]
    fn upstream_failures_are_500_on_regular_routes() {
        let policy = ForwardPolicy::default();
        assert_eq!(malformed().failure(&policy), RelayFailure::internal());
        assert_eq!(
            RelayError::UpstreamTimeout(Duration::from_secs(1))
                .failure(&policy)
                .status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_failures_are_503_on_probe_routes() {
        let policy = ForwardPolicy {
            probe: true,
            ..ForwardPolicy::default()
        };
        let failure = malformed().failure(&policy);
        assert_eq!(failure.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(failure.detail, UNAVAILABLE_DETAIL);
    }

    #[test]
    fn invalid_inbound_body_fails_like_a_relay_fault() {
        let err = RelayError::InvalidRequestBody(
            serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err(),
        );
        assert!(err.is_client_error());
        assert_eq!(err.kind(), "invalid_body");
        assert_eq!(err.failure(&ForwardPolicy::default()), RelayFailure::internal());

        let probe = ForwardPolicy {
            probe: true,
            ..ForwardPolicy::default()
        };
        assert_eq!(err.failure(&probe).status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn oversized_inbound_body_is_413() {
        let failure = RelayError::InboundTooLarge(16).failure(&ForwardPolicy::default());
        assert_eq!(failure.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(failure.detail, TOO_LARGE_DETAIL);
    }

    #[test]
    fn failure_detail_never_carries_error_text() {
        let err = malformed();
        let failure = err.failure(&ForwardPolicy::default());
        assert!(!failure.detail.contains("html"));
        assert!(!failure.detail.is_empty());
    }
}
