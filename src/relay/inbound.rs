//! Extraction of the parts of a client request the relay forwards.

use std::future::poll_fn;
use std::pin::Pin;

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_LENGTH, COOKIE},
        HeaderMap, HeaderValue, Request,
    },
};
use hyper::body::Body as _;
use serde::de::IgnoredAny;

use crate::relay::error::RelayError;
use crate::routing::ProxyRoute;

/// What one relay invocation carries upstream. Owned by that invocation.
#[derive(Debug)]
pub struct InboundRequest {
    /// Session cookie to forward, present only on cookie-in routes.
    pub cookie: Option<HeaderValue>,
    /// JSON body, present only on body routes. Verbatim client bytes.
    pub body: Option<Bytes>,
}

impl InboundRequest {
    /// Take what `route` forwards out of `request`.
    ///
    /// Bodies are checked to be syntactically JSON and otherwise untouched.
    pub async fn extract(
        request: Request<Body>,
        route: &ProxyRoute,
        max_body_bytes: usize,
    ) -> Result<Self, RelayError> {
        let (parts, body) = request.into_parts();

        let cookie = if route.policy.cookie_in {
            cookie_header(&parts.headers)
        } else {
            None
        };

        let body = if route.policy.body_required {
            if declared_length(&parts.headers).is_some_and(|len| len > max_body_bytes) {
                return Err(RelayError::InboundTooLarge(max_body_bytes));
            }
            let bytes = read_limited(body, max_body_bytes).await?;
            serde_json::from_slice::<IgnoredAny>(&bytes).map_err(RelayError::InvalidRequestBody)?;
            Some(bytes)
        } else {
            None
        };

        Ok(Self { cookie, body })
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Buffer `body`, failing as soon as it grows past `limit` bytes.
///
/// Chunked bodies carry no length up front, so the count is kept per frame.
async fn read_limited(mut body: Body, limit: usize) -> Result<Bytes, RelayError> {
    let mut buf = Vec::new();
    while let Some(frame) = poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await {
        let frame = frame.map_err(RelayError::InboundBody)?;
        if let Ok(data) = frame.into_data() {
            if buf.len() + data.len() > limit {
                return Err(RelayError::InboundTooLarge(limit));
            }
            buf.extend_from_slice(&data);
        }
    }
    Ok(Bytes::from(buf))
}

/// The inbound cookie as a single header value.
///
/// HTTP/1.1 clients send one `cookie` header, which is copied as-is. HTTP/2
/// clients may split it across several; those are rejoined with `"; "`.
fn cookie_header(headers: &HeaderMap) -> Option<HeaderValue> {
    let mut values = headers.get_all(COOKIE).iter();
    let first = values.next()?;
    let rest: Vec<&HeaderValue> = values.collect();
    if rest.is_empty() {
        return Some(first.clone());
    }

    let mut joined = first.as_bytes().to_vec();
    for value in rest {
        joined.extend_from_slice(b"; ");
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok()
}
