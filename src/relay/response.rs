//! Outbound response construction.

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderValue, StatusCode,
    },
    response::Response,
};

use crate::routing::ForwardPolicy;

/// A completed upstream exchange whose body is known to be JSON.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub set_cookies: Vec<HeaderValue>,
}

impl UpstreamResponse {
    /// Build the client response: upstream status and body as-is, plus
    /// `set-cookie` values when the route forwards them out.
    pub fn into_client_response(self, policy: &ForwardPolicy) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if policy.cookie_out {
            for cookie in self.set_cookies {
                headers.append(SET_COOKIE, cookie);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: StatusCode) -> UpstreamResponse {
        UpstreamResponse {
            status,
            body: Bytes::from_static(br#"{"message":"ok"}"#),
            set_cookies: vec![
                HeaderValue::from_static("access_token=xyz; HttpOnly; Path=/"),
                HeaderValue::from_static("csrf=1; Path=/"),
            ],
        }
    }

    #[test]
    fn forwards_every_set_cookie_when_allowed() {
        let policy = ForwardPolicy {
            cookie_out: true,
            ..ForwardPolicy::default()
        };
        let response = upstream(StatusCode::UNAUTHORIZED).into_client_response(&policy);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "access_token=xyz; HttpOnly; Path=/");
    }

    #[test]
    fn drops_set_cookie_when_not_allowed() {
        let response =
            upstream(StatusCode::CREATED).into_client_response(&ForwardPolicy::default());
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
