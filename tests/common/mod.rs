//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::Response,
    Router,
};
use session_relay::{HttpServer, ProxyConfig, Shutdown};
use tokio::net::TcpListener;

/// A request as the upstream received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A scripted upstream response.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub set_cookies: Vec<&'static str>,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            set_cookies: Vec::new(),
            delay: None,
        }
    }

    pub fn with_set_cookie(mut self, cookie: &'static str) -> Self {
        self.set_cookies.push(cookie);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Upstream stand-in that records every request and answers from a script.
#[derive(Clone, Default)]
pub struct MockUpstream {
    recorded: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<String, Canned>>>,
}

impl MockUpstream {
    /// Start a mock upstream on an ephemeral port.
    pub async fn start() -> (Self, SocketAddr) {
        let mock = Self::default();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().fallback(record).with_state(mock.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (mock, addr)
    }

    /// Script the response for an upstream path. Unscripted paths answer
    /// 200 `{"ok":true}`.
    pub fn respond(&self, path: &str, canned: Canned) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), canned);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests()
            .pop()
            .expect("upstream received no request")
    }
}

async fn record(State(mock): State<MockUpstream>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let path = parts.uri.path().to_string();

    mock.recorded.lock().unwrap().push(Recorded {
        method: parts.method,
        path: path.clone(),
        headers: parts.headers,
        body,
    });

    let canned = mock
        .responses
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Canned::json(200, r#"{"ok":true}"#));

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = Response::new(Body::from(canned.body));
    *response.status_mut() = StatusCode::from_u16(canned.status).unwrap();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for cookie in canned.set_cookies {
        headers.append(header::SET_COOKIE, HeaderValue::from_static(cookie));
    }
    response
}

/// A running relay. Shuts down when dropped.
pub struct Relay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Relay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config pointing at `upstream`, listening on an ephemeral port.
pub fn config_for(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = format!("http://{}", upstream);
    config
}

pub async fn start_relay(upstream: SocketAddr) -> Relay {
    start_relay_with(config_for(upstream)).await
}

pub async fn start_relay_with(config: ProxyConfig) -> Relay {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let wait = shutdown.wait();
    tokio::spawn(async move {
        let _ = server.run(listener, wait).await;
    });

    Relay { addr, shutdown }
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
