//! Scripted TestRail stand-in for integration tests.
//!
//! Serves `/index.php` on a random local port, replays queued responses in
//! order and records every request it sees.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use testrail_mcp::testrail::retry::RetryConfig;
use testrail_mcp::testrail::{Credentials, HttpTransport, TestRailService, TransportConfig};

pub const USERNAME: &str = "qa@example.com";
pub const API_KEY: &str = "secret-key";
/// `Basic` credentials for USERNAME:API_KEY
pub const AUTHORIZATION: &str = "Basic cWFAZXhhbXBsZS5jb206c2VjcmV0LWtleQ==";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Everything after `?`, e.g. `/api/v2/get_case/1`
    pub query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone, Default)]
struct Script {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockTestRail {
    pub addr: SocketAddr,
    script: Script,
}

impl MockTestRail {
    pub async fn start() -> Self {
        let script = Script::default();
        let app = Router::new()
            .route("/index.php", any(handle))
            .with_state(script.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, script }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue one response; bodies are sent verbatim
    pub fn push(&self, status: u16, body: impl Into<String>) -> &Self {
        self.script
            .responses
            .lock()
            .unwrap()
            .push_back((status, body.into()));
        self
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.push(status, body.to_string())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.script.requests.lock().unwrap().clone()
    }

    /// Service with millisecond retry delays
    pub fn service(&self) -> TestRailService<HttpTransport> {
        service_for(&self.base_url())
    }
}

/// Service pointed at `base_url` with millisecond retry delays
pub fn service_for(base_url: &str) -> TestRailService<HttpTransport> {
    let config = TransportConfig::new(
        base_url,
        Credentials {
            username: USERNAME.to_string(),
            api_key: API_KEY.to_string(),
        },
    )
    .with_timeout(Duration::from_secs(5))
    .with_retry(fast_retry());

    TestRailService::new(HttpTransport::new(config).unwrap())
}

pub fn fast_retry() -> RetryConfig {
    RetryConfig::default()
        .base_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(5))
}

async fn handle(
    State(script): State<Script>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    script.requests.lock().unwrap().push(Recorded {
        method,
        query: uri.query().unwrap_or_default().to_string(),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let next = script.responses.lock().unwrap().pop_front();
    let (status, body) = next.unwrap_or((500, r#"{"error":"no scripted response"}"#.to_string()));
    let status = StatusCode::from_u16(status).unwrap();

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
