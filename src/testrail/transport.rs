//! TestRail HTTP Transport
//!
//! Performs authenticated requests against the TestRail REST API and reduces
//! every failure to a [`TestRailError`].
//!
//! # Request shape
//!
//! All endpoints are routed through `{base}/index.php?/api/v2/{endpoint}`.
//! Callers pass the endpoint with any filters already appended (see
//! [`Query::apply`](super::query::Query::apply)).
//!
//! # Diagnostics
//!
//! Terminal failures are logged with the method, endpoint path (filters
//! stripped), status, status text and error message. Credentials, headers,
//! request bodies and response bodies never reach a log macro.

use super::error::TestRailError;
use super::retry::{retry_with_backoff, RetryConfig};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Multipart field name TestRail expects for attachments
const ATTACHMENT_FIELD: &str = "attachment";

/// The seam between TestRail operations and the network
///
/// Every method returns the decoded JSON body of a 2xx response, or a
/// classified error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &str) -> Result<Value, TestRailError>;

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, TestRailError>;

    /// Upload a local file as a multipart body.
    ///
    /// The file is read before any request is made; a read failure is
    /// reported as a local error and never retried.
    async fn upload(&self, endpoint: &str, file_path: &Path) -> Result<Value, TestRailError>;
}

/// Username and API key attached to every request
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Immutable transport settings, fixed at construction
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Request body variants
enum Body {
    Empty,
    Json(Value),
    File { name: String, bytes: Vec<u8> },
}

/// reqwest-backed [`Transport`]
///
/// The inner client pools connections and is safe to share between
/// concurrent calls.
pub struct HttpTransport {
    client: reqwest::Client,
    api_root: String,
    credentials: Credentials,
    retry: RetryConfig,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_root", &self.api_root)
            .field("credentials", &self.credentials)
            .field("retry", &self.retry)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TestRailError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TestRailError::local(format!("failed to build HTTP client: {}", e)))?;

        let base = config.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            api_root: format!("{}/index.php?/api/v2/", base),
            credentials: config.credentials,
            retry: config.retry,
        })
    }

    /// Full URL for an endpoint (filters included)
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_root, endpoint.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, endpoint: &str, body: Body) -> Result<Value, TestRailError> {
        let path = log_path(endpoint);

        let result = retry_with_backoff(&self.retry, path, || self.send_once(&method, endpoint, &body)).await;

        if let Err(e) = &result {
            let status_text = e
                .status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .and_then(|s| s.canonical_reason());
            tracing::error!(
                method = %method,
                path,
                status = ?e.status,
                status_text = ?status_text,
                kind = %e.kind,
                message = %e.message,
                "TestRail request failed"
            );
        }

        result
    }

    async fn send_once(&self, method: &Method, endpoint: &str, body: &Body) -> Result<Value, TestRailError> {
        let mut request = self
            .client
            .request(method.clone(), self.url(endpoint))
            .basic_auth(&self.credentials.username, Some(&self.credentials.api_key));

        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(value),
            Body::File { name, bytes } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone()).file_name(name.clone());
                request.multipart(reqwest::multipart::Form::new().part(ATTACHMENT_FIELD, part))
            }
        };

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();

        if status.is_success() {
            // The request was applied; a broken body must not trigger a resend.
            let bytes = response.bytes().await.map_err(|e| {
                TestRailError::bad_shape(format!("failed to read response body: {}", e.without_url()))
            })?;
            serde_json::from_slice(&bytes)
                .map_err(|e| TestRailError::bad_shape(format!("response body is not valid JSON: {}", e)))
        } else {
            // TestRail explains most failures in a top-level `error` field.
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
            Err(TestRailError::from_status(status.as_u16()).with_detail(detail))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &str) -> Result<Value, TestRailError> {
        tracing::debug!(path = log_path(endpoint), "GET");
        self.request(Method::GET, endpoint, Body::Empty).await
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value, TestRailError> {
        tracing::debug!(path = log_path(endpoint), "POST");
        self.request(Method::POST, endpoint, Body::Json(body)).await
    }

    async fn upload(&self, endpoint: &str, file_path: &Path) -> Result<Value, TestRailError> {
        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            TestRailError::local(format!("cannot read {}: {}", file_path.display(), e))
        })?;
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ATTACHMENT_FIELD.to_string());

        tracing::debug!(path = log_path(endpoint), size = bytes.len(), "POST multipart");
        self.request(Method::POST, endpoint, Body::File { name, bytes }).await
    }
}

/// Endpoint path without its filters
fn log_path(endpoint: &str) -> &str {
    endpoint.split('&').next().unwrap_or(endpoint)
}

fn network_error(e: reqwest::Error) -> TestRailError {
    if e.is_timeout() {
        return TestRailError::network("request timed out");
    }
    TestRailError::network(e.without_url().to_string())
}
