//! TestRail Error Taxonomy
//!
//! Every failure that leaves the transport layer is reduced to a
//! [`TestRailError`] carrying one [`ErrorKind`] from a closed set. The kind is
//! decided once, where the call terminates, and is never re-wrapped by the
//! layers above.
//!
//! # Classification
//!
//! | Observation                        | Kind           |
//! |------------------------------------|----------------|
//! | HTTP 401 / 403                     | `auth`         |
//! | HTTP 404                           | `not_found`    |
//! | HTTP 429                           | `rate_limited` |
//! | HTTP 500-599                       | `server`       |
//! | HTTP 400 / 422                     | `validation_error` |
//! | no response (connect, timeout)     | `network`      |
//! | 2xx with a body of the wrong shape | `server`       |
//! | anything else                      | `unknown`      |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure kinds surfaced to tool handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    NotFound,
    RateLimited,
    Server,
    Network,
    ValidationError,
    PermissionDenied,
    Unknown,
}

impl ErrorKind {
    /// Wire name of the kind (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Network => "network",
            Self::ValidationError => "validation_error",
            Self::PermissionDenied => "permission_denied",
            Self::Unknown => "unknown",
        }
    }

    /// Map an HTTP status code to a kind.
    ///
    /// Explicit mappings win over the `unknown` fallback.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400 | 422 => Self::ValidationError,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified TestRail failure
///
/// `status` and `message` are best-effort diagnostics. They never carry
/// credentials, headers, or request/response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TestRailError {
    pub kind: ErrorKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    pub message: String,
}

impl TestRailError {
    pub fn new(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Classify a terminal, non-2xx HTTP response
    pub fn from_status(status: u16) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = match kind {
            ErrorKind::Auth => "Unauthorized".to_string(),
            ErrorKind::NotFound => "Not found".to_string(),
            ErrorKind::RateLimited => "Rate limited".to_string(),
            ErrorKind::Server => "Server error".to_string(),
            _ => format!("HTTP {}", status),
        };
        Self::new(kind, Some(status), message)
    }

    /// Attach the upstream `error` text (TestRail explains 400s this way)
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        if let Some(detail) = detail.filter(|d| !d.trim().is_empty()) {
            self.message = detail;
        }
        self
    }

    /// No response was received at all
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, None, message)
    }

    /// A 2xx response whose body could not be used.
    ///
    /// Reported as `server`: the remote produced a result the caller cannot act on.
    pub fn bad_shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, Some(200), message)
    }

    /// Local failure before anything was sent
    pub fn local(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, None, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether another attempt could succeed: no response, 429, or 5xx.
    ///
    /// Body-shape failures carry status 200 and so are never retried.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            None => self.kind == ErrorKind::Network,
            Some(status) => super::retry::should_retry_status(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_explicit_status_mapping() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(599), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(400), ErrorKind::ValidationError);
    }

    #[test]
    fn test_fallback_is_unknown() {
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_status(302), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_status(600), ErrorKind::Unknown);
    }

    #[test]
    fn test_network_has_no_status() {
        let err = TestRailError::network("connection refused");
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.status.is_none());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_bad_shape_is_server_but_not_retryable() {
        let err = TestRailError::bad_shape("cases is not an array");
        assert_eq!(err.kind, ErrorKind::Server);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_local_failure_not_retryable() {
        assert!(!TestRailError::local("file missing").is_retryable());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(ErrorKind::RateLimited).unwrap();
        assert_eq!(json, "rate_limited");
        let json = serde_json::to_value(ErrorKind::ValidationError).unwrap();
        assert_eq!(json, "validation_error");
    }

    #[test]
    fn test_with_detail_ignores_blank() {
        let err = TestRailError::from_status(400).with_detail(Some("  ".into()));
        assert_eq!(err.message, "HTTP 400");
        let err = TestRailError::from_status(400)
            .with_detail(Some("Field :title is a required field.".into()));
        assert_eq!(err.message, "Field :title is a required field.");
    }

    proptest! {
        #[test]
        fn prop_5xx_is_server_and_retryable(status in 500u16..600) {
            let err = TestRailError::from_status(status);
            prop_assert_eq!(err.kind, ErrorKind::Server);
            prop_assert!(err.is_retryable());
        }

        #[test]
        fn prop_other_4xx_not_retryable(status in 400u16..500) {
            prop_assume!(status != 429);
            prop_assert!(!TestRailError::from_status(status).is_retryable());
        }
    }
}
