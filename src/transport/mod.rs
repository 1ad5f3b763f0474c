//! HTTP transport abstraction for completion requests
//!
//! The completion client never talks to `reqwest` directly. It builds an
//! [`HttpRequest`], hands it to a [`Transport`], and classifies whatever
//! comes back. Concrete implementations live in submodules:
//!
//! - [`http::ReqwestTransport`] -- production transport backed by a pooled
//!   `reqwest::Client`.
//! - [`fake::FakeTransport`] -- scripted in-process fake used in tests
//!   (cfg(test) only).
//!
//! A transport performs exactly one attempt per call. Retries, if any, are
//! the caller's decision.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Header names whose values are replaced with `<redacted>` in `Debug` output.
const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key"];

/// A single outbound POST request
///
/// The body is already-serialized JSON. The timeout applies to the whole
/// exchange (connect, send, and reading the response body).
#[derive(Clone)]
pub struct HttpRequest {
    /// Absolute endpoint URL
    pub url: String,
    /// Header name/value pairs, sent in order
    pub headers: Vec<(String, String)>,
    /// Serialized request body
    pub body: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use chatrelay::transport::HttpRequest;
    ///
    /// let request = HttpRequest {
    ///     url: "http://localhost/v1/chat/completions".to_string(),
    ///     headers: vec![("Content-Type".to_string(), "application/json".to_string())],
    ///     body: "{}".to_string(),
    ///     timeout: Duration::from_secs(30),
    /// };
    /// assert_eq!(request.header("content-type"), Some("application/json"));
    /// assert_eq!(request.header("authorization"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                let lowered = key.to_ascii_lowercase();
                if REDACTED_HEADERS.contains(&lowered.as_str()) {
                    (key.as_str(), "<redacted>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Raw response as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response from a status code and body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure (no HTTP status was obtained)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// Any other connection or I/O failure
    #[error("{0}")]
    Network(String),
}

/// Abstraction over the HTTP client used for completion requests
///
/// Implementations must be usable from multiple sessions at once, hence the
/// `Send + Sync` bound; each call is independent.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `request` as an HTTP POST and return the status and body
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] when the timeout elapses and
    /// [`TransportError::Network`] for every other failure to obtain a
    /// response. Non-2xx statuses are *not* errors at this layer.
    async fn post(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::ReqwestTransport;
