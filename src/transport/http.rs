//! `reqwest`-backed transport
//!
//! [`ReqwestTransport`] wraps a single pooled `reqwest::Client`. The client is
//! cheap to share, so one transport can serve every session in a process.

use std::sync::Arc;

use reqwest::Client;

use crate::error::{ChatRelayError, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// User agent sent with every request
const USER_AGENT: &str = concat!("chatrelay/", env!("CARGO_PKG_VERSION"));

/// Production transport using `reqwest`
///
/// # Examples
///
/// ```
/// use chatrelay::transport::ReqwestTransport;
///
/// let transport = ReqwestTransport::new();
/// assert!(transport.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Arc<Client>,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool
    ///
    /// The timeout is applied per request from [`HttpRequest::timeout`], not
    /// on the client, so one transport can serve endpoints with different
    /// limits.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ChatRelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized reqwest transport");

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Wrap an existing `reqwest::Client` (custom proxies, TLS roots, ...)
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Map a `reqwest` error onto the two transport outcomes
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let HttpRequest {
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.client.post(&url).timeout(timeout).body(body);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("POST {} failed: {}", url, e);
            classify(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read response body from {}: {}", url, e);
            classify(e)
        })?;

        tracing::debug!(status, body_len = body.len(), "Received response from {}", url);

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_user_agent_includes_version() {
        assert!(USER_AGENT.starts_with("chatrelay/"));
        assert!(USER_AGENT.len() > "chatrelay/".len());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new().unwrap();
        // Port 9 on localhost is the discard service and is closed on CI hosts.
        let result = transport
            .post(HttpRequest {
                url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
                headers: Vec::new(),
                body: "{}".to_string(),
                timeout: Duration::from_secs(5),
            })
            .await;

        assert!(matches!(
            result,
            Err(TransportError::Network(_)) | Err(TransportError::Timeout)
        ));
    }
}
