//! Scripted in-process transport for unit tests
//!
//! [`FakeTransport`] replays a queue of canned outcomes and records every
//! request it receives, so tests can assert both on what the client sent and
//! on how many times it called out.
//!
//! ```text
//! client post() --> recorded requests (test inspects)
//! scripted queue --> returned outcome  (test seeds)
//! ```
//!
//! When the queue is empty the fake answers with a network error so a test
//! that forgot to script a reply fails loudly rather than hanging.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// In-process fake transport for use in tests
#[derive(Debug, Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    /// Create a fake with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fake that answers once with `status` and `body`
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        let fake = Self::new();
        fake.push_response(status, body);
        fake
    }

    /// Create a fake that fails once with `error`
    pub fn failing(error: TransportError) -> Self {
        let fake = Self::new();
        fake.push_error(error);
        fake
    }

    /// Queue an HTTP response
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) {
        self.script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .push_back(Err(error));
    }

    /// Number of times `post` was invoked
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .expect("FakeTransport: requests lock poisoned")
            .len()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests
            .lock()
            .expect("FakeTransport: requests lock poisoned")
            .last()
            .cloned()
    }

    /// Parsed JSON body of the most recent request
    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.last_request()
            .map(|r| serde_json::from_str(&r.body).expect("FakeTransport: body is not JSON"))
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .expect("FakeTransport: requests lock poisoned")
            .push(request);

        self.script
            .lock()
            .expect("FakeTransport: script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request() -> HttpRequest {
        HttpRequest {
            url: "http://fake/chat".to_string(),
            headers: Vec::new(),
            body: "{\"k\":true}".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_replays_script_in_order() {
        let fake = FakeTransport::responding(200, "first");
        fake.push_error(TransportError::Timeout);

        assert_eq!(fake.post(request()).await.unwrap().body, "first");
        assert_eq!(fake.post(request()).await, Err(TransportError::Timeout));
        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_script_is_network_error() {
        let fake = FakeTransport::new();
        assert!(matches!(
            fake.post(request()).await,
            Err(TransportError::Network(_))
        ));
        assert_eq!(fake.last_body().unwrap()["k"], true);
    }
}
