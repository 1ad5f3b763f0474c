//! Chat completion client
//!
//! [`CompletionClient`] turns a slice of conversation history plus request
//! parameters into one POST against an OpenAI-style `chat/completions`
//! endpoint, and classifies the outcome into [`CompletionError`]. It holds no
//! conversation state of its own; the caller decides what to send and what
//! to do with the reply.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::Credential;
use crate::error::{CompletionError, Result};
use crate::providers::{Completion, EndpointConfig, Message, RequestParameters, TokenUsage};
use crate::transport::{HttpRequest, ReqwestTransport, Transport, TransportError};

/// Request body for the chat completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Message as sent on the wire (role and content only)
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body from the chat completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
    #[serde(default)]
    model: Option<String>,
}

/// Choice in the completion response
#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

/// Message inside a choice
#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorField,
}

/// Providers disagree on whether `error` is an object or a bare string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Structured { message: String },
    Plain(String),
}

/// Single-shot client for a chat completions endpoint
///
/// # Examples
///
/// ```no_run
/// use chatrelay::credentials::Credential;
/// use chatrelay::providers::{CompletionClient, EndpointConfig, Message, ModelSpec, RequestParameters};
///
/// # async fn example() -> chatrelay::error::Result<()> {
/// let client = CompletionClient::from_endpoint(EndpointConfig::openrouter(None, None))?;
/// let params = RequestParameters::with_defaults(ModelSpec::new("GPT-3.5 Turbo", "openai/gpt-3.5-turbo"));
/// let credential = Credential::new("sk-or-...");
/// let history = vec![Message::user("Hello!")];
/// let completion = client.complete(&history, &params, Some(&credential)).await?;
/// println!("{}", completion.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CompletionClient {
    transport: Arc<dyn Transport>,
    endpoint: EndpointConfig,
}

impl CompletionClient {
    /// Create a client sending through `transport`
    pub fn new(transport: Arc<dyn Transport>, endpoint: EndpointConfig) -> Self {
        tracing::info!(
            "Initialized completion client: url={}, timeout={}s",
            endpoint.url,
            endpoint.timeout.as_secs()
        );
        Self {
            transport,
            endpoint,
        }
    }

    /// Create a client with its own [`ReqwestTransport`]
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn from_endpoint(endpoint: EndpointConfig) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(Arc::new(transport), endpoint))
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        self.endpoint.timeout
    }

    /// Send `history` to the endpoint and return the assistant reply
    ///
    /// The whole `history` slice is sent; windowing is the caller's job.
    /// Exactly one transport call is made when a credential is present, and
    /// none when it is absent.
    ///
    /// # Errors
    ///
    /// - [`CompletionError::MissingCredential`] if `credential` is `None` or empty
    /// - [`CompletionError::Timeout`] if the request exceeded the timeout
    /// - [`CompletionError::NetworkError`] for other transport failures
    /// - [`CompletionError::ApiError`] for non-2xx statuses
    /// - [`CompletionError::MalformedResponse`] if the reply lacks
    ///   `choices[0].message.content`
    /// - [`CompletionError::Internal`] if the request body cannot be built
    pub async fn complete(
        &self,
        history: &[Message],
        params: &RequestParameters,
        credential: Option<&Credential>,
    ) -> std::result::Result<Completion, CompletionError> {
        let credential = match credential {
            Some(c) if !c.is_empty() => c,
            _ => {
                tracing::warn!("Completion requested without a credential; not sending");
                return Err(CompletionError::MissingCredential);
            }
        };

        let request = self.build_request(history, params, credential)?;

        tracing::debug!(
            "Sending completion request: model={}, {} messages, temperature={}, max_tokens={}",
            params.model().api_id,
            history.len(),
            params.temperature(),
            params.max_tokens()
        );

        let response = self.transport.post(request).await.map_err(|e| match e {
            TransportError::Timeout => {
                tracing::error!(
                    "Completion request timed out after {}s",
                    self.endpoint.timeout.as_secs()
                );
                CompletionError::Timeout
            }
            TransportError::Network(message) => {
                tracing::error!("Completion request failed: {}", message);
                CompletionError::NetworkError(message)
            }
        })?;

        if !response.is_success() {
            let error = api_error(response.status, &response.body);
            tracing::error!("Completion endpoint returned error: {}", error);
            return Err(error);
        }

        let completion = parse_completion(&response.body)?;
        tracing::debug!(
            "Completion received: {} chars, usage={:?}",
            completion.content.len(),
            completion.usage
        );
        Ok(completion)
    }

    fn build_request(
        &self,
        history: &[Message],
        params: &RequestParameters,
        credential: &Credential,
    ) -> std::result::Result<HttpRequest, CompletionError> {
        let body = ChatRequest {
            model: &params.model().api_id,
            messages: history
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: params.temperature(),
            max_tokens: params.max_tokens(),
            stream: false,
        };

        let body = serde_json::to_string(&body)
            .map_err(|e| CompletionError::Internal(format!("Failed to encode request: {}", e)))?;

        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", credential.bearer_token()),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        headers.extend(self.endpoint.extra_headers.iter().cloned());

        Ok(HttpRequest {
            url: self.endpoint.url.clone(),
            headers,
            body,
            timeout: self.endpoint.timeout,
        })
    }
}

/// Extract `choices[0].message.content` from a success body
fn parse_completion(body: &str) -> std::result::Result<Completion, CompletionError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse completion response: {}", e);
        CompletionError::MalformedResponse(format!("invalid JSON: {}", e))
    })?;

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::MalformedResponse("no choices in response".to_string()))?
        .message
        .ok_or_else(|| CompletionError::MalformedResponse("choice has no message".to_string()))?
        .content
        .ok_or_else(|| CompletionError::MalformedResponse("message has no content".to_string()))?;

    Ok(Completion {
        content,
        usage: response.usage,
        model: response.model,
    })
}

/// Build an `ApiError`, preferring a structured `error.message`
fn api_error(status: u16, body: &str) -> CompletionError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorField::Structured { message },
        })
        | Ok(ErrorEnvelope {
            error: ErrorField::Plain(message),
        }) => message,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        }
    };

    CompletionError::ApiError { status, message }
}
