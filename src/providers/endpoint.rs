//! Completion endpoint descriptions
//!
//! An [`EndpointConfig`] carries everything provider-specific about the
//! outbound request: the URL, any extra headers the provider wants, and the
//! request timeout. The client itself is provider-agnostic.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChatRelayError;

/// OpenRouter chat completions URL
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Groq OpenAI-compatible chat completions URL
pub const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Supported completion providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// openrouter.ai
    #[default]
    OpenRouter,
    /// api.groq.com (OpenAI-compatible)
    Groq,
}

impl ProviderKind {
    /// Lowercase name used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ChatRelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "groq" => Ok(Self::Groq),
            other => Err(ChatRelayError::Config(format!(
                "Invalid provider type: {}. Must be one of: openrouter, groq",
                other
            ))),
        }
    }
}

/// Where and how to send completion requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Absolute chat completions URL
    pub url: String,
    /// Provider-specific headers added after `Authorization` and `Content-Type`
    pub extra_headers: Vec<(String, String)>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl EndpointConfig {
    /// Endpoint at `url` with no extra headers and the default timeout
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::EndpointConfig;
    ///
    /// let endpoint = EndpointConfig::new("http://localhost:8080/v1/chat/completions");
    /// assert!(endpoint.extra_headers.is_empty());
    /// assert_eq!(endpoint.timeout.as_secs(), 30);
    /// ```
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra_headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// OpenRouter endpoint with its optional attribution headers
    ///
    /// OpenRouter uses `HTTP-Referer` and `X-Title` to attribute traffic to
    /// an application; both are omitted when `None`.
    pub fn openrouter(referer: Option<&str>, title: Option<&str>) -> Self {
        let mut endpoint = Self::new(OPENROUTER_URL);
        if let Some(referer) = referer {
            endpoint = endpoint.with_header("HTTP-Referer", referer);
        }
        if let Some(title) = title {
            endpoint = endpoint.with_header("X-Title", title);
        }
        endpoint
    }

    /// Groq endpoint
    pub fn groq() -> Self {
        Self::new(GROQ_URL)
    }

    /// Add an extra header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Override the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
