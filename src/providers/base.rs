//! Core conversation and request types
//!
//! This module defines the message, model, and parameter types shared by the
//! conversation store, the completion client, and the statistics aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ChatRelayError, Result};

/// Lowest accepted sampling temperature
pub const MIN_TEMPERATURE: f32 = 0.0;
/// Highest accepted sampling temperature
pub const MAX_TEMPERATURE: f32 = 2.0;
/// Lowest accepted completion token limit
pub const MIN_MAX_TOKENS: u32 = 100;
/// Highest accepted completion token limit
pub const MAX_MAX_TOKENS: u32 = 8000;
/// Temperature used when none is configured
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Completion token limit used when none is configured
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person using the client
    User,
    /// Text generated by the completion endpoint
    Assistant,
}

impl Role {
    /// Wire name used in the request body (`"user"` / `"assistant"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Human-readable label used in transcripts
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation message
///
/// Messages are immutable once created. The timestamp is local bookkeeping
/// and is never sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,
    /// Message text
    pub content: String,
    /// When the message was created, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Creates a message without a timestamp
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    /// Creates a user message stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// assert!(msg.timestamp.is_some());
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content).stamped()
    }

    /// Creates an assistant message stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::{Message, Role};
    ///
    /// let msg = Message::assistant("Hello, user!");
    /// assert_eq!(msg.role, Role::Assistant);
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content).stamped()
    }

    fn stamped(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }
}

/// Token usage reported by the provider for one completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    #[serde(default)]
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    #[serde(default)]
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Total tokens, falling back to prompt + completion when the provider
    /// left `total_tokens` at zero
    pub fn effective_total(&self) -> usize {
        if self.total_tokens > 0 {
            self.total_tokens
        } else {
            self.prompt_tokens.saturating_add(self.completion_tokens)
        }
    }
}

/// Coarse grouping used to organise the model picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    /// General-purpose chat models
    General,
    /// Small models tuned for latency
    Fast,
    /// Models that spend extra tokens on reasoning
    Reasoning,
    /// Code-specialised models
    Code,
}

impl fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "General"),
            Self::Fast => write!(f, "Fast"),
            Self::Reasoning => write!(f, "Reasoning"),
            Self::Code => write!(f, "Code"),
        }
    }
}

/// A model offered by the completion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Name shown to the user (e.g., "GPT-3.5 Turbo")
    pub display_name: String,
    /// Identifier sent as `model` in the request (e.g., "openai/gpt-3.5-turbo")
    pub api_id: String,
    /// Context window in tokens, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<usize>,
    /// Picker grouping, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ModelCategory>,
}

impl ModelSpec {
    /// Create a model spec with no context window or category
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::{ModelCategory, ModelSpec};
    ///
    /// let model = ModelSpec::new("GPT-4", "openai/gpt-4")
    ///     .with_context_window(8192)
    ///     .with_category(ModelCategory::General);
    /// assert_eq!(model.api_id, "openai/gpt-4");
    /// assert_eq!(model.context_window, Some(8192));
    /// ```
    pub fn new(display_name: impl Into<String>, api_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            api_id: api_id.into(),
            context_window: None,
            category: None,
        }
    }

    /// Set the context window and return self for builder-style use
    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.context_window = Some(tokens);
        self
    }

    /// Set the category and return self for builder-style use
    pub fn with_category(mut self, category: ModelCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Sampling parameters captured for each request
///
/// Values are validated on every mutation, so a `RequestParameters` always
/// holds a temperature in `[0.0, 2.0]` and a token limit in `[100, 8000]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameters {
    model: ModelSpec,
    temperature: f32,
    max_tokens: u32,
}

impl RequestParameters {
    /// Create validated request parameters
    ///
    /// # Errors
    ///
    /// Returns [`ChatRelayError::InvalidParameter`] if either value is out of
    /// range (NaN temperatures included).
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::providers::{ModelSpec, RequestParameters};
    ///
    /// let model = ModelSpec::new("GPT-3.5 Turbo", "openai/gpt-3.5-turbo");
    /// assert!(RequestParameters::new(model.clone(), 0.7, 1000).is_ok());
    /// assert!(RequestParameters::new(model.clone(), 2.5, 1000).is_err());
    /// assert!(RequestParameters::new(model, 0.7, 50).is_err());
    /// ```
    pub fn new(model: ModelSpec, temperature: f32, max_tokens: u32) -> Result<Self> {
        validate_temperature(temperature)?;
        validate_max_tokens(max_tokens)?;
        Ok(Self {
            model,
            temperature,
            max_tokens,
        })
    }

    /// Parameters for `model` with the default temperature and token limit
    pub fn with_defaults(model: ModelSpec) -> Self {
        Self {
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Selected model
    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    /// Sampling temperature
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Completion token limit
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Switch to a different model
    pub fn set_model(&mut self, model: ModelSpec) {
        self.model = model;
    }

    /// Change the temperature, rejecting out-of-range values
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    /// Change the token limit, rejecting out-of-range values
    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<()> {
        validate_max_tokens(max_tokens)?;
        self.max_tokens = max_tokens;
        Ok(())
    }
}

fn validate_temperature(temperature: f32) -> Result<()> {
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(ChatRelayError::InvalidParameter(format!(
            "temperature must be between {} and {}, got {}",
            MIN_TEMPERATURE, MAX_TEMPERATURE, temperature
        ))
        .into());
    }
    Ok(())
}

fn validate_max_tokens(max_tokens: u32) -> Result<()> {
    if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&max_tokens) {
        return Err(ChatRelayError::InvalidParameter(format!(
            "max_tokens must be between {} and {}, got {}",
            MIN_MAX_TOKENS, MAX_MAX_TOKENS, max_tokens
        ))
        .into());
    }
    Ok(())
}

/// Successful result of a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Assistant reply text (`choices[0].message.content`)
    pub content: String,
    /// Provider-reported usage, when present in the response
    pub usage: Option<TokenUsage>,
    /// Model the provider says it used, when present in the response
    pub model: Option<String>,
}
