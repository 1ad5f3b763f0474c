//! Completion endpoint access
//!
//! This module holds the request/response types, the provider-agnostic
//! [`CompletionClient`], endpoint presets for OpenRouter and Groq, and the
//! model catalogs.

pub mod base;
pub mod catalog;
pub mod client;
pub mod endpoint;

pub use base::{
    Completion, Message, ModelCategory, ModelSpec, RequestParameters, Role, TokenUsage,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, MAX_MAX_TOKENS, MAX_TEMPERATURE, MIN_MAX_TOKENS,
    MIN_TEMPERATURE,
};
pub use catalog::{ModelCatalog, StaticCatalog};
pub use client::CompletionClient;
pub use endpoint::{EndpointConfig, ProviderKind, DEFAULT_TIMEOUT, GROQ_URL, OPENROUTER_URL};

use crate::config::ProviderConfig;
use crate::error::Result;

/// Build the endpoint description for the configured provider
///
/// # Examples
///
/// ```
/// use chatrelay::config::ProviderConfig;
/// use chatrelay::providers::{endpoint_from_config, ProviderKind, GROQ_URL};
///
/// let mut config = ProviderConfig::default();
/// config.provider_type = ProviderKind::Groq;
/// let endpoint = endpoint_from_config(&config, 45);
/// assert_eq!(endpoint.url, GROQ_URL);
/// assert_eq!(endpoint.timeout.as_secs(), 45);
/// ```
pub fn endpoint_from_config(config: &ProviderConfig, timeout_seconds: u64) -> EndpointConfig {
    let endpoint = match config.provider_type {
        ProviderKind::OpenRouter => {
            let openrouter = &config.openrouter;
            let mut endpoint = EndpointConfig::openrouter(
                openrouter.referer.as_deref(),
                openrouter.title.as_deref(),
            );
            endpoint.url = openrouter.url.clone();
            endpoint
        }
        ProviderKind::Groq => EndpointConfig::new(config.groq.url.clone()),
    };
    endpoint.with_timeout(std::time::Duration::from_secs(timeout_seconds))
}

/// Create a completion client for the configured provider
///
/// # Errors
///
/// Returns error if HTTP client initialization fails
pub fn create_client(config: &crate::config::Config) -> Result<CompletionClient> {
    let endpoint = endpoint_from_config(&config.provider, config.chat.timeout_seconds);
    tracing::debug!("Creating {} completion client", config.provider.provider_type);
    CompletionClient::from_endpoint(endpoint)
}
