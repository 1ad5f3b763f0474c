//! Configuration management for chatrelay
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatRelayError, Result};
use crate::providers::{
    ModelCatalog, ProviderKind, StaticCatalog, GROQ_URL, MAX_MAX_TOKENS, MAX_TEMPERATURE, MIN_MAX_TOKENS, MIN_TEMPERATURE,
    OPENROUTER_URL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for chatrelay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration (OpenRouter, Groq)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Chat request and session settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Keyring location of the stored API key
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Provider configuration
///
/// Specifies which completion endpoint to use and its settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default)]
    pub provider_type: ProviderKind,

    /// OpenRouter configuration
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Groq configuration
    #[serde(default)]
    pub groq: GroqConfig,
}

impl ProviderConfig {
    /// Endpoint URL of the active provider
    pub fn active_url(&self) -> &str {
        match self.provider_type {
            ProviderKind::OpenRouter => &self.openrouter.url,
            ProviderKind::Groq => &self.groq.url,
        }
    }

    /// Environment variable holding the active provider's API key
    pub fn active_api_key_env(&self) -> &str {
        match self.provider_type {
            ProviderKind::OpenRouter => &self.openrouter.api_key_env,
            ProviderKind::Groq => &self.groq.api_key_env,
        }
    }

    fn set_active_url(&mut self, url: String) {
        match self.provider_type {
            ProviderKind::OpenRouter => self.openrouter.url = url,
            ProviderKind::Groq => self.groq.url = url,
        }
    }
}

/// OpenRouter provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Chat completions URL
    #[serde(default = "default_openrouter_url")]
    pub url: String,

    /// Value of the `HTTP-Referer` attribution header
    #[serde(default = "default_openrouter_referer")]
    pub referer: Option<String>,

    /// Value of the `X-Title` attribution header
    #[serde(default = "default_openrouter_title")]
    pub title: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_openrouter_key_env")]
    pub api_key_env: String,
}

fn default_openrouter_url() -> String {
    OPENROUTER_URL.to_string()
}

fn default_openrouter_referer() -> Option<String> {
    Some("http://localhost:8501".to_string())
}

fn default_openrouter_title() -> Option<String> {
    Some("chatrelay".to_string())
}

fn default_openrouter_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            url: default_openrouter_url(),
            referer: default_openrouter_referer(),
            title: default_openrouter_title(),
            api_key_env: default_openrouter_key_env(),
        }
    }
}

/// Groq provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Chat completions URL
    #[serde(default = "default_groq_url")]
    pub url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_groq_key_env")]
    pub api_key_env: String,
}

fn default_groq_url() -> String {
    GROQ_URL.to_string()
}

fn default_groq_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            url: default_groq_url(),
            api_key_env: default_groq_key_env(),
        }
    }
}

/// Chat request and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model API id sent with each request; unset means the first model
    /// in the active provider's catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature (0.0-2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token limit (100-8000)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of most recent messages sent per request
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_temperature() -> f32 {
    crate::providers::DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    crate::providers::DEFAULT_MAX_TOKENS
}

fn default_history_window() -> usize {
    crate::session::DEFAULT_HISTORY_WINDOW
}

fn default_timeout() -> u64 {
    30
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            history_window: default_history_window(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Keyring location of the stored API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Keyring service name
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Keyring user name
    #[serde(default = "default_keyring_user")]
    pub keyring_user: String,
}

fn default_keyring_service() -> String {
    "chatrelay".to_string()
}

fn default_keyring_user() -> String {
    "api_key".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            keyring_user: default_keyring_user(),
        }
    }
}

impl CredentialsConfig {
    /// Keyring user for `provider`, so each provider keeps its own key
    pub fn user_for(&self, provider: ProviderKind) -> String {
        format!("{}:{}", self.keyring_user, provider.as_str())
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed, or a CLI override
    /// names an unknown provider
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli)?;
        config.apply_endpoint_override();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatRelayError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatRelayError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider) = std::env::var("CHATRELAY_PROVIDER") {
            match provider.parse() {
                Ok(kind) => {
                    self.provider.provider_type = kind;
                    tracing::debug!(provider = %provider, "Env override: CHATRELAY_PROVIDER");
                }
                Err(_) => tracing::warn!("Invalid CHATRELAY_PROVIDER: {}", provider),
            }
        }

        if let Ok(model) = std::env::var("CHATRELAY_MODEL") {
            tracing::debug!(model = %model, "Env override: CHATRELAY_MODEL");
            self.chat.model = Some(model);
        }

        if let Ok(temperature) = std::env::var("CHATRELAY_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.chat.temperature = value;
            } else {
                tracing::warn!("Invalid CHATRELAY_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(max_tokens) = std::env::var("CHATRELAY_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.chat.max_tokens = value;
            } else {
                tracing::warn!("Invalid CHATRELAY_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(window) = std::env::var("CHATRELAY_HISTORY_WINDOW") {
            if let Ok(value) = window.parse() {
                self.chat.history_window = value;
            } else {
                tracing::warn!("Invalid CHATRELAY_HISTORY_WINDOW: {}", window);
            }
        }

        if let Ok(timeout) = std::env::var("CHATRELAY_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.chat.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CHATRELAY_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    // Runs after the CLI overrides so the URL lands on the final provider
    fn apply_endpoint_override(&mut self) {
        if let Ok(url) = std::env::var("CHATRELAY_ENDPOINT_URL") {
            tracing::debug!(url = %url, "Env override: CHATRELAY_ENDPOINT_URL");
            self.provider.set_active_url(url);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) -> Result<()> {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(provider) = cli.provider_override() {
            self.provider.provider_type = provider.parse()?;
            tracing::debug!("Using provider override: {}", provider);
        }

        if let Some(model) = cli.model_override() {
            self.chat.model = Some(model.to_string());
            tracing::debug!("Using model override: {}", model);
        }

        Ok(())
    }

    /// Model API id in effect: the configured one, or the first model in
    /// the active provider's catalog
    pub fn active_model(&self) -> String {
        self.chat.model.clone().unwrap_or_else(|| {
            StaticCatalog::for_provider(self.provider.provider_type)
                .default_model()
                .map(|m| m.api_id)
                .unwrap_or_default()
        })
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if matches!(self.chat.model.as_deref(), Some(model) if model.trim().is_empty()) {
            return Err(ChatRelayError::Config("chat.model cannot be empty".to_string()).into());
        }

        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.chat.temperature) {
            return Err(ChatRelayError::Config(format!(
                "chat.temperature must be between {} and {}",
                MIN_TEMPERATURE, MAX_TEMPERATURE
            ))
            .into());
        }

        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.chat.max_tokens) {
            return Err(ChatRelayError::Config(format!(
                "chat.max_tokens must be between {} and {}",
                MIN_MAX_TOKENS, MAX_MAX_TOKENS
            ))
            .into());
        }

        if self.chat.history_window == 0 {
            return Err(ChatRelayError::Config(
                "chat.history_window must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.timeout_seconds == 0 {
            return Err(ChatRelayError::Config(
                "chat.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        let url = self.provider.active_url();
        if url.trim().is_empty() {
            return Err(ChatRelayError::Config(format!(
                "{} endpoint url cannot be empty",
                self.provider.provider_type
            ))
            .into());
        }
        url::Url::parse(url).map_err(|e| {
            ChatRelayError::Config(format!("Invalid endpoint url '{}': {}", url, e))
        })?;

        if self.provider.active_api_key_env().trim().is_empty() {
            return Err(ChatRelayError::Config(
                "api_key_env cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_VARS: [&str; 7] = [
        "CHATRELAY_PROVIDER",
        "CHATRELAY_MODEL",
        "CHATRELAY_TEMPERATURE",
        "CHATRELAY_MAX_TOKENS",
        "CHATRELAY_HISTORY_WINDOW",
        "CHATRELAY_TIMEOUT_SECONDS",
        "CHATRELAY_ENDPOINT_URL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn chat_cli(provider: Option<&str>, model: Option<&str>) -> Cli {
        Cli {
            config: None,
            verbose: false,
            command: Commands::Chat {
                provider: provider.map(String::from),
                model: model.map(String::from),
            },
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, ProviderKind::OpenRouter);
        assert!(config.chat.model.is_none());
        assert_eq!(config.active_model(), "openai/gpt-3.5-turbo");
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(config.chat.max_tokens, 1000);
        assert_eq!(config.chat.history_window, 20);
        assert_eq!(config.chat.timeout_seconds, 30);
        assert_eq!(config.provider.openrouter.url, OPENROUTER_URL);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_unset_model_follows_provider_catalog() {
        let mut config = Config::default();
        config.provider.provider_type = ProviderKind::Groq;
        assert!(config.validate().is_ok());
        assert_eq!(config.active_model(), "llama-3.3-70b-versatile");

        config.chat.model = Some("gemma2-9b-it".to_string());
        assert_eq!(config.active_model(), "gemma2-9b-it");
    }

    #[test]
    fn test_config_validation_blank_model() {
        let mut config = Config::default();
        config.chat.model = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_temperature_range() {
        let mut config = Config::default();
        config.chat.temperature = 2.1;
        assert!(config.validate().is_err());

        config.chat.temperature = -0.1;
        assert!(config.validate().is_err());

        config.chat.temperature = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_max_tokens_range() {
        let mut config = Config::default();
        config.chat.max_tokens = 99;
        assert!(config.validate().is_err());

        config.chat.max_tokens = 8001;
        assert!(config.validate().is_err());

        config.chat.max_tokens = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_window_and_timeout() {
        let mut config = Config::default();
        config.chat.history_window = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chat.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.provider.openrouter.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.provider.openrouter.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_checks_active_provider_only() {
        let mut config = Config::default();
        config.provider.groq.url = "broken".to_string();
        assert!(config.validate().is_ok());

        config.provider.provider_type = ProviderKind::Groq;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: groq
  groq:
    url: https://api.groq.com/openai/v1/chat/completions
    api_key_env: MY_GROQ_KEY

chat:
  model: llama-3.1-8b-instant
  temperature: 0.2
  max_tokens: 2048
  history_window: 10
  timeout_seconds: 60

credentials:
  keyring_service: relay-test
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.provider_type, ProviderKind::Groq);
        assert_eq!(config.provider.active_api_key_env(), "MY_GROQ_KEY");
        assert_eq!(config.chat.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(config.chat.max_tokens, 2048);
        assert_eq!(config.chat.history_window, 10);
        assert_eq!(config.credentials.keyring_service, "relay-test");
        assert_eq!(config.credentials.keyring_user, "api_key");
        assert_eq!(config.provider.openrouter.url, OPENROUTER_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml_rejects_unknown_provider() {
        let yaml = "provider:\n  type: copilot\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &chat_cli(None, None)).unwrap();
        assert_eq!(config.provider.provider_type, ProviderKind::OpenRouter);
        assert_eq!(config.active_model(), "openai/gpt-3.5-turbo");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chat:\n  model: openai/gpt-4\n  temperature: 1.1").unwrap();

        let config = Config::load(file.path().to_str().unwrap(), &chat_cli(None, None)).unwrap();
        assert_eq!(config.chat.model.as_deref(), Some("openai/gpt-4"));
        assert_eq!(config.chat.temperature, 1.1);
        assert_eq!(config.chat.max_tokens, 1000);
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_is_config_error() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chat: [unclosed").unwrap();

        let err = Config::load(file.path().to_str().unwrap(), &chat_cli(None, None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatRelayError>(),
            Some(ChatRelayError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides() {
        clear_env();
        std::env::set_var("CHATRELAY_PROVIDER", "groq");
        std::env::set_var("CHATRELAY_MODEL", "gemma2-9b-it");
        std::env::set_var("CHATRELAY_TEMPERATURE", "0.3");
        std::env::set_var("CHATRELAY_MAX_TOKENS", "500");
        std::env::set_var("CHATRELAY_HISTORY_WINDOW", "6");
        std::env::set_var("CHATRELAY_TIMEOUT_SECONDS", "12");
        std::env::set_var("CHATRELAY_ENDPOINT_URL", "http://127.0.0.1:8080/v1/chat/completions");

        let mut config = Config::default();
        config.apply_env_vars();
        config.apply_endpoint_override();
        clear_env();

        assert_eq!(config.provider.provider_type, ProviderKind::Groq);
        assert_eq!(config.chat.model.as_deref(), Some("gemma2-9b-it"));
        assert_eq!(config.chat.temperature, 0.3);
        assert_eq!(config.chat.max_tokens, 500);
        assert_eq!(config.chat.history_window, 6);
        assert_eq!(config.chat.timeout_seconds, 12);
        assert_eq!(
            config.provider.groq.url,
            "http://127.0.0.1:8080/v1/chat/completions"
        );
        assert_eq!(config.provider.openrouter.url, OPENROUTER_URL);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_unparseable_values() {
        clear_env();
        std::env::set_var("CHATRELAY_PROVIDER", "copilot");
        std::env::set_var("CHATRELAY_MAX_TOKENS", "lots");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.provider.provider_type, ProviderKind::OpenRouter);
        assert_eq!(config.chat.max_tokens, 1000);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win_over_env() {
        clear_env();
        std::env::set_var("CHATRELAY_MODEL", "from-env");

        let config =
            Config::load("nonexistent.yaml", &chat_cli(Some("groq"), Some("from-cli"))).unwrap();
        clear_env();

        assert_eq!(config.provider.provider_type, ProviderKind::Groq);
        assert_eq!(config.chat.model.as_deref(), Some("from-cli"));
    }

    #[test]
    #[serial]
    fn test_cli_provider_override_without_model_uses_provider_default() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &chat_cli(Some("groq"), None)).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.active_model(), "llama-3.3-70b-versatile");
    }

    #[test]
    #[serial]
    fn test_endpoint_env_applies_to_cli_selected_provider() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "provider:\n  type: openrouter").unwrap();
        std::env::set_var("CHATRELAY_ENDPOINT_URL", "http://127.0.0.1:9090/v1/chat/completions");

        let config =
            Config::load(file.path().to_str().unwrap(), &chat_cli(Some("groq"), None)).unwrap();
        clear_env();

        assert_eq!(config.provider.provider_type, ProviderKind::Groq);
        assert_eq!(
            config.provider.active_url(),
            "http://127.0.0.1:9090/v1/chat/completions"
        );
        assert_eq!(config.provider.openrouter.url, OPENROUTER_URL);
    }

    #[test]
    #[serial]
    fn test_cli_unknown_provider_is_error() {
        clear_env();
        assert!(Config::load("nonexistent.yaml", &chat_cli(Some("copilot"), None)).is_err());
    }

    #[test]
    fn test_keyring_user_per_provider() {
        let credentials = CredentialsConfig::default();
        assert_eq!(credentials.user_for(ProviderKind::Groq), "api_key:groq");
    }
}
