//! Error types for chatrelay
//!
//! This module defines the error types used throughout the crate, using
//! `thiserror` for ergonomic error handling. Completion failures have their
//! own typed taxonomy ([`CompletionError`]) because callers branch on them;
//! everything else flows through [`ChatRelayError`] and `anyhow`.

use thiserror::Error;

/// Main error type for chatrelay operations
///
/// Covers configuration loading, credential lookup, export, and the I/O
/// around them. Completion outcomes are reported with [`CompletionError`].
#[derive(Error, Debug)]
pub enum ChatRelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request parameters outside their allowed range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model identifier not present in the catalog
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Export formatting or parsing errors
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Completion failures surfaced through the ambient error path
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Outcome classification for a failed completion request
///
/// Every failure of [`crate::providers::CompletionClient::complete`] maps to
/// exactly one of these variants. None of them is fatal to the process and
/// none of them is retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// No bearer token was supplied; no request was sent
    #[error("Missing credential: an API key is required")]
    MissingCredential,

    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection, DNS, TLS or other transport failure
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The endpoint answered with a non-success status
    #[error("API error {status}: {message}")]
    ApiError {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Best-effort error message extracted from the body
        message: String,
    },

    /// A success status whose body lacks `choices[0].message.content`
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Unexpected failure while building the request or reading the reply
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompletionError {
    /// Whether resubmitting the same request may plausibly succeed
    ///
    /// The client never retries on its own; hosts use this to decide how to
    /// phrase the failure to the user.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::error::CompletionError;
    ///
    /// assert!(CompletionError::Timeout.is_retryable());
    /// assert!(!CompletionError::MissingCredential.is_retryable());
    /// assert!(CompletionError::ApiError { status: 503, message: "busy".into() }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::NetworkError(_) => true,
            Self::ApiError { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredential | Self::MalformedResponse(_) | Self::Internal(_) => false,
        }
    }

    /// Short stable label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Timeout => "timeout",
            Self::NetworkError(_) => "network",
            Self::ApiError { .. } => "api",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for chatrelay operations
///
/// Uses `anyhow::Error` as the error type, allowing for rich error context
/// and easy error propagation in the ambient (non-completion) paths.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ChatRelayError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let error = ChatRelayError::InvalidParameter("temperature 3.0".to_string());
        assert_eq!(error.to_string(), "Invalid parameter: temperature 3.0");
    }

    #[test]
    fn test_api_error_display() {
        let error = CompletionError::ApiError {
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(error.to_string(), "API error 401: bad key");
    }

    #[test]
    fn test_missing_credential_display() {
        assert_eq!(
            CompletionError::MissingCredential.to_string(),
            "Missing credential: an API key is required"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(CompletionError::NetworkError("reset".into()).is_retryable());
        assert!(CompletionError::ApiError {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(!CompletionError::ApiError {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!CompletionError::MalformedResponse("x".into()).is_retryable());
        assert!(!CompletionError::Internal("x".into()).is_retryable());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(CompletionError::Timeout.kind(), "timeout");
        assert_eq!(
            CompletionError::ApiError {
                status: 500,
                message: String::new()
            }
            .kind(),
            "api"
        );
    }

    #[test]
    fn test_completion_error_converts_into_crate_error() {
        let error: ChatRelayError = CompletionError::Timeout.into();
        assert!(matches!(error, ChatRelayError::Completion(CompletionError::Timeout)));
        assert_eq!(error.to_string(), "Request timed out");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatRelayError = io_error.into();
        assert!(matches!(error, ChatRelayError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: ChatRelayError = json_error.into();
        assert!(matches!(error, ChatRelayError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: ChatRelayError = yaml_error.into();
        assert!(matches!(error, ChatRelayError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatRelayError>();
        assert_send_sync::<CompletionError>();
    }
}
