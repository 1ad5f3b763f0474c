use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

use chatrelay::providers::{CompletionClient, EndpointConfig, ModelSpec, RequestParameters};

pub const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

/// Client pointed at the mock server's completions path
#[allow(dead_code)]
pub fn client_for(server: &MockServer, timeout: Duration) -> CompletionClient {
    let endpoint = EndpointConfig::openrouter(Some("http://localhost:8501"), Some("chatrelay"))
        .with_timeout(timeout);
    let endpoint = EndpointConfig {
        url: format!("{}{}", server.uri(), COMPLETIONS_PATH),
        ..endpoint
    };
    CompletionClient::from_endpoint(endpoint).expect("failed to build completion client")
}

#[allow(dead_code)]
pub fn default_params() -> RequestParameters {
    RequestParameters::with_defaults(ModelSpec::new("GPT-3.5 Turbo", "openai/gpt-3.5-turbo"))
}

/// Minimal successful chat-completions body
#[allow(dead_code)]
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "gen-123",
        "model": "openai/gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
