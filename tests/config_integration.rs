mod common;

use serial_test::serial;

use chatrelay::cli::{Cli, Commands};
use chatrelay::config::Config;
use chatrelay::providers::{self, ProviderKind};

use common::temp_config_file;

fn ask_cli(provider: Option<&str>) -> Cli {
    Cli {
        config: None,
        verbose: false,
        command: Commands::Ask {
            prompt: "hi".to_string(),
            provider: provider.map(String::from),
            model: None,
        },
    }
}

#[test]
#[serial]
fn test_config_file_drives_endpoint() {
    std::env::remove_var("CHATRELAY_ENDPOINT_URL");
    std::env::remove_var("CHATRELAY_PROVIDER");
    let (_dir, path) = temp_config_file(
        r#"
provider:
  type: openrouter
  openrouter:
    url: http://127.0.0.1:9999/api/v1/chat/completions
    referer: https://example.com
    title: Example Bot
chat:
  timeout_seconds: 12
"#,
    );

    let config = Config::load(path.to_str().unwrap(), &ask_cli(None)).unwrap();
    config.validate().unwrap();

    let endpoint = providers::endpoint_from_config(&config.provider, config.chat.timeout_seconds);
    assert_eq!(endpoint.url, "http://127.0.0.1:9999/api/v1/chat/completions");
    assert_eq!(endpoint.timeout.as_secs(), 12);
    assert!(endpoint
        .extra_headers
        .contains(&("HTTP-Referer".to_string(), "https://example.com".to_string())));
    assert!(endpoint
        .extra_headers
        .contains(&("X-Title".to_string(), "Example Bot".to_string())));

    let client = providers::create_client(&config).unwrap();
    assert_eq!(client.timeout().as_secs(), 12);
}

#[test]
#[serial]
fn test_cli_provider_switches_endpoint() {
    std::env::remove_var("CHATRELAY_ENDPOINT_URL");
    std::env::remove_var("CHATRELAY_PROVIDER");
    let (_dir, path) = temp_config_file("chat:\n  model: llama-3.1-8b-instant\n");

    let config = Config::load(path.to_str().unwrap(), &ask_cli(Some("groq"))).unwrap();
    assert_eq!(config.provider.provider_type, ProviderKind::Groq);

    let endpoint = providers::endpoint_from_config(&config.provider, config.chat.timeout_seconds);
    assert_eq!(endpoint.url, providers::GROQ_URL);
    assert!(endpoint.extra_headers.is_empty());
}

#[test]
#[serial]
fn test_invalid_values_fail_validation() {
    std::env::remove_var("CHATRELAY_TEMPERATURE");
    let (_dir, path) = temp_config_file("chat:\n  temperature: 4.0\n");

    let config = Config::load(path.to_str().unwrap(), &ask_cli(None)).unwrap();
    assert!(config.validate().is_err());
}
