/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes these top-level command modules:

- `chat`  : Interactive chat session
- `ask`   : Single question, single reply
- `auth`  : Store the API key in the system keyring
- `models`: Catalog listing

These handlers are intentionally thin; all chat state lives in
[`crate::session::ChatSession`].
*/

use colored::Colorize;

use crate::config::Config;
use crate::credentials::{
    Credential, CredentialChain, CredentialSource, EnvCredentialSource, KeyringCredentialSource,
};
use crate::error::{ChatRelayError, CompletionError, Result};
use crate::providers::{ModelCatalog, ModelSpec, RequestParameters, StaticCatalog};
use crate::session::{ChatSession, SessionStats};

// Special commands parser for the chat loop
pub mod special_commands;

// Model catalog commands
pub mod models;

/// Credential sources for the configured provider, in lookup order:
/// the configured environment variable, then the keyring
pub fn credential_chain(config: &Config) -> CredentialChain {
    let provider = config.provider.provider_type;
    CredentialChain::new()
        .with(EnvCredentialSource::new(
            config.provider.active_api_key_env(),
        ))
        .with(KeyringCredentialSource::new(
            config.credentials.keyring_service.clone(),
            config.credentials.user_for(provider),
        ))
}

/// Request parameters from configuration
///
/// With no model configured the catalog's first model is used. An explicitly
/// configured model missing from the catalog is used as-is so custom model
/// ids keep working.
///
/// # Errors
///
/// Returns `ChatRelayError::InvalidParameter` if temperature or max_tokens
/// is out of range, or `ChatRelayError::Config` if no model is configured
/// and the catalog is empty
pub fn initial_parameters(config: &Config, catalog: &dyn ModelCatalog) -> Result<RequestParameters> {
    let provider = config.provider.provider_type;
    let model = match config.chat.model.as_deref() {
        Some(id) => catalog.resolve(id).unwrap_or_else(|| {
            tracing::warn!(
                "Model {} is not in the {} catalog; using it as given",
                id,
                provider
            );
            ModelSpec::new(id, id)
        }),
        None => catalog.default_model().ok_or_else(|| {
            ChatRelayError::Config(format!(
                "No model configured and the {} catalog is empty",
                provider
            ))
        })?,
    };
    RequestParameters::new(model, config.chat.temperature, config.chat.max_tokens)
}

/// User-facing text for a failed completion
pub fn describe_completion_error(error: &CompletionError) -> String {
    let hint = match error {
        CompletionError::MissingCredential => {
            " (set the API key environment variable or run `chatrelay auth`)"
        }
        e if e.is_retryable() => " (type /retry to resend)",
        _ => "",
    };
    format!("{}{}", error, hint)
}

/// Render session statistics for display
pub fn format_stats(stats: &SessionStats) -> String {
    let duration = stats.session_duration();
    let models = if stats.models_used().is_empty() {
        "none".to_string()
    } else {
        stats
            .models_used()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    let fastest = stats
        .fastest_response()
        .map(|t| format!("{:.2}s", t))
        .unwrap_or_else(|| "-".to_string());
    let slowest = stats
        .slowest_response()
        .map(|t| format!("{:.2}s", t))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "Messages:          {}\n\
         Tokens:            {}\n\
         Average response:  {:.2}s\n\
         Fastest / slowest: {} / {}\n\
         Models used:       {}\n\
         Session duration:  {}m {}s\n",
        stats.message_count(),
        stats.token_count(),
        stats.average_latency(),
        fastest,
        slowest,
        models,
        duration.num_minutes(),
        duration.num_seconds() % 60
    )
}

// Interactive chat handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Builds a [`ChatSession`] from configuration and runs a readline loop:
    //! `/` lines go to the special command parser, everything else is
    //! submitted to the model.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::export;
    use crate::providers::{self, CompletionClient};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error if the client, parameters or line editor cannot be
    /// initialized. Completion failures are reported inline and do not end
    /// the session.
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let client = providers::create_client(&config)?;
        let catalog = StaticCatalog::for_provider(config.provider.provider_type);
        let params = initial_parameters(&config, &catalog)?;

        let mut rl = DefaultEditor::new()?;

        let mut session = ChatSession::new(params, config.chat.history_window);
        session.set_credential(resolve_credential(&config, &mut rl)?);

        print_welcome_banner(&config, &session);

        loop {
            let prompt = format!("{} ", "you>".cyan().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            let result = session.submit(&client, trimmed).await;
                            print_outcome(result);
                        }
                        command => handle_special_command(&mut session, &client, &catalog, command).await,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    return Err(err.into());
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_special_command(
        session: &mut ChatSession,
        client: &CompletionClient,
        catalog: &StaticCatalog,
        command: SpecialCommand,
    ) {
        match command {
            SpecialCommand::Clear => {
                session.clear_conversation();
                println!("{}\n", "Conversation cleared.".green());
            }
            SpecialCommand::Stats => {
                println!("\n{}\n{}", "Session Statistics".bold(), format_stats(session.stats()));
            }
            SpecialCommand::Reset => {
                session.reset_stats();
                println!("{}\n", "Statistics reset.".green());
            }
            SpecialCommand::ListModels => {
                let current = session.params().model().api_id.clone();
                println!(
                    "\n{}",
                    models::format_models_table(&catalog.list_models(), Some(&current))
                );
            }
            SpecialCommand::SwitchModel(name) => match catalog.resolve(&name) {
                Some(model) => {
                    println!(
                        "{}\n",
                        format!("Switched to {} ({})", model.display_name, model.api_id).green()
                    );
                    session.params_mut().set_model(model);
                }
                None => {
                    let error = ChatRelayError::UnknownModel(name);
                    println!("{} (see /models)\n", error.to_string().red());
                }
            },
            SpecialCommand::SetTemperature(value) => {
                match session.params_mut().set_temperature(value) {
                    Ok(()) => println!("{}\n", format!("Temperature set to {}", value).green()),
                    Err(e) => println!("{}\n", e.to_string().red()),
                }
            }
            SpecialCommand::SetMaxTokens(value) => {
                match session.params_mut().set_max_tokens(value) {
                    Ok(()) => println!("{}\n", format!("Max tokens set to {}", value).green()),
                    Err(e) => println!("{}\n", e.to_string().red()),
                }
            }
            SpecialCommand::Export { format, path } => {
                let path = path.unwrap_or_else(|| export::default_filename(format).into());
                let result = export::render(format, session.conversation(), session.stats())
                    .and_then(|contents| export::write_to(&path, &contents));
                match result {
                    Ok(()) => println!(
                        "{}\n",
                        format!("Exported {} to {}", format, path.display()).green()
                    ),
                    Err(e) => println!("{}\n", format!("Export failed: {}", e).red()),
                }
            }
            SpecialCommand::Retry => match session.resend(client).await {
                Some(result) => print_outcome(result),
                None => println!("{}\n", "Nothing to retry.".yellow()),
            },
            SpecialCommand::Context => match session.context_info() {
                Some(info) => println!(
                    "Context: ~{} of {} tokens ({:.1}%) across the last {} messages\n",
                    info.used_tokens,
                    info.max_tokens,
                    info.percentage_used,
                    session.history_window()
                ),
                None => println!("{}\n", "Context window unknown for this model.".yellow()),
            },
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    fn print_outcome(result: std::result::Result<crate::session::Exchange, CompletionError>) {
        match result {
            Ok(exchange) => {
                println!("{} {}", "assistant>".green().bold(), exchange.reply);
                println!(
                    "{}\n",
                    format!(
                        "[{:.2}s, {} tokens]",
                        exchange.elapsed.as_secs_f64(),
                        exchange.tokens
                    )
                    .dimmed()
                );
            }
            Err(e) => println!("{}\n", describe_completion_error(&e).red()),
        }
    }

    /// Environment, then keyring, then an interactive prompt
    fn resolve_credential(config: &Config, rl: &mut DefaultEditor) -> Result<Option<Credential>> {
        if let Some(credential) = credential_chain(config).get_credential() {
            tracing::debug!("Using stored API key");
            return Ok(Some(credential));
        }

        println!(
            "{}",
            format!(
                "No API key found in ${} or the keyring.",
                config.provider.active_api_key_env()
            )
            .yellow()
        );
        match rl.readline("API key (input is visible, leave empty to skip): ") {
            Ok(line) => Ok(Some(Credential::new(line)).filter(|c| !c.is_empty())),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn print_welcome_banner(config: &Config, session: &ChatSession) {
        let model = session.params().model();
        println!();
        println!("{}", "chatrelay interactive chat".bold());
        println!("Provider: {}", config.provider.provider_type.to_string().cyan());
        println!(
            "Model:    {} ({})",
            model.display_name.cyan(),
            model.api_id
        );
        if !session.has_credential() {
            println!(
                "{}",
                "No API key set; messages will fail until one is provided.".yellow()
            );
        }
        println!("Type /help for commands, /exit to quit.\n");
    }
}

// One-shot question handler
pub mod ask {
    //! Sends a single message and prints the reply.

    use super::*;
    use crate::providers;

    /// Ask one question
    ///
    /// # Errors
    ///
    /// Returns error if no credential is available or the completion fails
    pub async fn run_ask(config: Config, prompt: String) -> Result<()> {
        let client = providers::create_client(&config)?;
        let catalog = StaticCatalog::for_provider(config.provider.provider_type);
        let params = initial_parameters(&config, &catalog)?;

        let mut session = ChatSession::new(params, config.chat.history_window);
        session.set_credential(credential_chain(&config).get_credential());

        let exchange = session.submit(&client, prompt).await.map_err(|e| {
            tracing::error!("Completion failed: {}", e);
            ChatRelayError::Completion(e)
        })?;
        println!("{}", exchange.reply);
        Ok(())
    }
}

// Keyring credential handler
pub mod auth {
    //! Stores or removes the provider API key in the system keyring.

    use super::*;
    use rustyline::DefaultEditor;

    /// Prompt for an API key and store it, or clear the stored key
    ///
    /// # Errors
    ///
    /// Returns error if the key is empty or the keyring is unavailable
    pub fn authenticate(config: Config, clear: bool) -> Result<()> {
        let provider = config.provider.provider_type;
        let source = KeyringCredentialSource::new(
            config.credentials.keyring_service.clone(),
            config.credentials.user_for(provider),
        );

        if clear {
            source.clear();
            println!("Removed stored {} API key.", provider);
            return Ok(());
        }

        let mut rl = DefaultEditor::new()?;
        let line = rl.readline(&format!("{} API key: ", provider))?;
        let credential = Credential::new(line);
        if credential.is_empty() {
            return Err(ChatRelayError::Config("API key cannot be empty".to_string()).into());
        }

        source.store(&credential)?;
        println!("{}", format!("Stored {} API key in the keyring.", provider).green());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderKind, TokenUsage};

    #[test]
    fn test_initial_parameters_from_catalog() {
        let config = Config::default();
        let params = initial_parameters(&config, &StaticCatalog::openrouter()).unwrap();
        assert_eq!(params.model().display_name, "GPT-3.5 Turbo");
        assert_eq!(params.temperature(), 0.7);
        assert_eq!(params.max_tokens(), 1000);
    }

    #[test]
    fn test_initial_parameters_custom_model() {
        let mut config = Config::default();
        config.chat.model = Some("vendor/custom-model".to_string());
        let params = initial_parameters(&config, &StaticCatalog::openrouter()).unwrap();
        assert_eq!(params.model().api_id, "vendor/custom-model");
        assert!(params.model().context_window.is_none());
    }

    #[test]
    fn test_initial_parameters_groq_without_model_uses_groq_default() {
        let mut config = Config::default();
        config.provider.provider_type = ProviderKind::Groq;
        config.validate().unwrap();

        let catalog = StaticCatalog::for_provider(ProviderKind::Groq);
        let params = initial_parameters(&config, &catalog).unwrap();
        assert_eq!(params.model().api_id, "llama-3.3-70b-versatile");
        assert!(catalog.find(&params.model().api_id).is_some());
    }

    #[test]
    fn test_initial_parameters_empty_catalog_without_model_is_error() {
        let config = Config::default();
        let err = initial_parameters(&config, &StaticCatalog::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatRelayError>(),
            Some(ChatRelayError::Config(_))
        ));
    }

    #[test]
    fn test_initial_parameters_rejects_bad_temperature() {
        let mut config = Config::default();
        config.chat.temperature = 3.0;
        assert!(initial_parameters(&config, &StaticCatalog::openrouter()).is_err());
    }

    #[test]
    fn test_describe_completion_error_hints() {
        assert!(describe_completion_error(&CompletionError::Timeout).contains("/retry"));
        assert!(describe_completion_error(&CompletionError::MissingCredential)
            .contains("chatrelay auth"));
        let bad_request = CompletionError::ApiError {
            status: 400,
            message: "bad".to_string(),
        };
        assert!(!describe_completion_error(&bad_request).contains("/retry"));
    }

    #[test]
    fn test_format_stats() {
        let mut stats = SessionStats::new();
        assert!(format_stats(&stats).contains("Models used:       none"));

        stats.record_exchange("q", "a", 1.0, "openai/gpt-4", Some(TokenUsage::new(7, 3)));
        stats.record_exchange("q", "a", 3.0, "openai/gpt-4", Some(TokenUsage::new(7, 3)));
        let text = format_stats(&stats);
        assert!(text.contains("Messages:          4"));
        assert!(text.contains("Tokens:            20"));
        assert!(text.contains("Average response:  2.00s"));
        assert!(text.contains("1.00s / 3.00s"));
        assert!(text.contains("openai/gpt-4"));
    }
}
