//! chatrelay - chat with hosted models from the terminal
//!
#![doc = "chatrelay - chat with hosted models from the terminal"]
#![doc = "Main entry point for the chatrelay application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatrelay::cli::{Cli, Commands, ModelCommand};
use chatrelay::commands;
use chatrelay::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);
    chatrelay::session::stats::init_metrics_exporter();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat { .. } => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { prompt, .. } => {
            tracing::info!("Sending single prompt");
            commands::ask::run_ask(config, prompt).await?;
            Ok(())
        }
        Commands::Auth { clear, .. } => {
            tracing::info!(
                "Starting authentication for provider: {}",
                config.provider.provider_type
            );
            commands::auth::authenticate(config, clear)?;
            Ok(())
        }
        Commands::Models { command } => match command {
            ModelCommand::List { json, .. } => commands::models::list_models(&config, json),
            ModelCommand::Info { model, json, .. } => {
                commands::models::show_model_info(&config, &model, json)
            }
            ModelCommand::Current { .. } => commands::models::show_current_model(&config),
        },
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins; otherwise `--verbose` raises the crate level to debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "chatrelay=debug" } else { "chatrelay=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
