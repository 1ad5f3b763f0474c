//! Command-line interface definition for chatrelay
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions,
//! credential storage, and model listing.

use clap::{Parser, Subcommand};

/// chatrelay - chat with hosted models through OpenRouter or Groq
///
/// Keeps a running conversation, sends a bounded window of it with each
/// request, and reports session statistics.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chatrelay
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the provider from config (openrouter, groq)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override the model from config (API id)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// Message to send
        prompt: String,

        /// Override the provider from config (openrouter, groq)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override the model from config (API id)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Store or remove the API key in the system keyring
    Auth {
        /// Provider whose key is stored (openrouter, groq)
        ///
        /// Use `--provider <name>` to override; if omitted the configured
        /// provider is used.
        #[arg(short, long)]
        provider: Option<String>,

        /// Remove the stored key instead of saving one
        #[arg(long)]
        clear: bool,
    },

    /// Inspect the model catalog
    Models {
        /// Model subcommand
        #[command(subcommand)]
        command: ModelCommand,
    },
}

/// Model catalog subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List available models
    List {
        /// Provider catalog to list (openrouter, groq)
        #[arg(short, long)]
        provider: Option<String>,

        /// Output as pretty-printed JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show details of one model
    Info {
        /// Model API id or display name
        #[arg(short, long)]
        model: String,

        /// Provider catalog to search (openrouter, groq)
        #[arg(short, long)]
        provider: Option<String>,

        /// Output as pretty-printed JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configured model
    Current {
        /// Provider to report on (openrouter, groq)
        #[arg(short, long)]
        provider: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Provider override given to the active subcommand, if any
    pub fn provider_override(&self) -> Option<&str> {
        match &self.command {
            Commands::Chat { provider, .. }
            | Commands::Ask { provider, .. }
            | Commands::Auth { provider, .. } => provider.as_deref(),
            Commands::Models { command } => match command {
                ModelCommand::List { provider, .. }
                | ModelCommand::Info { provider, .. }
                | ModelCommand::Current { provider } => provider.as_deref(),
            },
        }
    }

    /// Model override given to the active subcommand, if any
    pub fn model_override(&self) -> Option<&str> {
        match &self.command {
            Commands::Chat { model, .. } | Commands::Ask { model, .. } => model.as_deref(),
            _ => None,
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Chat {
                provider: None,
                model: None,
            },
        }
    }
}
