//! chatrelay - conversational chat sessions over OpenAI-compatible endpoints
//!
//! This library keeps a per-user conversation, sends a bounded window of it
//! to a hosted chat-completions endpoint (OpenRouter or Groq), and tracks
//! session statistics.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Conversation storage, statistics, and the `ChatSession` that ties them together
//! - `providers`: Request types, the completion client, endpoint presets, and model catalogs
//! - `transport`: The HTTP seam the completion client sends through
//! - `credentials`: Bearer token handling and lookup (environment, keyring)
//! - `export`: JSON and plain-text conversation export
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use chatrelay::credentials::Credential;
//! use chatrelay::providers::{self, ModelCatalog, RequestParameters, StaticCatalog};
//! use chatrelay::session::ChatSession;
//! use chatrelay::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let client = providers::create_client(&config)?;
//!     let model = StaticCatalog::openrouter().default_model().unwrap();
//!     let mut session = ChatSession::new(RequestParameters::with_defaults(model), 20)
//!         .with_credential(Credential::new(std::env::var("OPENROUTER_API_KEY")?));
//!
//!     let exchange = session.submit(&client, "Hello!").await?;
//!     println!("{}", exchange.reply);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod providers;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use credentials::Credential;
pub use error::{ChatRelayError, CompletionError, Result};
pub use providers::{CompletionClient, Message, RequestParameters, Role};
pub use session::{ChatSession, ConversationStore, SessionStats};
