//! Conversation export
//!
//! Two formats are supported:
//!
//! - JSON: `{ "timestamp", "stats", "messages" }`, readable back with
//!   [`from_json`]
//! - plain-text transcript: one `"<Label>:\n<content>\n\n"` block per message
//!
//! Neither format ever contains the session credential.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatRelayError, Result};
use crate::providers::Message;
use crate::session::{ConversationStore, SessionStats};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Structured JSON document
    Json,
    /// Plain-text transcript
    Text,
}

impl ExportFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ChatRelayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(ChatRelayError::Export(format!(
                "unknown export format '{}', expected json or text",
                other
            ))),
        }
    }
}

/// JSON export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// When the export was produced
    pub timestamp: DateTime<Utc>,
    /// Session statistics at export time
    pub stats: SessionStats,
    /// Full conversation, oldest first
    pub messages: Vec<Message>,
}

impl ExportDocument {
    /// Rebuild a conversation store from the exported messages
    pub fn into_conversation(self) -> ConversationStore {
        ConversationStore::from_messages(self.messages)
    }
}

/// Serialize the conversation and stats as pretty-printed JSON
///
/// # Errors
///
/// Returns error if serialization fails
///
/// # Examples
///
/// ```
/// use chatrelay::export;
/// use chatrelay::session::{ConversationStore, SessionStats};
///
/// let mut conversation = ConversationStore::new();
/// conversation.push_user("Hello");
/// let json = export::to_json(&conversation, &SessionStats::new()).unwrap();
/// assert!(json.contains("\"messages\""));
/// assert!(json.contains("\"timestamp\""));
/// ```
pub fn to_json(conversation: &ConversationStore, stats: &SessionStats) -> Result<String> {
    let document = ExportDocument {
        timestamp: Utc::now(),
        stats: stats.clone(),
        messages: conversation.messages().to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse a JSON export
///
/// # Errors
///
/// Returns [`ChatRelayError::Export`] if the document is not a valid export
pub fn from_json(json: &str) -> Result<ExportDocument> {
    serde_json::from_str(json).map_err(|e| {
        tracing::error!("Failed to parse conversation export: {}", e);
        ChatRelayError::Export(format!("invalid export document: {}", e)).into()
    })
}

/// Render the conversation as a plain-text transcript
///
/// # Examples
///
/// ```
/// use chatrelay::export;
/// use chatrelay::session::ConversationStore;
///
/// let mut conversation = ConversationStore::new();
/// conversation.push_user("Hi");
/// conversation.push_assistant("Hello!");
/// assert_eq!(
///     export::to_transcript(&conversation),
///     "User:\nHi\n\nAssistant:\nHello!\n\n"
/// );
/// ```
pub fn to_transcript(conversation: &ConversationStore) -> String {
    conversation
        .messages()
        .iter()
        .map(|m| format!("{}:\n{}\n\n", m.role.label(), m.content))
        .collect()
}

/// Render in `format`
///
/// # Errors
///
/// Returns error if JSON serialization fails
pub fn render(
    format: ExportFormat,
    conversation: &ConversationStore,
    stats: &SessionStats,
) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(conversation, stats),
        ExportFormat::Text => Ok(to_transcript(conversation)),
    }
}

/// Write rendered export contents to `path`, creating parent directories
///
/// # Errors
///
/// Returns error if the directory or file cannot be written
pub fn write_to(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).map_err(|e| {
        tracing::error!("Failed to write export to {}: {}", path.display(), e);
        ChatRelayError::Io(e)
    })?;
    tracing::info!("Exported {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Default export file name, e.g. `chat_export_20240101_120000.json`
pub fn default_filename(format: ExportFormat) -> String {
    format!(
        "chat_export_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
