//! Special commands parser for interactive chat mode
//!
//! This module parses the special commands that can be entered during an
//! interactive chat session. Special commands allow users to:
//! - Clear the conversation or reset statistics
//! - Switch model or adjust temperature and token limit
//! - View statistics, the model catalog and context usage
//! - Export the conversation
//! - Exit the session
//!
//! Commands are prefixed with `/`; the command word is case-insensitive,
//! arguments (model ids, paths) are kept as typed.

use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportFormat;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands modify the session state or provide information,
/// rather than being sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCommand {
    /// Remove all messages from the conversation
    Clear,
    /// Show session statistics
    Stats,
    /// Zero the session statistics
    Reset,
    /// Switch to the model with this API id or display name
    SwitchModel(String),
    /// List the model catalog
    ListModels,
    /// Change the sampling temperature
    SetTemperature(f32),
    /// Change the completion token limit
    SetMaxTokens(u32),
    /// Export the conversation; a default file name is used without a path
    Export {
        format: ExportFormat,
        path: Option<PathBuf>,
    },
    /// Resend the last unanswered message
    Retry,
    /// Show estimated context window usage
    Context,
    /// Display help information
    Help,
    /// Exit the interactive session
    Exit,
    /// Not a special command; send to the model
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use chatrelay::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/model openai/gpt-4").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchModel("openai/gpt-4".to_string()));
///
/// let cmd = parse_special_command("/temperature 0.5").unwrap();
/// assert_eq!(cmd, SpecialCommand::SetTemperature(0.5));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // Bare exit/quit are accepted without the slash
    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(SpecialCommand::Exit),
            _ => Ok(SpecialCommand::None),
        };
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/clear" => Ok(SpecialCommand::Clear),
        "/stats" => Ok(SpecialCommand::Stats),
        "/reset" => Ok(SpecialCommand::Reset),
        "/models" => Ok(SpecialCommand::ListModels),
        "/retry" => Ok(SpecialCommand::Retry),
        "/context" => Ok(SpecialCommand::Context),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        "/model" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/model".to_string(),
                    usage: "/model <model_id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::SwitchModel(rest.to_string()))
            }
        }

        "/temperature" | "/temp" => {
            let value = required_arg("/temperature", "/temperature <0.0-2.0>", rest)?;
            value
                .parse::<f32>()
                .map(SpecialCommand::SetTemperature)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/temperature".to_string(),
                    arg: value.to_string(),
                })
        }

        "/max-tokens" | "/max_tokens" => {
            let value = required_arg("/max-tokens", "/max-tokens <100-8000>", rest)?;
            value
                .parse::<u32>()
                .map(SpecialCommand::SetMaxTokens)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/max-tokens".to_string(),
                    arg: value.to_string(),
                })
        }

        "/export" => {
            let usage = "/export <json|text> [path]";
            let rest = required_arg("/export", usage, rest)?;
            let (format, path) = match rest.split_once(char::is_whitespace) {
                Some((format, path)) => (format, Some(PathBuf::from(path.trim()))),
                None => (rest, None),
            };
            let format = format
                .parse::<ExportFormat>()
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/export".to_string(),
                    arg: format.to_string(),
                })?;
            Ok(SpecialCommand::Export { format, path })
        }

        // Unknown command starting with "/"
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn required_arg<'a>(command: &str, usage: &str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest)
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATION:
  /clear                  - Remove all messages (stats are kept)
  /retry                  - Resend the last message if it got no reply
  /export json [path]     - Save conversation and stats as JSON
  /export text [path]     - Save a plain-text transcript

MODEL AND PARAMETERS:
  /models                 - List models for the current provider
  /model <id|name>        - Switch to a different model
  /temperature <0.0-2.0>  - Set sampling temperature
  /max-tokens <100-8000>  - Set completion token limit

SESSION INFORMATION:
  /stats                  - Show session statistics
  /reset                  - Reset session statistics
  /context                - Show estimated context window usage
  /help                   - Show this help message

SESSION CONTROL:
  /exit, exit, quit       - Exit interactive mode

NOTES:
  - Commands are case-insensitive; arguments are not
  - Regular text (not starting with /) is sent to the model
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_none() {
        assert_eq!(
            parse_special_command("tell me a story").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("  exit strategy?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::Clear);
        assert_eq!(parse_special_command("/stats").unwrap(), SpecialCommand::Stats);
        assert_eq!(parse_special_command("/reset").unwrap(), SpecialCommand::Reset);
        assert_eq!(
            parse_special_command("/models").unwrap(),
            SpecialCommand::ListModels
        );
        assert_eq!(parse_special_command("/retry").unwrap(), SpecialCommand::Retry);
        assert_eq!(
            parse_special_command("/context").unwrap(),
            SpecialCommand::Context
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_commands_case_insensitive() {
        assert_eq!(parse_special_command("/CLEAR").unwrap(), SpecialCommand::Clear);
        assert_eq!(parse_special_command("/Help").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_exit_variants() {
        for input in ["exit", "QUIT", "/exit", "/quit"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_parse_model_keeps_argument_case() {
        assert_eq!(
            parse_special_command("/MODEL Claude 3 Haiku").unwrap(),
            SpecialCommand::SwitchModel("Claude 3 Haiku".to_string())
        );
    }

    #[test]
    fn test_parse_model_missing_argument() {
        assert!(matches!(
            parse_special_command("/model"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_temperature() {
        assert_eq!(
            parse_special_command("/temperature 1.5").unwrap(),
            SpecialCommand::SetTemperature(1.5)
        );
        assert!(matches!(
            parse_special_command("/temperature hot"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
        assert!(matches!(
            parse_special_command("/temperature"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_max_tokens() {
        assert_eq!(
            parse_special_command("/max-tokens 2000").unwrap(),
            SpecialCommand::SetMaxTokens(2000)
        );
        assert!(parse_special_command("/max-tokens -5").is_err());
    }

    #[test]
    fn test_parse_export() {
        assert_eq!(
            parse_special_command("/export json out/My Chat.json").unwrap(),
            SpecialCommand::Export {
                format: ExportFormat::Json,
                path: Some(PathBuf::from("out/My Chat.json")),
            }
        );
        assert_eq!(
            parse_special_command("/export text").unwrap(),
            SpecialCommand::Export {
                format: ExportFormat::Text,
                path: None,
            }
        );
        assert!(matches!(
            parse_special_command("/export csv a.csv"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
        assert!(matches!(
            parse_special_command("/export"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_special_command("/foo bar"),
            Err(CommandError::UnknownCommand("/foo".to_string()))
        );
    }
}
