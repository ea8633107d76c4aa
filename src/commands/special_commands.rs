//! Special commands parser for interactive chat mode
//!
//! Special commands are prefixed with `/` and are handled locally instead of
//! being sent to the model. Command names are case-insensitive; arguments
//! keep their case. Input that starts with `/` but names no command is an
//! ordinary prompt, and a leading `\` sends the rest of the line verbatim
//! (`\exit`, `\/help`).

use colored::Colorize;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command does not take an argument
    #[error("Command {command} does not take an argument: {arg}")]
    UnexpectedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Set the API key for the rest of the session
    SetKey(String),

    /// Show model, key presence, message count and state
    ShowStatus,

    /// Redraw the whole conversation
    History,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Escaped input; send this text to the model as typed
    Send(String),

    /// Not a special command; send the input to the model
    None,
}

impl std::fmt::Debug for SpecialCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetKey(_) => f.write_str("SetKey([REDACTED])"),
            Self::ShowStatus => f.write_str("ShowStatus"),
            Self::History => f.write_str("History"),
            Self::Help => f.write_str("Help"),
            Self::Exit => f.write_str("Exit"),
            Self::Send(text) => f.debug_tuple("Send").field(text).finish(),
            Self::None => f.write_str("None"),
        }
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError` when the input starts with `/` but is not a valid
/// command invocation.
///
/// # Examples
///
/// ```
/// use chatty::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
/// assert_eq!(
///     parse_special_command("/key AbC123").unwrap(),
///     SpecialCommand::SetKey("AbC123".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert_eq!(parse_special_command("/etc/hosts?").unwrap(), SpecialCommand::None);
/// assert_eq!(
///     parse_special_command("\\exit").unwrap(),
///     SpecialCommand::Send("exit".to_string())
/// );
/// assert!(parse_special_command("/key").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if let Some(escaped) = trimmed.strip_prefix('\\') {
        return Ok(SpecialCommand::Send(escaped.to_string()));
    }
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    let no_arg = |command: SpecialCommand| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnexpectedArgument {
                command: name.clone(),
                arg: arg.to_string(),
            })
        }
    };

    match name.as_str() {
        "/key" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/key".to_string(),
                    usage: "/key <api-key>".to_string(),
                })
            } else {
                Ok(SpecialCommand::SetKey(arg.to_string()))
            }
        }
        "/status" => no_arg(SpecialCommand::ShowStatus),
        "/history" => no_arg(SpecialCommand::History),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "/exit" | "/quit" => no_arg(SpecialCommand::Exit),
        _ => Ok(SpecialCommand::None),
    }
}

/// Print the special command reference
pub fn print_help() {
    println!("{}", "Commands".bold());
    println!("  /key <api-key>  Set the Gemini API key for this session");
    println!("  /status         Show model, key and conversation status");
    println!("  /history        Show the whole conversation");
    println!("  /help           Show this help");
    println!("  exit, quit      Leave the session");
    println!("  \\<text>         Send <text> as typed (e.g. \\exit, \\/help)");
    println!();
    println!(
        "{}",
        "Each message is sent on its own; earlier turns are not replayed to the model.".dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("What is Rust?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit", "  exit  "] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_key_preserves_argument_case() {
        assert_eq!(
            parse_special_command("/KEY  AIzaSyMixedCase ").unwrap(),
            SpecialCommand::SetKey("AIzaSyMixedCase".to_string())
        );
    }

    #[test]
    fn test_key_requires_argument() {
        assert!(matches!(
            parse_special_command("/key"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_status_history_help() {
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(
            parse_special_command("/History").unwrap(),
            SpecialCommand::History
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_unexpected_argument() {
        assert!(matches!(
            parse_special_command("/status now"),
            Err(CommandError::UnexpectedArgument { .. })
        ));
    }

    #[test]
    fn test_unrecognized_slash_input_is_a_prompt() {
        for input in ["/foo", "/etc/hosts format?", "/usr/bin/env python"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::None);
        }
    }

    #[test]
    fn test_backslash_escapes_commands() {
        assert_eq!(
            parse_special_command("\\exit").unwrap(),
            SpecialCommand::Send("exit".to_string())
        );
        assert_eq!(
            parse_special_command("  \\/help me ").unwrap(),
            SpecialCommand::Send("/help me".to_string())
        );
        assert_eq!(
            parse_special_command("\\").unwrap(),
            SpecialCommand::Send(String::new())
        );
    }

    #[test]
    fn test_set_key_debug_is_redacted() {
        let debug = format!("{:?}", SpecialCommand::SetKey("secret".to_string()));
        assert!(!debug.contains("secret"));
    }
}
