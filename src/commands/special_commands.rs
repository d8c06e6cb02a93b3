//! Special commands parser for the interactive build session
//!
//! This module parses commands that act on the session instead of being
//! sent to the generator. Special commands allow users to:
//! - Show, copy or save the generated source
//! - Open the preview and change how it is shown
//! - View the conversation and session status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use crate::preview::{ViewMode, Viewport};
use std::path::PathBuf;
use thiserror::Error;

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

/// Special commands that can be executed during a build session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Print the formatted source of the current document
    ShowSource,

    /// Copy the formatted source to the system clipboard
    CopySource,

    /// Write the raw document to `index.html` in a directory
    ///
    /// `None` means the current directory.
    Save(Option<PathBuf>),

    /// Open the preview page in a browser
    Open,

    /// Change the preview viewport
    SetViewport(Viewport),

    /// Change the preview mode
    SetView(ViewMode),

    /// Print the conversation so far
    History,

    /// Display session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the session
    Exit,

    /// Not a special command
    ///
    /// The input should be submitted to the builder.
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for non-commands.
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
/// use sitewright::commands::special_commands::{parse_special_command, SpecialCommand};
/// use sitewright::preview::Viewport;
///
/// let cmd = parse_special_command("/viewport mobile").unwrap();
/// assert_eq!(cmd, SpecialCommand::SetViewport(Viewport::Mobile));
///
/// let cmd = parse_special_command("make the header sticky").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/source" | "/code" => Ok(SpecialCommand::ShowSource),
        "/copy" => Ok(SpecialCommand::CopySource),

        "/save" | "/export" => Ok(SpecialCommand::Save(None)),
        // The directory keeps its original case
        input if input.starts_with("/save ") || input.starts_with("/export ") => {
            let dir = trimmed
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default();
            Ok(SpecialCommand::Save(Some(PathBuf::from(dir))))
        }

        "/open" => Ok(SpecialCommand::Open),

        "/viewport" => Err(CommandError::MissingArgument {
            command: "/viewport".to_string(),
            usage: "/viewport <full|tablet|mobile>".to_string(),
        }),
        input if input.starts_with("/viewport ") => {
            let arg = input[10..].trim();
            Viewport::parse_str(arg)
                .map(SpecialCommand::SetViewport)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/viewport".to_string(),
                    arg: arg.to_string(),
                })
        }
        "/desktop" => Ok(SpecialCommand::SetViewport(Viewport::Full)),
        "/tablet" => Ok(SpecialCommand::SetViewport(Viewport::Tablet)),
        "/mobile" => Ok(SpecialCommand::SetViewport(Viewport::Mobile)),

        "/view" => Err(CommandError::MissingArgument {
            command: "/view".to_string(),
            usage: "/view <rendered|source>".to_string(),
        }),
        input if input.starts_with("/view ") => {
            let arg = input[6..].trim();
            ViewMode::parse_str(arg)
                .map(SpecialCommand::SetView)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/view".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/history" => Ok(SpecialCommand::History),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        // Exit commands
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        // Unknown command starting with "/"
        input if input.starts_with('/') => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }

        // Not a special command
        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Build Sessions
===================================

SOURCE:
  /source         - Print the formatted source of the current document
  /code           - Same as /source
  /copy           - Copy the formatted source to the clipboard
  /save [dir]     - Write index.html to dir (default: current directory)
  /export [dir]   - Same as /save

PREVIEW:
  /open           - Open the preview page in your browser
  /view rendered  - Show the running page by default
  /view source    - Show the formatted source by default
  /viewport full  - Render at full width (also /desktop)
  /viewport tablet - Render at 768px (also /tablet)
  /viewport mobile - Render at 375px (also /mobile)

SESSION:
  /history        - Show the conversation so far
  /status         - Show model, phase, document size and preview URL
  /help           - Show this help message
  exit, quit      - End the session

Anything else is sent to the builder as a request, for example:
  make the buttons rounded and add a dark mode toggle

Press CTRL-C while a generation is running to cancel it.
"#
    );
}
