//! Entry prompt: the first request of a build session
//!
//! Shown when `build` is started without a prompt. The user types an idea
//! or picks one of the suggestions by number; that text seeds the session.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::Result;

/// Ideas offered on the entry prompt
pub const SUGGESTIONS: [&str; 4] = [
    "A minimal personal portfolio with dark mode",
    "A pomodoro timer with sound alerts",
    "A currency converter dashboard",
    "A landing page for a coffee shop",
];

/// Shown while the conversation has no turns
pub const EMPTY_CONVERSATION_HINT: &str = "Start by describing the website you want to build.";

/// What the user chose on the entry prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryChoice {
    /// Seed the session with this request
    Prompt(String),
    /// Leave without building
    Exit,
    /// Nothing usable was typed; ask again
    Retry,
}

/// Interpret one line typed on the entry prompt
///
/// A number from 1 to 4 selects the matching suggestion. Any other
/// non-blank text is used as the request itself.
///
/// # Examples
///
/// ```
/// use sitewright::commands::entry::{resolve_entry_input, EntryChoice, SUGGESTIONS};
///
/// assert_eq!(resolve_entry_input("2"), EntryChoice::Prompt(SUGGESTIONS[1].to_string()));
/// assert_eq!(resolve_entry_input("   "), EntryChoice::Retry);
/// ```
pub fn resolve_entry_input(input: &str) -> EntryChoice {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return EntryChoice::Retry;
    }

    let lower = trimmed.to_lowercase();
    if matches!(lower.as_str(), "exit" | "quit" | "/exit" | "/quit") {
        return EntryChoice::Exit;
    }

    if let Ok(index) = trimmed.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| SUGGESTIONS.get(i)) {
            Some(suggestion) => EntryChoice::Prompt(suggestion.to_string()),
            None => EntryChoice::Retry,
        };
    }

    EntryChoice::Prompt(input.to_string())
}

/// Print the entry screen
pub fn print_entry_screen() {
    println!("{}", "What do you want to build?".bold());
    println!("{}\n", EMPTY_CONVERSATION_HINT.dimmed());
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).cyan(), suggestion);
    }
    println!();
}

/// Ask for the first request until one is given
///
/// # Returns
///
/// Returns `None` when the user leaves instead (exit, CTRL-C, CTRL-D)
///
/// # Errors
///
/// Returns error if the terminal cannot be read
pub fn read_initial_prompt(rl: &mut DefaultEditor) -> Result<Option<String>> {
    print_entry_screen();

    loop {
        match rl.readline(&format!("{} ", "idea>".green().bold())) {
            Ok(line) => match resolve_entry_input(&line) {
                EntryChoice::Prompt(prompt) => {
                    rl.add_history_entry(line.trim())?;
                    return Ok(Some(prompt));
                }
                EntryChoice::Exit => return Ok(None),
                EntryChoice::Retry => {
                    println!(
                        "{}",
                        format!(
                            "Describe your site, or pick a suggestion from 1 to {}.",
                            SUGGESTIONS.len()
                        )
                        .yellow()
                    );
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}
