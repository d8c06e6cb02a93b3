//! Request text for one generation
//!
//! The service gets no structured chat history. Short-term memory is a
//! compact transcript of the most recent turns, prepended to the request.

use crate::session::conversation::Turn;

/// Number of prior turns included when no other window is configured
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Builds the user-content text for one generation request
///
/// # Arguments
///
/// * `prompt` - What the user just asked for
/// * `history` - Turns before this request, oldest first
/// * `current_document` - Markup to update; `None` or empty means start from scratch
/// * `history_window` - How many of the most recent `history` turns to include
///
/// # Examples
///
/// ```
/// use sitewright::prompts::build_request_prompt;
///
/// let text = build_request_prompt("a red button", &[], None, 6);
/// assert!(text.starts_with("User Request: a red button"));
/// assert!(text.contains("Create a new single-file HTML application"));
/// ```
pub fn build_request_prompt(
    prompt: &str,
    history: &[Turn],
    current_document: Option<&str>,
    history_window: usize,
) -> String {
    let mut text = format!("User Request: {}\n", prompt);

    match current_document.filter(|doc| !doc.is_empty()) {
        Some(document) => {
            text.push_str(&format!(
                "\nCurrent Code Context:\n```html\n{}\n```\n",
                document
            ));
            text.push_str(
                "\nTask: Update the code above based on the user request. Return the full valid HTML.",
            );
        }
        None => {
            text.push_str(
                "\nTask: Create a new single-file HTML application based on the user request.",
            );
        }
    }

    if !history.is_empty() {
        let transcript = render_transcript(history, history_window);
        if !transcript.is_empty() {
            text = format!("Conversation History:\n{}\n\n{}", transcript, text);
        }
    }

    text
}

/// `ROLE: content` lines for the last `window` turns, oldest first
pub fn render_transcript(history: &[Turn], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str().to_uppercase(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}
