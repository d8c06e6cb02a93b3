//! Prompts sent to the generation service
//!
//! This module provides the fixed system instruction, the structured-output
//! schema, and the per-request text that carries the user's request,
//! recent conversation, and the current document.

pub mod request_prompt;
pub mod system_instruction;

pub use request_prompt::{build_request_prompt, render_transcript, DEFAULT_HISTORY_WINDOW};
pub use system_instruction::{response_schema, SYSTEM_INSTRUCTION};
