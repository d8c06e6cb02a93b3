//! Session state for one build
//!
//! - `conversation`: the append-only turn log
//! - `document`: the current generated HTML and its export
//! - `builder`: the state machine that owns both

pub mod builder;
pub mod conversation;
pub mod document;

pub use builder::{BuilderFlow, Phase, SessionSnapshot, SubmitOutcome, GENERATION_ERROR_MESSAGE};
pub use conversation::{Conversation, Role, Turn, TurnIdGenerator};
pub use document::GeneratedDocument;
