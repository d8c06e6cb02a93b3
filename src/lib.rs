//! Sitewright - conversational website builder library
//!
//! This library provides the core functionality for Sitewright: a builder
//! flow that turns natural-language requests into complete single-file
//! HTML documents through a generation service, and a local preview
//! surface that shows the result.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Conversation state, the generated document, and the builder flow
//! - `providers`: Code generator abstraction and the Gemini implementation
//! - `prompts`: System instruction, response schema and request text
//! - `formatter`: HTML pretty-printer for the source view
//! - `preview`: View state, preview pages and the preview server
//! - `commands`: CLI command handlers and the interactive session
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitewright::{create_generator, BuilderFlow, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let generator = Arc::from(create_generator(&config)?);
//!     let flow = BuilderFlow::from_config(generator, &config.builder);
//!     flow.submit("a landing page for a coffee shop").await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatter;
pub mod preview;
pub mod prompts;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{FailureKind, Result, SitewrightError};
pub use formatter::{display_source, format_html, FormatError};
pub use providers::{create_generator, CodeGenerator, GenerationResult};
pub use session::{BuilderFlow, SessionSnapshot, SubmitOutcome};

#[cfg(test)]
pub mod test_utils;
