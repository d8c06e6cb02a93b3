//! Provider module for Sitewright
//!
//! This module contains the code generator abstraction and its Gemini
//! implementation.

pub mod base;
pub mod gemini;

pub use base::{CodeGenerator, GenerationResult, StructuredReply};
pub use gemini::GeminiProvider;

use crate::config::Config;
use crate::error::Result;

/// Create a code generator based on configuration
///
/// # Arguments
///
/// * `config` - Full configuration; the provider section selects the backend
///   and the builder section sets the history window
///
/// # Returns
///
/// Returns a boxed generator instance
///
/// # Errors
///
/// Returns error if the provider type is unknown, credentials are missing,
/// or initialization fails
pub fn create_generator(config: &Config) -> Result<Box<dyn CodeGenerator>> {
    match config.provider.provider_type.as_str() {
        "gemini" => Ok(Box::new(
            GeminiProvider::new(config.provider.gemini.clone())?
                .with_history_window(config.builder.history_window),
        )),
        other => Err(crate::error::SitewrightError::Provider(format!(
            "Unknown provider type: {}",
            other
        ))
        .into()),
    }
}
