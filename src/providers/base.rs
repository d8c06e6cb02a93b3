//! Base generator trait and common types for Sitewright
//!
//! This module defines the `CodeGenerator` trait that every generation
//! backend implements, and the `GenerationResult` it produces.

use crate::error::Result;
use crate::session::conversation::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of one successful generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Short natural-language description of what was built or changed
    pub summary: String,
    /// Complete HTML document, returned unmodified
    pub html: String,
}

impl GenerationResult {
    /// Create a new result
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewright::providers::GenerationResult;
    ///
    /// let result = GenerationResult::new("Added a red button.", "<html></html>");
    /// assert_eq!(result.summary, "Added a red button.");
    /// ```
    pub fn new(summary: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            html: html.into(),
        }
    }
}

/// The reply shape demanded from the service: `{ "message": ..., "html": ... }`
///
/// Both fields are required; serde rejects a payload missing either.
#[derive(Debug, Clone, Deserialize)]
pub struct StructuredReply {
    /// Summary text
    pub message: String,
    /// Document text
    pub html: String,
}

impl From<StructuredReply> for GenerationResult {
    fn from(reply: StructuredReply) -> Self {
        Self {
            summary: reply.message,
            html: reply.html,
        }
    }
}

/// Capability interface over the external generation service
///
/// One call is exactly one round trip: no streaming, no retry, no caching.
/// Implementations return typed failures (`SitewrightError::EmptyResponse`,
/// `MalformedResponse`, `Transport`, `Authentication`) wrapped in
/// `anyhow::Error` so callers can classify them with
/// [`crate::error::FailureKind::classify`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use sitewright::providers::{CodeGenerator, GenerationResult};
/// use sitewright::session::conversation::Turn;
/// use sitewright::error::Result;
///
/// struct Canned;
///
/// #[async_trait]
/// impl CodeGenerator for Canned {
///     async fn generate(
///         &self,
///         prompt: &str,
///         _history: &[Turn],
///         _current_document: Option<&str>,
///     ) -> Result<GenerationResult> {
///         Ok(GenerationResult::new(format!("Built {}", prompt), "<html></html>"))
///     }
/// }
/// ```
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Produce a complete document for `prompt`
    ///
    /// # Arguments
    ///
    /// * `prompt` - The user's request
    /// * `history` - Turns before this request, oldest first
    /// * `current_document` - Markup to update, or `None` to start from scratch
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply is not a valid
    /// `{message, html}` object
    async fn generate(
        &self,
        prompt: &str,
        history: &[Turn],
        current_document: Option<&str>,
    ) -> Result<GenerationResult>;

    /// Human-readable backend name
    fn name(&self) -> &str {
        "generator"
    }

    /// Model identifier used for requests
    fn model(&self) -> String {
        String::new()
    }
}
