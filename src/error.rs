//! Error types for Sitewright
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Sitewright operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, code generation, document export and
/// preview serving.
#[derive(Error, Debug)]
pub enum SitewrightError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors not covered by a more specific variant
    #[error("Provider error: {0}")]
    Provider(String),

    /// The generation service answered without any text payload
    #[error("Generation service returned an empty response")]
    EmptyResponse,

    /// The text payload was not the `{message, html}` JSON object
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    /// The request never produced a usable HTTP response
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Authentication errors (e.g., 401 Unauthorized, rejected API key)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Generation did not finish within the configured time
    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    /// Generation was cancelled by the user
    #[error("Generation cancelled")]
    Cancelled,

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Pretty-printing the document failed
    #[error("Format error: {0}")]
    Format(String),

    /// Writing the document to disk failed
    #[error("Export error: {0}")]
    Export(String),

    /// Preview server errors (bind, serve)
    #[error("Preview error: {0}")]
    Preview(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Sitewright operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Classification of a failed generation, used for logging only
///
/// Every kind surfaces to the user as the same apology turn; the
/// distinction exists so diagnostics can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No text payload in the service response
    EmptyResponse,
    /// Payload was not the expected JSON object
    MalformedResponse,
    /// Network, HTTP status or credential failure
    Transport,
    /// The configured generation timeout elapsed
    Timeout,
    /// The user cancelled the request
    Cancelled,
    /// Anything else
    Other,
}

impl FailureKind {
    /// Classify an error returned by a code generator
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewright::error::{FailureKind, SitewrightError};
    ///
    /// let err: anyhow::Error = SitewrightError::EmptyResponse.into();
    /// assert_eq!(FailureKind::classify(&err), FailureKind::EmptyResponse);
    /// ```
    pub fn classify(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<SitewrightError>() {
            Some(SitewrightError::EmptyResponse) => Self::EmptyResponse,
            Some(SitewrightError::MalformedResponse(_)) | Some(SitewrightError::Serialization(_)) => {
                Self::MalformedResponse
            }
            Some(SitewrightError::Transport(_))
            | Some(SitewrightError::Authentication(_))
            | Some(SitewrightError::Http(_)) => Self::Transport,
            Some(SitewrightError::Timeout(_)) => Self::Timeout,
            Some(SitewrightError::Cancelled) => Self::Cancelled,
            _ => {
                if error.downcast_ref::<reqwest::Error>().is_some() {
                    Self::Transport
                } else {
                    Self::Other
                }
            }
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyResponse => write!(f, "empty_response"),
            Self::MalformedResponse => write!(f, "malformed_response"),
            Self::Transport => write!(f, "transport"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Other => write!(f, "other"),
        }
    }
}
