//! The generated document and its export to disk

use crate::error::{Result, SitewrightError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name used for every export
pub const EXPORT_FILE_NAME: &str = "index.html";

/// MIME type of an exported document
pub const EXPORT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The current HTML artifact of a session
///
/// Starts empty. Each successful generation replaces the whole text.
/// Cloning shares the underlying string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDocument {
    html: Option<Arc<str>>,
}

impl GeneratedDocument {
    /// An empty document
    pub fn new() -> Self {
        Self { html: None }
    }

    /// Returns a document holding exactly `html`
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewright::session::document::GeneratedDocument;
    ///
    /// let doc = GeneratedDocument::new().replace("<html></html>");
    /// assert_eq!(doc.html(), Some("<html></html>"));
    /// ```
    pub fn replace(&self, html: impl Into<String>) -> Self {
        Self {
            html: Some(Arc::from(html.into())),
        }
    }

    /// Full markup, if any generation has succeeded
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Markup to send as context for the next request: `None` when empty
    pub fn as_context(&self) -> Option<&str> {
        self.html().filter(|html| !html.is_empty())
    }

    /// True until a generation succeeds with non-empty markup
    pub fn is_empty(&self) -> bool {
        self.as_context().is_none()
    }

    /// Write the raw markup to `dir/index.html`
    ///
    /// The bytes written are exactly the in-memory text; no formatting is applied.
    ///
    /// # Errors
    ///
    /// Returns `SitewrightError::Export` when there is nothing to export or the
    /// file cannot be written.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let html = self.as_context().ok_or_else(|| {
            SitewrightError::Export("No document has been generated yet".to_string())
        })?;

        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                SitewrightError::Export(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, html.as_bytes()).map_err(|e| {
            SitewrightError::Export(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), bytes = html.len(), "Exported document");
        Ok(path)
    }
}
