//! View state for the preview surface
//!
//! This module defines how the document is shown:
//! - View mode: the rendered page or its formatted source
//! - Viewport: the width of the frame the page is rendered in
//!
//! Neither ever changes the document itself.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which face of the document is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// The document running in a sandboxed frame
    #[default]
    Rendered,

    /// The pretty-printed markup
    Source,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendered => write!(f, "rendered"),
            Self::Source => write!(f, "source"),
        }
    }
}

impl ViewMode {
    /// Parse a view mode from a string
    ///
    /// # Arguments
    ///
    /// * `s` - "rendered" (or "preview") or "source" (or "code")
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewright::preview::ViewMode;
    ///
    /// assert_eq!(ViewMode::parse_str("code").unwrap(), ViewMode::Source);
    /// assert!(ViewMode::parse_str("sideways").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "rendered" | "preview" => Ok(Self::Rendered),
            "source" | "code" => Ok(Self::Source),
            other => Err(format!("Unknown view mode: {}", other)),
        }
    }

    /// The other mode
    pub fn toggled(&self) -> Self {
        match self {
            Self::Rendered => Self::Source,
            Self::Source => Self::Rendered,
        }
    }

    /// Colored tag for terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Rendered => format!("[{}]", "PREVIEW".green()),
            Self::Source => format!("[{}]", "CODE".cyan()),
        }
    }
}

/// Width of the frame the rendered document is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    /// All available width
    #[default]
    Full,

    /// 768 pixels
    Tablet,

    /// 375 pixels
    Mobile,
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Tablet => write!(f, "tablet"),
            Self::Mobile => write!(f, "mobile"),
        }
    }
}

impl Viewport {
    /// All viewports, widest first
    pub const ALL: [Viewport; 3] = [Viewport::Full, Viewport::Tablet, Viewport::Mobile];

    /// Parse a viewport from a string
    ///
    /// Accepts the names "full" ("desktop"), "tablet" and "mobile", or
    /// the widths they stand for.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewright::preview::Viewport;
    ///
    /// assert_eq!(Viewport::parse_str("desktop").unwrap(), Viewport::Full);
    /// assert_eq!(Viewport::parse_str("375px").unwrap(), Viewport::Mobile);
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "full" | "desktop" | "100%" => Ok(Self::Full),
            "tablet" | "768px" | "768" => Ok(Self::Tablet),
            "mobile" | "375px" | "375" => Ok(Self::Mobile),
            other => Err(format!("Unknown viewport: {}", other)),
        }
    }

    /// CSS width of the frame container
    pub fn css_width(&self) -> &'static str {
        match self {
            Self::Full => "100%",
            Self::Tablet => "768px",
            Self::Mobile => "375px",
        }
    }

    /// Label used in the preview toolbar
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "Desktop",
            Self::Tablet => "Tablet",
            Self::Mobile => "Mobile",
        }
    }
}

/// Preview defaults shared by the REPL and the preview server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PreviewState {
    pub mode: ViewMode,
    pub viewport: Viewport,
}

impl PreviewState {
    pub fn new(mode: ViewMode, viewport: Viewport) -> Self {
        Self { mode, viewport }
    }
}
