//! Command-line interface definition for Sitewright
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive building, one-shot generation,
//! and source formatting.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sitewright - describe a website, refine it in conversation
///
/// Generates complete single-file HTML documents from natural language
/// and serves a live, sandboxed preview while you iterate.
#[derive(Parser, Debug, Clone)]
#[command(name = "sitewright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml", env = "SITEWRIGHT_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Sitewright
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive building session
    Build {
        /// Initial description of the website; asked for interactively when omitted
        prompt: Option<String>,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,

        /// Port for the preview server
        #[arg(long)]
        port: Option<u16>,

        /// Do not start the preview server
        #[arg(long)]
        no_preview: bool,

        /// Open the preview in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Generate a document once and write it to disk
    Generate {
        /// Description of the website to build
        #[arg(short, long)]
        prompt: String,

        /// Directory that receives index.html (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Pretty-print an HTML file the way the source view shows it
    Format {
        /// HTML file to format
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Build {
                prompt: None,
                model: None,
                port: None,
                no_preview: false,
                open: false,
            },
        }
    }
}
