//! Sitewright - conversational website builder CLI
//!
#![doc = "Sitewright - conversational website builder CLI"]
#![doc = "Main entry point for the Sitewright application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitewright::cli::{Cli, Commands};
use sitewright::commands;
use sitewright::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Build { prompt, .. } => {
            tracing::info!("Starting interactive build mode");
            if let Some(p) = &prompt {
                tracing::debug!("Seeding session with: {}", p);
            }
            commands::build::run_build(config, prompt).await?;
            Ok(())
        }
        Commands::Generate { prompt, output, .. } => {
            tracing::info!("Starting one-shot generation");
            if let Some(dir) = &output {
                tracing::debug!("Writing output to: {}", dir.display());
            }
            commands::generate::run_generate(config, prompt, output).await?;
            Ok(())
        }
        Commands::Format { file } => {
            tracing::debug!("Formatting {}", file.display());
            commands::format::run_format(&file)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so `format` and `generate` output stays clean on stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sitewright=debug"
    } else {
        "sitewright=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
