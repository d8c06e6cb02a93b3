/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level commands:

- `build`    - Interactive build session with a live preview
- `generate` - One-shot generation written to `index.html`
- `format`   - Pretty-print an HTML file the way the source view does

These handlers are small and use the library components: the builder
flow, the generator and the preview server.
*/

use crate::config::Config;
use crate::error::Result;

// Interactive build session
pub mod build;

// Entry prompt and suggestions
pub mod entry;

// Special commands parser for the build session
pub mod special_commands;

// One-shot generation handler
pub mod generate {
    //! One-shot generation.
    //!
    //! Runs a single request through the same builder flow the interactive
    //! session uses, then writes the document to `index.html`.

    use super::*;
    use crate::providers::{create_generator, CodeGenerator};
    use crate::session::{BuilderFlow, SubmitOutcome};
    use colored::Colorize;
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Generate one document and export it
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `prompt` - What to build
    /// * `output` - Directory for `index.html` (default: current directory)
    ///
    /// # Returns
    ///
    /// Returns the path of the written file
    ///
    /// # Errors
    ///
    /// Returns error if credentials are missing, generation fails, or the
    /// file cannot be written
    pub async fn run_generate(
        config: Config,
        prompt: String,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        config.require_credentials()?;
        let generator: Arc<dyn CodeGenerator> = Arc::from(create_generator(&config)?);
        generate_with(generator, &config, &prompt, output).await
    }

    /// Generate with an explicit generator
    pub async fn generate_with(
        generator: Arc<dyn CodeGenerator>,
        config: &Config,
        prompt: &str,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let flow = BuilderFlow::from_config(generator, &config.builder);

        match flow.submit(prompt).await {
            SubmitOutcome::Completed { summary } => {
                let dir = output.unwrap_or_else(|| PathBuf::from("."));
                let path = super::build::export_snapshot(&flow.snapshot(), &dir)?;
                println!("{}", summary);
                eprintln!("{}", format!("Wrote {}", path.display()).green());
                Ok(path)
            }
            SubmitOutcome::Failed { kind } => Err(crate::error::SitewrightError::Provider(
                format!("Generation failed ({})", kind),
            )
            .into()),
            SubmitOutcome::Ignored => Err(crate::error::SitewrightError::Config(
                "Prompt cannot be empty".to_string(),
            )
            .into()),
            SubmitOutcome::Rejected => Err(crate::error::SitewrightError::Provider(
                "A generation is already running".to_string(),
            )
            .into()),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::error::SitewrightError;
        use crate::test_utils::{temp_dir, ScriptedGenerator};

        #[tokio::test]
        async fn test_generate_writes_index_html() {
            let generator = Arc::new(
                ScriptedGenerator::new().with_reply("Built a timer", "<html>timer</html>"),
            );
            let dir = temp_dir();
            let out = dir.path().join("site");

            let path = generate_with(generator, &Config::default(), "a timer", Some(out.clone()))
                .await
                .unwrap();

            assert_eq!(path, out.join("index.html"));
            assert_eq!(std::fs::read_to_string(path).unwrap(), "<html>timer</html>");
        }

        #[tokio::test]
        async fn test_generate_failure_writes_nothing() {
            let generator = Arc::new(ScriptedGenerator::new().with_error(SitewrightError::EmptyResponse));
            let dir = temp_dir();

            let err = generate_with(
                generator,
                &Config::default(),
                "a timer",
                Some(dir.path().to_path_buf()),
            )
            .await
            .unwrap_err();

            assert!(err.to_string().contains("empty_response"));
            assert!(!dir.path().join("index.html").exists());
        }

        #[tokio::test]
        async fn test_generate_blank_prompt() {
            let generator = Arc::new(ScriptedGenerator::new());
            let err = generate_with(generator.clone(), &Config::default(), "   ", None)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("Prompt cannot be empty"));
            assert!(generator.calls().is_empty());
        }

        #[tokio::test]
        async fn test_run_generate_requires_credentials() {
            let mut config = Config::default();
            config.provider.gemini.api_key = None;
            assert!(run_generate(config, "x".to_string(), None).await.is_err());
        }
    }
}

// Formatting handler
pub mod format {
    //! Pretty-print an HTML file.
    //!
    //! Output matches the source view; when the file cannot be formatted
    //! its raw text is printed instead.

    use super::*;
    use crate::error::SitewrightError;
    use crate::formatter::display_source;
    use std::path::Path;

    /// Formatted text of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub fn format_file(path: &Path) -> Result<String> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            SitewrightError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(display_source(&source))
    }

    /// Print the formatted text of the file at `path`
    pub fn run_format(path: &Path) -> Result<()> {
        print!("{}", format_file(path)?);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_utils::{create_test_file, temp_dir};

        #[test]
        fn test_format_file() {
            let dir = temp_dir();
            let path = create_test_file(&dir, "index.html", "<div><p>Hi</p></div>");
            assert_eq!(
                format_file(&path).unwrap(),
                "<div>\n  <p>Hi</p>\n</div>\n"
            );
        }

        #[test]
        fn test_format_file_falls_back_to_raw() {
            let dir = temp_dir();
            let path = create_test_file(&dir, "broken.html", "<div><!-- open");
            assert_eq!(format_file(&path).unwrap(), "<div><!-- open");
        }

        #[test]
        fn test_format_missing_file() {
            let err = format_file(Path::new("/nonexistent/index.html")).unwrap_err();
            assert!(err.to_string().contains("Failed to read"));
        }
    }
}
