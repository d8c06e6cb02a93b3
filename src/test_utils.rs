//! Test utilities for Sitewright
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, a scripted code generator, and
//! assertion helpers.

use crate::config::Config;
use crate::error::{Result, SitewrightError};
use crate::providers::{CodeGenerator, GenerationResult};
use crate::session::conversation::Turn;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Returns
///
/// Returns the path to the created file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: std::result::Result<T, SitewrightError>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration with a dummy API key
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.gemini.api_key = Some("test-key".to_string());
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
provider:
  type: gemini
  gemini:
    model: gemini-2.5-flash
    api_base: http://localhost:9999
    temperature: 0.7

builder:
  history_window: 6
  generation_timeout_seconds: 5

preview:
  enabled: false
  port: 0
"#
    .to_string()
}

/// One recorded call to [`ScriptedGenerator::generate`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub history_len: usize,
    pub current_document: Option<String>,
}

/// Code generator that replays a queue of canned outcomes
///
/// Each call pops the next outcome; when the queue is empty it answers with
/// a generic successful result. Every call is recorded.
#[derive(Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<std::result::Result<GenerationResult, SitewrightError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn with_reply(self, summary: &str, html: &str) -> Self {
        self.push(Ok(GenerationResult::new(summary, html)));
        self
    }

    /// Queue a failing reply
    pub fn with_error(self, error: SitewrightError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, outcome: std::result::Result<GenerationResult, SitewrightError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        history: &[Turn],
        current_document: Option<&str>,
    ) -> Result<GenerationResult> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            history_len: history.len(),
            current_document: current_document.map(str::to_string),
        });

        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(error)) => Err(error.into()),
            None => Ok(GenerationResult::new(
                format!("Built {}", prompt),
                format!("<html><body><p>{}</p></body></html>", prompt),
            )),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: std::result::Result<(), SitewrightError> =
            Err(SitewrightError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: std::result::Result<(), SitewrightError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: std::result::Result<(), SitewrightError> =
            Err(SitewrightError::Config("different error".to_string()));
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert_eq!(config.provider.provider_type, "gemini");
        assert!(config.validate().is_ok());
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.preview.enabled);
    }

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::new()
            .with_reply("first", "<p>1</p>")
            .with_error(SitewrightError::EmptyResponse);

        let first = generator.generate("a", &[], None).await.unwrap();
        assert_eq!(first.html, "<p>1</p>");
        assert!(generator.generate("b", &[], Some("<p>1</p>")).await.is_err());
        let fallback = generator.generate("c", &[], None).await.unwrap();
        assert_eq!(fallback.summary, "Built c");

        let calls = generator.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].current_document.as_deref(), Some("<p>1</p>"));
    }
}
