use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

use sitewright::config::GeminiConfig;
use sitewright::error::{Result, SitewrightError};
use sitewright::providers::{CodeGenerator, GenerationResult};
use sitewright::session::Turn;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Gemini settings pointed at a mock server
#[allow(dead_code)]
pub fn gemini_config(api_base: &str) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test-key".to_string()),
        api_base: api_base.to_string(),
        request_timeout_seconds: 5,
        ..GeminiConfig::default()
    }
}

/// A `generateContent` response whose text is the given JSON value
#[allow(dead_code)]
pub fn gemini_reply(payload: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": payload.to_string() }]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 120,
            "candidatesTokenCount": 480,
            "totalTokenCount": 600
        }
    })
}

/// What a fake generator saw on one call
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub prompt: String,
    pub history: Vec<Turn>,
    pub current_document: Option<String>,
}

/// Generator that replays queued outcomes and records every call
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeGenerator {
    outcomes: Mutex<VecDeque<std::result::Result<GenerationResult, SitewrightError>>>,
    calls: Mutex<Vec<SeenCall>>,
}

#[allow(dead_code)]
impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, summary: &str, html: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(GenerationResult::new(summary, html)));
        self
    }

    pub fn fail(self, error: SitewrightError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<SeenCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeGenerator for FakeGenerator {
    async fn generate(
        &self,
        prompt: &str,
        history: &[Turn],
        current_document: Option<&str>,
    ) -> Result<GenerationResult> {
        self.calls.lock().unwrap().push(SeenCall {
            prompt: prompt.to_string(),
            history: history.to_vec(),
            current_document: current_document.map(str::to_string),
        });

        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(error)) => Err(error.into()),
            None => Ok(GenerationResult::new(
                format!("Built {}", prompt),
                format!("<!DOCTYPE html><html><body><h1>{}</h1></body></html>", prompt),
            )),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}
