//! Google Gemini implementation of the code generator
//!
//! This module calls the Gemini `generateContent` REST endpoint with the
//! fixed system instruction, a JSON response schema, and the request text
//! built by [`crate::prompts`]. The reply's text payload is parsed into a
//! [`GenerationResult`] without any post-processing of the markup.

use crate::config::GeminiConfig;
use crate::error::{Result, SitewrightError};
use crate::prompts::{self, DEFAULT_HISTORY_WINDOW};
use crate::providers::{CodeGenerator, GenerationResult, StructuredReply};
use crate::session::conversation::Turn;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API generator
///
/// # Examples
///
/// ```
/// use sitewright::config::GeminiConfig;
/// use sitewright::providers::GeminiProvider;
///
/// let config = GeminiConfig {
///     api_key: Some("test-key".to_string()),
///     ..GeminiConfig::default()
/// };
/// let provider = GeminiProvider::new(config).unwrap();
/// assert_eq!(provider.model_name(), "gemini-2.5-flash");
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
    history_window: usize,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

/// Content block in Gemini format
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// A single part; only text parts are produced or consumed
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Sampling and structured-output settings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// Response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate's parts, if any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns `SitewrightError::MissingCredentials` when no API key is configured,
    /// or a provider error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SitewrightError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("sitewright/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SitewrightError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini provider: model={}, api_base={}",
            config.model,
            config.api_base
        );

        Ok(Self {
            client,
            config,
            api_key,
            history_window: DEFAULT_HISTORY_WINDOW,
        })
    }

    /// Set how many prior turns are sent as context
    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// The configured model name
    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(
        &self,
        prompt: &str,
        history: &[Turn],
        current_document: Option<&str>,
    ) -> GeminiRequest {
        let text =
            prompts::build_request_prompt(prompt, history, current_document, self.history_window);

        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(prompts::SYSTEM_INSTRUCTION.to_string()),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(text) }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: prompts::response_schema(),
            },
        }
    }
}

/// Parse the reply text into a result, without coercion
fn parse_reply(text: &str) -> Result<GenerationResult> {
    let reply: StructuredReply = serde_json::from_str(text)
        .map_err(|e| SitewrightError::MalformedResponse(e.to_string()))?;
    Ok(reply.into())
}

#[async_trait]
impl CodeGenerator for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        history: &[Turn],
        current_document: Option<&str>,
    ) -> Result<GenerationResult> {
        let url = self.endpoint();
        let request = self.build_request(prompt, history, current_document);

        tracing::debug!(
            "Sending Gemini request: model={}, history_turns={}, updating={}",
            self.config.model,
            history.len().min(self.history_window),
            current_document.map(|doc| !doc.is_empty()).unwrap_or(false)
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                if e.is_timeout() {
                    SitewrightError::Transport(format!("Gemini request timed out: {}", e))
                } else {
                    SitewrightError::Transport(format!("Gemini request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            let error = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SitewrightError::Authentication(format!(
                        "Gemini rejected the API key ({}): {}",
                        status, error_text
                    ))
                }
                _ => SitewrightError::Transport(format!(
                    "Gemini returned error {}: {}",
                    status, error_text
                )),
            };
            return Err(error.into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response envelope: {}", e);
            SitewrightError::MalformedResponse(format!("Invalid response envelope: {}", e))
        })?;

        let usage = gemini_response.usage_metadata.as_ref();
        tracing::debug!(
            "Gemini response: candidates={}, prompt_tokens={}, completion_tokens={}",
            gemini_response.candidates.len(),
            usage.map(|u| u.prompt_token_count).unwrap_or(0),
            usage.map(|u| u.candidates_token_count).unwrap_or(0)
        );

        let text = match gemini_response.text() {
            Some(text) => text,
            None => {
                let finish_reason = gemini_response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "none".to_string());
                let block_reason = gemini_response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "none".to_string());
                tracing::warn!(
                    "Gemini returned no text: finish_reason={}, block_reason={}",
                    finish_reason,
                    block_reason
                );
                return Err(SitewrightError::EmptyResponse.into());
            }
        };

        let result = parse_reply(&text).map_err(|e| {
            tracing::error!("Gemini reply did not match the response schema: {}", e);
            e
        })?;

        tracing::info!(
            summary_chars = result.summary.len(),
            html_bytes = result.html.len(),
            "Generation completed"
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
