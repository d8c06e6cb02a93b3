//! Configuration management for Sitewright
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SitewrightError};
use crate::preview::{ViewMode, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Sitewright
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generation provider configuration
    pub provider: ProviderConfig,
    /// Builder flow behavior
    #[serde(default)]
    pub builder: BuilderConfig,
    /// Local preview server settings
    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Provider configuration
///
/// Specifies which generation service to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; usually supplied through `GEMINI_API_KEY` instead of the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model to use for generation
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (useful for tests and local mocks)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Sampling temperature sent with every request
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP client timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    180
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            temperature: default_temperature(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Builder flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Number of most recent turns sent as conversation context
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Upper bound on one generation, after which it counts as failed (seconds)
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_seconds: u64,
}

fn default_history_window() -> usize {
    6
}

fn default_generation_timeout() -> u64 {
    120
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            generation_timeout_seconds: default_generation_timeout(),
        }
    }
}

/// Preview server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Start the preview server with `build`
    #[serde(default = "default_preview_enabled")]
    pub enabled: bool,

    /// Address the preview server binds to
    #[serde(default = "default_preview_host")]
    pub host: String,

    /// Port the preview server binds to (0 picks a free port)
    #[serde(default = "default_preview_port")]
    pub port: u16,

    /// Mode shown when the page is opened without `?mode=`
    #[serde(default)]
    pub default_mode: ViewMode,

    /// Viewport used when the page is opened without `?viewport=`
    #[serde(default)]
    pub default_viewport: Viewport,

    /// Open the preview in a browser when the session starts
    #[serde(default)]
    pub open_browser: bool,
}

fn default_preview_enabled() -> bool {
    true
}

fn default_preview_host() -> String {
    "127.0.0.1".to_string()
}

fn default_preview_port() -> u16 {
    4173
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: default_preview_enabled(),
            host: default_preview_host(),
            port: default_preview_port(),
            default_mode: ViewMode::default(),
            default_viewport: Viewport::default(),
            open_browser: false,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "gemini".to_string(),
                gemini: GeminiConfig::default(),
            },
            builder: BuilderConfig::default(),
            preview: PreviewConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SitewrightError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SitewrightError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("SITEWRIGHT_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        // The dedicated variable wins over the generic one
        if let Ok(key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            if !key.trim().is_empty() {
                self.provider.gemini.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("SITEWRIGHT_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("SITEWRIGHT_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(temperature) = std::env::var("SITEWRIGHT_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.provider.gemini.temperature = value;
            } else {
                tracing::warn!("Invalid SITEWRIGHT_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(window) = std::env::var("SITEWRIGHT_HISTORY_WINDOW") {
            if let Ok(value) = window.parse() {
                self.builder.history_window = value;
            } else {
                tracing::warn!("Invalid SITEWRIGHT_HISTORY_WINDOW: {}", window);
            }
        }

        if let Ok(timeout) = std::env::var("SITEWRIGHT_GENERATION_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.builder.generation_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SITEWRIGHT_GENERATION_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(host) = std::env::var("SITEWRIGHT_PREVIEW_HOST") {
            self.preview.host = host;
        }

        if let Ok(port) = std::env::var("SITEWRIGHT_PREVIEW_PORT") {
            if let Ok(value) = port.parse() {
                self.preview.port = value;
            } else {
                tracing::warn!("Invalid SITEWRIGHT_PREVIEW_PORT: {}", port);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        match &cli.command {
            crate::cli::Commands::Build {
                model,
                port,
                no_preview,
                open,
                ..
            } => {
                if let Some(model) = model {
                    self.provider.gemini.model = model.clone();
                }
                if let Some(port) = port {
                    self.preview.port = *port;
                }
                if *no_preview {
                    self.preview.enabled = false;
                }
                if *open {
                    self.preview.open_browser = true;
                }
            }
            crate::cli::Commands::Generate { model, .. } => {
                if let Some(model) = model {
                    self.provider.gemini.model = model.clone();
                }
            }
            crate::cli::Commands::Format { .. } => {}
        }
    }

    /// Validate configuration values
    ///
    /// Credentials are checked separately by [`Config::require_credentials`]
    /// so that commands which never reach the service can run without a key.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(SitewrightError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(SitewrightError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.model.trim().is_empty() {
            return Err(
                SitewrightError::Config("provider.gemini.model cannot be empty".to_string()).into(),
            );
        }

        url::Url::parse(&self.provider.gemini.api_base).map_err(|e| {
            SitewrightError::Config(format!(
                "provider.gemini.api_base is not a valid URL ({}): {}",
                self.provider.gemini.api_base, e
            ))
        })?;

        if !(0.0..=2.0).contains(&self.provider.gemini.temperature) {
            return Err(SitewrightError::Config(
                "provider.gemini.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.provider.gemini.request_timeout_seconds == 0 {
            return Err(SitewrightError::Config(
                "provider.gemini.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.builder.history_window == 0 {
            return Err(SitewrightError::Config(
                "builder.history_window must be greater than 0".to_string(),
            )
            .into());
        }

        if self.builder.generation_timeout_seconds == 0 {
            return Err(SitewrightError::Config(
                "builder.generation_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.preview.host.trim().is_empty() {
            return Err(
                SitewrightError::Config("preview.host cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Ensure an API credential is available for the configured provider
    ///
    /// # Errors
    ///
    /// Returns `SitewrightError::MissingCredentials` when no key is set
    pub fn require_credentials(&self) -> Result<()> {
        match self.provider.gemini.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(SitewrightError::MissingCredentials(format!(
                "{} (set GEMINI_API_KEY)",
                self.provider.provider_type
            ))
            .into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "gemini");
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
        assert!((config.provider.gemini.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.builder.history_window, 6);
        assert_eq!(config.builder.generation_timeout_seconds, 120);
        assert!(config.preview.enabled);
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_provider() {
        let mut config = Config::default();
        config.provider.provider_type = "invalid".to_string();
        assert!(config.validate().is_err());

        config.provider.provider_type = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = Config::default();
        config.provider.gemini.api_base = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_base"));
    }

    #[test]
    fn test_config_validation_temperature_range() {
        let mut config = Config::default();
        config.provider.gemini.temperature = 2.5;
        assert!(config.validate().is_err());

        config.provider.gemini.temperature = -0.1;
        assert!(config.validate().is_err());

        config.provider.gemini.temperature = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_history_window() {
        let mut config = Config::default();
        config.builder.history_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeouts() {
        let mut config = Config::default();
        config.builder.generation_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.gemini.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_credentials() {
        let mut config = Config::default();
        config.provider.gemini.api_key = None;
        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("Missing credentials"));

        config.provider.gemini.api_key = Some("   ".to_string());
        assert!(config.require_credentials().is_err());

        config.provider.gemini.api_key = Some("secret".to_string());
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
provider:
  type: gemini
  gemini:
    model: gemini-2.5-pro
    api_base: http://localhost:9999
    temperature: 0.4

builder:
  history_window: 10
  generation_timeout_seconds: 30

preview:
  port: 8080
  default_mode: source
  default_viewport: mobile
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.provider.gemini.api_base, "http://localhost:9999");
        assert!((config.provider.gemini.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.builder.history_window, 10);
        assert_eq!(config.builder.generation_timeout_seconds, 30);
        assert_eq!(config.preview.port, 8080);
        assert_eq!(config.preview.host, "127.0.0.1");
        assert_eq!(config.preview.default_mode, ViewMode::Source);
        assert_eq!(config.preview.default_viewport, Viewport::Mobile);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("provider:\n  type: gemini\n").unwrap();
        assert_eq!(config.builder.history_window, 6);
        assert_eq!(config.provider.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.preview.default_viewport, Viewport::Full);
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = Config::default();
        config.provider.gemini.api_key = Some("super-secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("super-secret"));
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/sitewright.yaml", &cli).unwrap();
        assert_eq!(config.provider.provider_type, "gemini");
    }

    #[test]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = crate::test_utils::temp_dir();
        let path = crate::test_utils::create_test_file(&dir, "config.yaml", "provider: [");
        let cli = crate::cli::Cli::default();
        let err = Config::load(path.to_str().unwrap(), &cli).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides() {
        std::env::set_var("GEMINI_API_KEY", "env-key");
        std::env::set_var("SITEWRIGHT_GEMINI_MODEL", "gemini-env");
        std::env::set_var("SITEWRIGHT_HISTORY_WINDOW", "12");
        std::env::set_var("SITEWRIGHT_PREVIEW_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("GEMINI_API_KEY");
        std::env::remove_var("SITEWRIGHT_GEMINI_MODEL");
        std::env::remove_var("SITEWRIGHT_HISTORY_WINDOW");
        std::env::remove_var("SITEWRIGHT_PREVIEW_PORT");

        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.provider.gemini.model, "gemini-env");
        assert_eq!(config.builder.history_window, 12);
        // Invalid values leave the default in place
        assert_eq!(config.preview.port, 4173);
    }

    #[test]
    #[serial]
    fn test_generic_api_key_fallback() {
        std::env::remove_var("GEMINI_API_KEY");
        std::env::set_var("API_KEY", "generic-key");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("API_KEY");

        assert_eq!(config.provider.gemini.api_key.as_deref(), Some("generic-key"));
    }

    #[test]
    fn test_cli_overrides_for_build() {
        use clap::Parser;

        let cli = crate::cli::Cli::try_parse_from([
            "sitewright",
            "build",
            "--model",
            "gemini-cli",
            "--port",
            "9000",
            "--no-preview",
        ])
        .unwrap();

        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.provider.gemini.model, "gemini-cli");
        assert_eq!(config.preview.port, 9000);
        assert!(!config.preview.enabled);
    }
}
