//! Configuration management for Deskroute
//!
//! Parses TOML configuration files and provides typed access to settings.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Model provider configuration
///
/// Points every agent at one OpenAI-compatible chat-completions endpoint.
/// The API key itself never appears in the file; only the name of the
/// environment variable carrying it does.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Output validation configuration
///
/// `leak_markers` is the heuristic guard against extraction returning a debug
/// rendering of an internal object instead of real text. The trigger strings
/// are configurable because collaborator result shapes drift; hard-coding them
/// would make the guard itself brittle.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    #[serde(default = "default_leak_markers")]
    pub leak_markers: Vec<String>,
    /// Maximum word count for a usable triage label
    #[serde(default = "default_max_label_words")]
    pub max_label_words: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            leak_markers: default_leak_markers(),
            max_label_words: default_max_label_words(),
        }
    }
}

fn default_leak_markers() -> Vec<String> {
    vec![
        "RunResult".to_string(),
        "CallEnvelope".to_string(),
        "object at 0x".to_string(),
    ]
}

fn default_max_label_words() -> usize {
    50
}

/// Safe-fallback reply configuration
///
/// Used when a responder produces no usable text. Points the user at
/// self-service channels instead of returning nothing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    #[serde(default = "default_help_center_url")]
    pub help_center_url: String,
    #[serde(default = "default_support_email")]
    pub support_email: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            help_center_url: default_help_center_url(),
            support_email: default_support_email(),
        }
    }
}

fn default_help_center_url() -> String {
    "https://help.example.com".to_string()
}

fn default_support_email() -> String {
    "support@example.com".to_string()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML,
    /// or fails semantic validation.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Invalid TOML configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation beyond what serde enforces
    ///
    /// # Errors
    /// Returns `AppError::Config` describing the first invalid field found.
    pub fn validate(&self) -> AppResult<()> {
        if self.provider.base_url.trim().is_empty() {
            return Err(AppError::Config(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "provider.base_url must start with http:// or https://, got '{}'",
                self.provider.base_url
            )));
        }
        if self.provider.model.trim().is_empty() {
            return Err(AppError::Config(
                "provider.model must not be empty".to_string(),
            ));
        }
        if self.provider.api_key_env.trim().is_empty() {
            return Err(AppError::Config(
                "provider.api_key_env must not be empty".to_string(),
            ));
        }
        if self.provider.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "provider.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.provider.request_timeout_seconds > 300 {
            return Err(AppError::Config(format!(
                "provider.request_timeout_seconds cannot exceed 300 seconds (5 minutes), got {}",
                self.provider.request_timeout_seconds
            )));
        }
        if self.validation.max_label_words == 0 {
            return Err(AppError::Config(
                "validation.max_label_words must be greater than 0".to_string(),
            ));
        }
        if self
            .validation
            .leak_markers
            .iter()
            .any(|m| m.trim().is_empty())
        {
            return Err(AppError::Config(
                "validation.leak_markers must not contain empty strings".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            [provider]
            base_url = "https://generativelanguage.googleapis.com/v1beta/openai"
            model = "gemini-2.5-flash"
        "#
    }

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config = Config::from_toml_str(minimal_toml()).expect("minimal config should parse");
        assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.provider.request_timeout_seconds, 30);
        assert_eq!(config.validation.max_label_words, 50);
        assert!(
            config
                .validation
                .leak_markers
                .iter()
                .any(|m| m == "RunResult")
        );
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.fallback.support_email, "support@example.com");
    }

    #[test]
    fn test_full_config_parses() {
        let toml = r#"
            [provider]
            base_url = "http://localhost:1234/v1"
            model = "local-model"
            api_key_env = "LOCAL_KEY"
            request_timeout_seconds = 15

            [validation]
            leak_markers = ["RunResult", "agents.Agent"]
            max_label_words = 20

            [fallback]
            help_center_url = "https://support.acme.test"
            support_email = "care@acme.test"

            [observability]
            log_level = "debug"
        "#;
        let config = Config::from_toml_str(toml).expect("full config should parse");
        assert_eq!(config.provider.model, "local-model");
        assert_eq!(config.validation.max_label_words, 20);
        assert_eq!(config.validation.leak_markers.len(), 2);
        assert_eq!(config.fallback.help_center_url, "https://support.acme.test");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_missing_provider_section_rejected() {
        let result = Config::from_toml_str("[observability]\nlog_level = \"info\"\n");
        assert!(result.is_err(), "config without [provider] should fail");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let toml = r#"
            [provider]
            base_url = ""
            model = "m"
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let toml = r#"
            [provider]
            base_url = "ftp://example.com/v1"
            model = "m"
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = r#"
            [provider]
            base_url = "http://localhost/v1"
            model = "m"
            request_timeout_seconds = 0
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("request_timeout_seconds"));
    }

    #[test]
    fn test_excessive_timeout_rejected() {
        let toml = r#"
            [provider]
            base_url = "http://localhost/v1"
            model = "m"
            request_timeout_seconds = 301
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn test_zero_max_label_words_rejected() {
        let toml = r#"
            [provider]
            base_url = "http://localhost/v1"
            model = "m"

            [validation]
            max_label_words = 0
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("max_label_words"));
    }

    #[test]
    fn test_blank_leak_marker_rejected() {
        let toml = r#"
            [provider]
            base_url = "http://localhost/v1"
            model = "m"

            [validation]
            leak_markers = ["RunResult", "  "]
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("leak_markers"));
    }

    #[test]
    fn test_from_file_reads_and_validates() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(minimal_toml().as_bytes()).expect("write");

        let config = Config::from_file(file.path()).expect("should load from file");
        assert_eq!(config.provider.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_from_file_missing_path_errors_with_context() {
        let err = Config::from_file("/nonexistent/deskroute.toml").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("deskroute.toml"), "error should name the path");
    }
}
