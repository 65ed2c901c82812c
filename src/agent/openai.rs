//! OpenAI-compatible chat-completions runner
//!
//! Executes agents against any endpoint speaking the OpenAI chat-completions
//! protocol (including Gemini's OpenAI-compatible surface). The response body
//! is mapped to a [`CallEnvelope`] at this boundary: the well-known
//! single-choice shape becomes `PlainText`, any other JSON keeps its structure
//! as `Mapping`/`Sequence`, and a non-JSON body degrades to `Opaque` rather
//! than failing the call.

use crate::agent::{Agent, AgentRunner, CallEnvelope};
use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

/// Maximum number of characters of an error body echoed into an error reason
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Runner backed by one OpenAI-compatible HTTP endpoint
///
/// One instance is shared by every stage and every request; `reqwest::Client`
/// is internally reference-counted and safe for concurrent use.
pub struct OpenAiChatRunner {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChatRunner {
    /// Create a runner from provider configuration
    ///
    /// Reads the API key from the environment variable named by
    /// `provider.api_key_env`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the key variable is unset or empty, so a
    /// missing credential fails at startup instead of on the first request.
    pub fn new(provider: &ProviderConfig) -> AppResult<Self> {
        let api_key = std::env::var(&provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "{} is not set in the environment",
                    provider.api_key_env
                ))
            })?;

        Self::from_parts(
            &provider.base_url,
            api_key,
            provider.request_timeout_seconds,
        )
    }

    /// Create a runner from explicit parts (used by tests and embedders)
    pub fn from_parts(
        base_url: &str,
        api_key: impl Into<String>,
        request_timeout_seconds: u64,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Map a response body to an envelope
    ///
    /// The canonical chat-completions shape (a single choice whose message
    /// content is a string) yields `PlainText`. Everything else keeps as much
    /// structure as the body allows.
    fn envelope_from_body(body: &str) -> CallEnvelope {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return CallEnvelope::Opaque(body.to_string());
        };

        if let Some(choices) = value.get("choices").and_then(Value::as_array)
            && choices.len() == 1
            && let Some(content) = choices[0]
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
        {
            return CallEnvelope::PlainText(content.to_string());
        }

        CallEnvelope::from_value(value)
    }
}

#[async_trait]
impl AgentRunner for OpenAiChatRunner {
    async fn run(&self, agent: &Agent, input: &str) -> AppResult<CallEnvelope> {
        let body = json!({
            "model": agent.model(),
            "messages": [
                { "role": "system", "content": agent.instructions() },
                { "role": "user", "content": input },
            ],
        });

        tracing::debug!(
            agent = %agent.name(),
            model = %agent.model(),
            input_length = input.len(),
            "Starting agent call"
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    agent = %agent.name(),
                    error = %e,
                    "Agent call failed to reach endpoint"
                );
                AppError::AgentCall {
                    agent: agent.name().to_string(),
                    reason: format!("request failed: {}", e),
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!(
                agent = %agent.name(),
                status = %status,
                error = %e,
                "Agent call response body could not be read"
            );
            AppError::AgentCall {
                agent: agent.name().to_string(),
                reason: format!("failed to read response body: {}", e),
            }
        })?;

        if !status.is_success() {
            let preview: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::error!(
                agent = %agent.name(),
                status = %status,
                body_preview = %preview,
                "Agent call returned non-success status"
            );
            return Err(AppError::AgentCall {
                agent: agent.name().to_string(),
                reason: format!("endpoint returned {}: {}", status, preview),
            });
        }

        let envelope = Self::envelope_from_body(&text);
        tracing::debug!(
            agent = %agent.name(),
            response_length = text.len(),
            "Agent call completed"
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_choice_body_becomes_plain_text() {
        let body = r#"{
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "Try reinstalling." } }
            ]
        }"#;
        let env = OpenAiChatRunner::envelope_from_body(body);
        assert_eq!(env, CallEnvelope::PlainText("Try reinstalling.".to_string()));
    }

    #[test]
    fn test_multi_choice_body_keeps_mapping_structure() {
        let body = r#"{
            "choices": [
                { "message": { "content": "a" } },
                { "message": { "content": "b" } }
            ]
        }"#;
        let env = OpenAiChatRunner::envelope_from_body(body);
        assert!(matches!(env, CallEnvelope::Mapping(_)));
    }

    #[test]
    fn test_non_string_content_keeps_mapping_structure() {
        let body = r#"{"choices": [{"message": {"content": [{"text": "a"}]}}]}"#;
        let env = OpenAiChatRunner::envelope_from_body(body);
        assert!(matches!(env, CallEnvelope::Mapping(_)));
    }

    #[test]
    fn test_json_array_body_becomes_sequence() {
        let env = OpenAiChatRunner::envelope_from_body(r#"["a", "b"]"#);
        assert!(matches!(env, CallEnvelope::Sequence(_)));
    }

    #[test]
    fn test_non_json_body_becomes_opaque() {
        let env = OpenAiChatRunner::envelope_from_body("<html>bad gateway</html>");
        assert_eq!(
            env,
            CallEnvelope::Opaque("<html>bad gateway</html>".to_string())
        );
    }

    #[test]
    fn test_from_parts_trims_trailing_slash() {
        let runner =
            OpenAiChatRunner::from_parts("http://localhost:9999/v1/", "key", 5).expect("builds");
        assert_eq!(runner.base_url, "http://localhost:9999/v1");
    }
}
