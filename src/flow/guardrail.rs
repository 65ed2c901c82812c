//! Guardrail review stage
//!
//! Runs the reviewer agent over the candidate reply. The reviewer's contract
//! is to return the input unchanged when safe, or a sanitized rewrite, with no
//! extra commentary. Review failure fails OPEN: unusable reviewer output means
//! the pre-review candidate passes through unchanged. The guardrail must never
//! suppress a reply.

use crate::agent::{Agent, AgentRunner};
use crate::error::AppResult;
use crate::extract::extract_text;
use crate::flow::ValidationPolicy;
use std::sync::Arc;

/// Guardrail stage: safety review of the candidate reply
pub struct GuardrailStage {
    runner: Arc<dyn AgentRunner>,
    reviewer: Agent,
    policy: ValidationPolicy,
}

impl GuardrailStage {
    /// Create a guardrail stage around the given reviewer agent
    pub fn new(runner: Arc<dyn AgentRunner>, reviewer: Agent, policy: ValidationPolicy) -> Self {
        Self {
            runner,
            reviewer,
            policy,
        }
    }

    /// Review a candidate reply
    ///
    /// Returns the reviewer's output when usable, otherwise the candidate
    /// unchanged (fail open).
    ///
    /// # Errors
    /// Returns an error only when the reviewer call itself fails.
    pub async fn review(&self, candidate: &str) -> AppResult<String> {
        let envelope = self.runner.run(&self.reviewer, candidate).await?;
        let reviewed = extract_text(&envelope);

        if self.policy.is_usable_reply(&reviewed) {
            tracing::debug!(
                rewritten = reviewed != candidate,
                reply_length = reviewed.len(),
                "Guardrail review accepted"
            );
            Ok(reviewed)
        } else {
            tracing::warn!(
                reviewed_length = reviewed.len(),
                "Guardrail output unusable, failing open with pre-review reply"
            );
            Ok(candidate.to_string())
        }
    }
}
