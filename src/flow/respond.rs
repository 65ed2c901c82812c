//! Responder stage with safe-template substitution
//!
//! Invokes the routed responder agent with the original user text. If the
//! extracted reply is empty or leak-marked, a fixed self-service template is
//! substituted so the pipeline still hands the user something actionable,
//! whichever category was selected.

use crate::agent::{Agent, AgentRunner};
use crate::config::FallbackConfig;
use crate::error::AppResult;
use crate::extract::extract_text;
use crate::flow::{RequestContext, ValidationPolicy};
use std::sync::Arc;

/// Responder stage: produces the candidate reply for a routed request
pub struct ResponderStage {
    runner: Arc<dyn AgentRunner>,
    policy: ValidationPolicy,
    fallback_reply: String,
}

impl ResponderStage {
    /// Create a responder stage
    ///
    /// The safe fallback template is rendered once from configuration.
    pub fn new(
        runner: Arc<dyn AgentRunner>,
        policy: ValidationPolicy,
        fallback: &FallbackConfig,
    ) -> Self {
        let fallback_reply = format!(
            "We couldn't generate a response to your request just now. Please check our help \
             center at {} for self-service articles, or email {} and our team will follow up.",
            fallback.help_center_url, fallback.support_email
        );
        Self {
            runner,
            policy,
            fallback_reply,
        }
    }

    /// Produce a candidate reply from the given responder agent
    ///
    /// The agent receives the original user text, never the triage label. The
    /// request context is carried for responder customization and logging;
    /// it does not influence routing.
    ///
    /// # Errors
    /// Returns an error only when the responder call itself fails.
    pub async fn respond(
        &self,
        responder: &Agent,
        user_text: &str,
        context: &RequestContext,
    ) -> AppResult<String> {
        let envelope = self.runner.run(responder, user_text).await?;
        let reply = extract_text(&envelope);

        if self.policy.is_usable_reply(&reply) {
            tracing::debug!(
                responder = %responder.name(),
                requester = %context.name,
                is_premium = context.is_premium,
                reply_length = reply.len(),
                "Responder produced a usable reply"
            );
            Ok(reply)
        } else {
            tracing::warn!(
                responder = %responder.name(),
                requester = %context.name,
                is_premium = context.is_premium,
                reply_length = reply.len(),
                "Responder output unusable, substituting safe fallback reply"
            );
            Ok(self.fallback_reply.clone())
        }
    }
}
