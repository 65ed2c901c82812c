//! End-to-end flow orchestration
//!
//! Sequences classify → route → respond → review under one error boundary.
//! The pipeline body is ordinary fallible code; `run_support_flow` matches
//! over its result and converts any stage fault into a fixed-format error
//! reply. It never propagates a fault and never returns an empty string.

use crate::agent::AgentRunner;
use crate::config::Config;
use crate::error::AppResult;
use crate::flow::{
    AgentRoster, Classifier, GuardrailStage, RequestContext, ResponderStage, ValidationPolicy,
};
use std::sync::Arc;
use uuid::Uuid;

/// Fixed prefix of the error reply produced when a stage fault is caught
pub const ERROR_REPLY_PREFIX: &str = "We hit a problem while handling your request: ";

/// Orchestrates the full support flow for one request at a time
///
/// Construction wires every stage to one shared runner handle; separate
/// requests share no mutable state and may run concurrently on separate tasks.
pub struct FlowOrchestrator {
    roster: AgentRoster,
    classifier: Classifier,
    responder: ResponderStage,
    guardrail: GuardrailStage,
}

impl FlowOrchestrator {
    /// Build the orchestrator from configuration and an injected runner
    pub fn new(config: &Config, runner: Arc<dyn AgentRunner>) -> Self {
        let roster = AgentRoster::standard(&config.provider.model);
        let policy = ValidationPolicy::from_config(&config.validation);

        Self {
            classifier: Classifier::new(runner.clone(), roster.triage().clone(), policy.clone()),
            responder: ResponderStage::new(runner.clone(), policy.clone(), &config.fallback),
            guardrail: GuardrailStage::new(runner, roster.reviewer().clone(), policy),
            roster,
        }
    }

    /// Run the full flow and always return a non-empty reply
    ///
    /// This is the only external entry point. A stage fault is caught here,
    /// logged, and converted into an error reply carrying the fault's
    /// description behind [`ERROR_REPLY_PREFIX`]. Nothing escapes to the
    /// caller.
    pub async fn run_support_flow(&self, user_text: &str, context: &RequestContext) -> String {
        let request_id = Uuid::new_v4();
        match self.run_pipeline(user_text, context, request_id).await {
            Ok(reply) => reply,
            Err(fault) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %fault,
                    "Stage fault caught at flow boundary, returning error reply"
                );
                format!("{}{}", ERROR_REPLY_PREFIX, fault)
            }
        }
    }

    /// The linear pipeline body: every stage must complete before the next runs
    async fn run_pipeline(
        &self,
        user_text: &str,
        context: &RequestContext,
        request_id: Uuid,
    ) -> AppResult<String> {
        let category = self.classifier.classify(user_text).await?;
        tracing::info!(
            request_id = %request_id,
            category = %category.as_str(),
            "Request classified"
        );

        let responder = self.roster.responder_for(category);
        tracing::info!(
            request_id = %request_id,
            responder = %responder.name(),
            "Request routed to responder"
        );

        let candidate = self.responder.respond(responder, user_text, context).await?;
        tracing::info!(
            request_id = %request_id,
            candidate_length = candidate.len(),
            "Candidate reply produced"
        );

        let reply = self.guardrail.review(&candidate).await?;
        tracing::info!(
            request_id = %request_id,
            reply_length = reply.len(),
            "Reply passed guardrail review"
        );

        Ok(reply)
    }
}
