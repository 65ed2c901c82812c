//! Support-flow pipeline
//!
//! A request flows strictly linearly: classify → route → respond → review.
//! Every stage recovers from malformed collaborator output on its own; only a
//! true call failure escapes a stage, and the orchestrator converts that into
//! an error reply instead of propagating it.

pub mod classify;
pub mod guardrail;
pub mod orchestrator;
pub mod respond;

pub use classify::Classifier;
pub use guardrail::GuardrailStage;
pub use orchestrator::FlowOrchestrator;
pub use respond::ResponderStage;

use crate::agent::Agent;
use crate::config::ValidationConfig;

/// Support request category
///
/// Always resolved to exactly one value before routing; never left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Billing,
    Technical,
    General,
}

impl Category {
    /// Normalize free text into a category via tolerant substring matching
    ///
    /// Model output is often verbose ("This looks like a billing question"),
    /// so matching is deliberately substring-based rather than exact. Rules
    /// are checked in order; unmatched text defaults to `General`. This is the
    /// single normalization point shared by the classifier's acceptance path
    /// and any free-text label source.
    pub fn from_label_text(label: &str) -> Self {
        let lowered = label.to_lowercase();
        if lowered.contains("bill") {
            Category::Billing
        } else if lowered.contains("tech") || lowered.contains("crash") || lowered.contains("error")
        {
            Category::Technical
        } else {
            Category::General
        }
    }

    /// Short canonical label, used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "billing",
            Category::Technical => "technical",
            Category::General => "general",
        }
    }
}

/// Per-request metadata carried through the pipeline
///
/// Reserved for responder customization; routing never consults it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Display name of the requester (may be empty)
    pub name: String,
    /// Whether the requester is on a premium plan
    pub is_premium: bool,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(name: impl Into<String>, is_premium: bool) -> Self {
        Self {
            name: name.into(),
            is_premium,
        }
    }
}

/// Output validation policy shared by every stage
///
/// Wraps the configurable leak-marker list: a marker hit means extraction
/// returned the debug rendering of an internal object rather than real text.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    leak_markers: Vec<String>,
    max_label_words: usize,
}

impl ValidationPolicy {
    /// Build a policy from configuration
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            leak_markers: config.leak_markers.clone(),
            max_label_words: config.max_label_words,
        }
    }

    /// Does the text contain any configured leak marker?
    pub fn contains_leak_marker(&self, text: &str) -> bool {
        self.leak_markers.iter().any(|m| text.contains(m.as_str()))
    }

    /// Is this text usable as a user-facing reply?
    pub fn is_usable_reply(&self, text: &str) -> bool {
        !text.trim().is_empty() && !self.contains_leak_marker(text)
    }

    /// Is this text usable as a triage label?
    ///
    /// A label additionally must stay under the word cap; a triage agent that
    /// writes paragraphs is not labeling.
    pub fn is_usable_label(&self, text: &str) -> bool {
        self.is_usable_reply(text) && text.split_whitespace().count() <= self.max_label_words
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

/// The fixed set of agent identities the pipeline runs against
///
/// One triage agent, one responder per category, one reviewer. Instructions
/// are part of the identity; the model reference comes from configuration.
#[derive(Debug, Clone)]
pub struct AgentRoster {
    triage: Agent,
    billing: Agent,
    technical: Agent,
    general: Agent,
    reviewer: Agent,
}

const TRIAGE_INSTRUCTIONS: &str = "You are a triage agent for a software support desk. \
     Classify the user's request as billing, technical, or general. \
     Respond with only the single category word.";

const BILLING_INSTRUCTIONS: &str = "You are a helpful support agent handling billing queries: \
     refunds, charges, invoices, and payments. Be concise and professional.";

const TECHNICAL_INSTRUCTIONS: &str = "You are a helpful support agent handling technical issues \
     with the software: crashes, errors, installation, and performance. \
     Provide concrete troubleshooting steps.";

const GENERAL_INSTRUCTIONS: &str = "You are a helpful customer support agent for a software \
     company. Assist users in a friendly and professional manner, and keep responses concise. \
     If the request is outside software support, politely say so.";

const REVIEWER_INSTRUCTIONS: &str = "You review a draft support reply before it is sent. \
     If the reply is safe and appropriate, return it unchanged. Otherwise return a sanitized \
     rewrite. Do not add commentary.";

impl AgentRoster {
    /// Build the standard roster on a given model reference
    pub fn standard(model: &str) -> Self {
        Self {
            triage: Agent::new("Triage Agent", TRIAGE_INSTRUCTIONS, model),
            billing: Agent::new("Billing Agent", BILLING_INSTRUCTIONS, model),
            technical: Agent::new("Technical Agent", TECHNICAL_INSTRUCTIONS, model),
            general: Agent::new("General Support Agent", GENERAL_INSTRUCTIONS, model),
            reviewer: Agent::new("Guardrail Reviewer", REVIEWER_INSTRUCTIONS, model),
        }
    }

    /// Get the triage agent
    pub fn triage(&self) -> &Agent {
        &self.triage
    }

    /// Get the guardrail reviewer agent
    pub fn reviewer(&self) -> &Agent {
        &self.reviewer
    }

    /// Route a resolved category to its specialized responder
    pub fn responder_for(&self, category: Category) -> &Agent {
        match category {
            Category::Billing => &self.billing,
            Category::Technical => &self.technical,
            Category::General => &self.general,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Category normalization
    // ========================================================================

    #[test]
    fn test_canonical_labels_normalize() {
        assert_eq!(Category::from_label_text("billing"), Category::Billing);
        assert_eq!(Category::from_label_text("technical"), Category::Technical);
        assert_eq!(Category::from_label_text("general"), Category::General);
    }

    #[test]
    fn test_verbose_labels_normalize_by_substring() {
        assert_eq!(
            Category::from_label_text("This is clearly a billing question."),
            Category::Billing
        );
        assert_eq!(
            Category::from_label_text("Sounds like a tech support issue"),
            Category::Technical
        );
        assert_eq!(
            Category::from_label_text("the app keeps crashing"),
            Category::Technical
        );
        assert_eq!(
            Category::from_label_text("looks like an error report"),
            Category::Technical
        );
    }

    #[test]
    fn test_normalization_is_case_insensitive() {
        assert_eq!(Category::from_label_text("BILLING"), Category::Billing);
        assert_eq!(Category::from_label_text("Technical"), Category::Technical);
    }

    #[test]
    fn test_billing_rule_checked_before_technical() {
        assert_eq!(
            Category::from_label_text("billing error on my account"),
            Category::Billing
        );
    }

    #[test]
    fn test_unmatched_text_defaults_to_general() {
        assert_eq!(
            Category::from_label_text("how do I change my avatar"),
            Category::General
        );
        assert_eq!(Category::from_label_text(""), Category::General);
    }

    // ========================================================================
    // Validation policy
    // ========================================================================

    #[test]
    fn test_usable_reply_rejects_empty_and_blank() {
        let policy = ValidationPolicy::default();
        assert!(!policy.is_usable_reply(""));
        assert!(!policy.is_usable_reply("   \n "));
        assert!(policy.is_usable_reply("a real reply"));
    }

    #[test]
    fn test_usable_reply_rejects_leak_markers() {
        let policy = ValidationPolicy::default();
        assert!(!policy.is_usable_reply("RunResult:\n- Final output (str): hi"));
        assert!(!policy.is_usable_reply("<agents.Agent object at 0x7f3a>"));
    }

    #[test]
    fn test_usable_label_enforces_word_cap() {
        let policy = ValidationPolicy::default();
        let fifty = vec!["word"; 50].join(" ");
        let fifty_one = vec!["word"; 51].join(" ");
        assert!(policy.is_usable_label(&fifty));
        assert!(!policy.is_usable_label(&fifty_one));
    }

    #[test]
    fn test_custom_leak_markers_respected() {
        let config = ValidationConfig {
            leak_markers: vec!["WeirdWrapper".to_string()],
            max_label_words: 50,
        };
        let policy = ValidationPolicy::from_config(&config);
        assert!(!policy.is_usable_reply("WeirdWrapper(inner=...)"));
        // Default markers no longer apply once overridden
        assert!(policy.is_usable_reply("RunResult text"));
    }

    // ========================================================================
    // Roster routing
    // ========================================================================

    #[test]
    fn test_roster_routes_each_category() {
        let roster = AgentRoster::standard("test-model");
        assert_eq!(
            roster.responder_for(Category::Billing).name(),
            "Billing Agent"
        );
        assert_eq!(
            roster.responder_for(Category::Technical).name(),
            "Technical Agent"
        );
        assert_eq!(
            roster.responder_for(Category::General).name(),
            "General Support Agent"
        );
    }

    #[test]
    fn test_roster_agents_share_model_reference() {
        let roster = AgentRoster::standard("gemini-2.5-flash");
        assert_eq!(roster.triage().model(), "gemini-2.5-flash");
        assert_eq!(roster.reviewer().model(), "gemini-2.5-flash");
    }
}
