//! Classification stage with deterministic keyword fallback
//!
//! Asks the triage agent for a category label, then validates what came back.
//! Model output that is empty, rambling, or a leaked internal representation
//! is discarded in favor of a keyword scan over the original request text, so
//! classification always resolves to a category without a second model call.

use crate::agent::{Agent, AgentRunner};
use crate::error::AppResult;
use crate::extract::extract_text;
use crate::flow::{Category, ValidationPolicy};
use std::sync::Arc;

/// Vocabulary that marks a request as a billing matter
const BILLING_KEYWORDS: &[&str] = &[
    "refund",
    "charge",
    "invoice",
    "payment",
    "transaction",
    "balance",
    "account",
];

/// Vocabulary that marks a request as a technical matter
///
/// Checked only after the billing vocabulary: "charged twice and now it
/// errors" is a billing conversation first.
const TECHNICAL_KEYWORDS: &[&str] =
    &["crash", "error", "bug", "not open", "freeze", "install", "slow"];

/// Triage stage: resolves a user request to exactly one [`Category`]
pub struct Classifier {
    runner: Arc<dyn AgentRunner>,
    triage: Agent,
    policy: ValidationPolicy,
}

impl Classifier {
    /// Create a classifier around the given triage agent
    pub fn new(runner: Arc<dyn AgentRunner>, triage: Agent, policy: ValidationPolicy) -> Self {
        Self {
            runner,
            triage,
            policy,
        }
    }

    /// Classify a user request
    ///
    /// Invokes the triage agent and normalizes its output via the shared
    /// substring rules. Unusable output (empty, over the word cap, or
    /// leak-marked) is recovered with [`keyword_fallback`] on the original
    /// request text.
    ///
    /// # Errors
    /// Returns an error only when the triage call itself fails; malformed
    /// output never errors.
    pub async fn classify(&self, user_text: &str) -> AppResult<Category> {
        let envelope = self.runner.run(&self.triage, user_text).await?;
        let extracted = extract_text(&envelope);
        let label = extracted.trim();

        if self.policy.is_usable_label(label) {
            let category = Category::from_label_text(label);
            tracing::debug!(
                label = %label,
                category = %category.as_str(),
                "Triage label accepted"
            );
            Ok(category)
        } else {
            let category = keyword_fallback(user_text);
            tracing::warn!(
                label_length = label.len(),
                category = %category.as_str(),
                "Triage output unusable, classified via keyword fallback"
            );
            Ok(category)
        }
    }
}

/// Deterministic keyword classification over the original request text
///
/// Billing vocabulary wins over technical vocabulary; anything else is
/// `General`.
fn keyword_fallback(user_text: &str) -> Category {
    let lowered = user_text.to_lowercase();
    if BILLING_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Category::Billing
    } else if TECHNICAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Category::Technical
    } else {
        Category::General
    }
}
