//! Agent identities and the collaborator execution boundary
//!
//! An [`Agent`] is a named identity (instructions + model reference) that an
//! [`AgentRunner`] knows how to execute. The runner returns a [`CallEnvelope`]:
//! an explicit tagged variant assigned at the collaborator boundary, so that
//! downstream code dispatches on the tag instead of probing unknown shapes at
//! runtime. The envelope's concrete variant is never guaranteed: collaborators
//! change their result shape without notice, which is exactly what the
//! extraction cascade in [`crate::extract`] exists to absorb.

pub mod openai;

pub use openai::OpenAiChatRunner;

use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A model-backed agent identity
///
/// Fields are private to keep identities immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    name: String,
    instructions: String,
    model: String,
}

impl Agent {
    /// Create a new agent identity
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: model.into(),
        }
    }

    /// Get the agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the agent's natural-language instructions
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Get the model reference this agent runs on
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Trait for executing an agent against an input string
///
/// Allows dependency injection of different collaborator implementations,
/// enabling testing with scripted runners that don't make real network calls.
/// Implementations must be safe for concurrent use; the pipeline shares one
/// runner handle across all stages and all requests.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Execute `agent` with `input` and return its result envelope
    ///
    /// # Errors
    ///
    /// Returns an error only for true call failures (transport, endpoint,
    /// configuration). Malformed-but-present output is NOT an error here; it
    /// is returned as whatever envelope variant fits and left to the
    /// extraction cascade.
    async fn run(&self, agent: &Agent, input: &str) -> AppResult<CallEnvelope>;
}

/// One message in a conversation-shaped result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

/// Message content: a plain string or a list of loosely shaped fragments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Fragments(Vec<Value>),
}

/// The opaque, shape-varying value returned by invoking a collaborator
///
/// The variant is assigned at the collaborator boundary from whatever the
/// backend actually returned. Callers must not assume any particular variant.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CallEnvelope {
    /// A bare string result
    PlainText(String),
    /// A JSON-object result with unknown field layout
    Mapping(serde_json::Map<String, Value>),
    /// A JSON-array result of unknown element shape
    Sequence(Vec<Value>),
    /// A conversation-shaped result
    MessageList(Vec<Message>),
    /// An object whose only readable form is its string representation
    Opaque(String),
}

impl fmt::Display for CallEnvelope {
    /// Textual representation used by the pattern-probe and last-resort
    /// extraction steps. Structured variants render as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallEnvelope::PlainText(s) | CallEnvelope::Opaque(s) => f.write_str(s),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{:?}", other),
            },
        }
    }
}

impl CallEnvelope {
    /// Build an envelope from an arbitrary JSON value
    ///
    /// Strings, objects, and arrays map to their own variants; anything else
    /// (numbers, booleans, null) is only representable as its textual form.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => CallEnvelope::PlainText(s),
            Value::Object(map) => CallEnvelope::Mapping(map),
            Value::Array(items) => CallEnvelope::Sequence(items),
            other => CallEnvelope::Opaque(other.to_string()),
        }
    }
}
