//! Text extraction from collaborator result envelopes
//!
//! Collaborators change their result shape without notice: the same agent may
//! hand back a bare string, a nested mapping, a list of messages, or an object
//! whose only readable form is a debug dump. `extract_text` is a total
//! function over all of them. It runs an ordered strategy cascade that
//! degrades from structured to unstructured extraction, and returns an empty
//! string only when no strategy yields usable text. It never fails outward.

use crate::agent::{CallEnvelope, Message, MessageContent};
use serde_json::Value;

/// Field names commonly carrying the final text, in probe order
const FIELD_PRIORITY: &[&str] = &[
    "final_output",
    "output",
    "output_text",
    "content",
    "text",
    "reply",
    "response",
    "message",
];

/// Sub-keys searched inside mapping-valued fields, in priority order
const SUBKEY_PRIORITY: &[&str] = &["text", "content", "message", "reply"];

/// Marker spellings that introduce a final-output block in a debug rendering
///
/// The parenthesized spelling must be checked first: the plain spelling is a
/// prefix of it, and matching the plain one first would leave `(str):` glued
/// to the captured block.
const FINAL_OUTPUT_MARKERS: &[&str] = &["Final output (str):", "Final output:"];

/// Cap on the serialized-envelope fallback, in characters
const MAX_SERIALIZED_CHARS: usize = 10_000;

/// Extract the best available text from a result envelope
///
/// Strategy cascade, each step attempted only if the previous yielded nothing:
/// 1. Known-field probe over [`FIELD_PRIORITY`] (mapping envelopes; a
///    non-blank plain-text envelope short-circuits here)
/// 2. Message-list probe (typed message lists, a mapping's `messages` array,
///    or a sequence of message-shaped values)
/// 3. Final-output marker probe on the envelope's textual representation
/// 4. Generic serialization of structured envelopes, capped at
///    [`MAX_SERIALIZED_CHARS`]
/// 5. Last resort: the trimmed textual representation itself
pub fn extract_text(envelope: &CallEnvelope) -> String {
    if let CallEnvelope::PlainText(s) = envelope
        && !s.trim().is_empty()
    {
        return s.trim().to_string();
    }

    if let Some(text) = probe_known_fields(envelope) {
        return text;
    }

    if let Some(text) = probe_message_list(envelope) {
        return text;
    }

    let rendered = envelope.to_string();
    if let Some(text) = probe_final_output_block(&rendered) {
        return text;
    }

    if let Some(text) = probe_serialized(envelope) {
        return text;
    }

    rendered.trim().to_string()
}

/// Step 1: probe a fixed, ordered list of well-known output fields
fn probe_known_fields(envelope: &CallEnvelope) -> Option<String> {
    let CallEnvelope::Mapping(map) = envelope else {
        return None;
    };

    for field in FIELD_PRIORITY {
        let Some(value) = map.get(*field) else {
            continue;
        };
        match value {
            Value::String(s) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Value::Object(inner) => {
                for subkey in SUBKEY_PRIORITY {
                    if let Some(Value::String(s)) = inner.get(*subkey)
                        && !s.trim().is_empty()
                    {
                        return Some(s.trim().to_string());
                    }
                }
                // No usable sub-key: the compact form of the mapping is still
                // better than falling through to a whole-envelope dump.
                if let Ok(serialized) = serde_json::to_string(inner) {
                    return Some(serialized);
                }
            }
            Value::Array(items) => {
                let collected = collect_list_strings(items);
                if !collected.is_empty() {
                    return Some(collected.join("\n"));
                }
            }
            _ => {}
        }
    }
    None
}

/// Collect string elements and recognized sub-fields of object elements
fn collect_list_strings(items: &[Value]) -> Vec<String> {
    let mut collected = Vec::new();
    for item in items {
        match item {
            Value::String(s) if !s.trim().is_empty() => collected.push(s.trim().to_string()),
            Value::Object(inner) => {
                for subkey in SUBKEY_PRIORITY {
                    if let Some(Value::String(s)) = inner.get(*subkey)
                        && !s.trim().is_empty()
                    {
                        collected.push(s.trim().to_string());
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    collected
}

/// Step 2: probe a messages-like sequence
///
/// Traversal never faults; any shape this code does not recognize is skipped
/// and treated as "no result" for that element.
fn probe_message_list(envelope: &CallEnvelope) -> Option<String> {
    let per_message: Vec<String> = match envelope {
        CallEnvelope::MessageList(messages) => {
            messages.iter().filter_map(typed_message_text).collect()
        }
        CallEnvelope::Mapping(map) => {
            let messages = map.get("messages")?.as_array()?;
            messages.iter().filter_map(loose_message_text).collect()
        }
        CallEnvelope::Sequence(items) if items.iter().any(|v| v.get("content").is_some()) => {
            items.iter().filter_map(loose_message_text).collect()
        }
        _ => return None,
    };

    if per_message.is_empty() {
        None
    } else {
        Some(per_message.join("\n"))
    }
}

/// Extract the text of one typed message, if any
fn typed_message_text(message: &Message) -> Option<String> {
    match message.content.as_ref()? {
        MessageContent::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        MessageContent::Fragments(fragments) => {
            let mut out = String::new();
            for fragment in fragments {
                collect_fragment_text(fragment, &mut out);
            }
            (!out.trim().is_empty()).then(|| out.trim().to_string())
        }
        _ => None,
    }
}

/// Extract the text of one loosely shaped message value, if any
fn loose_message_text(value: &Value) -> Option<String> {
    match value.get("content")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(fragments) => {
            let mut out = String::new();
            for fragment in fragments {
                collect_fragment_text(fragment, &mut out);
            }
            (!out.trim().is_empty()).then(|| out.trim().to_string())
        }
        _ => None,
    }
}

/// Recurse through a content fragment collecting string values
///
/// Fragments nest: a fragment's `text` or `content` field may itself be a
/// string, another fragment, or a list of fragments.
fn collect_fragment_text(fragment: &Value, out: &mut String) {
    match fragment {
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for item in items {
                collect_fragment_text(item, out);
            }
        }
        Value::Object(map) => {
            for key in ["text", "content"] {
                if let Some(inner) = map.get(key) {
                    collect_fragment_text(inner, out);
                }
            }
        }
        _ => {}
    }
}

/// Step 3: search the textual representation for a labeled final-output block
fn probe_final_output_block(rendered: &str) -> Option<String> {
    for marker in FINAL_OUTPUT_MARKERS {
        let Some(pos) = rendered.find(marker) else {
            continue;
        };
        let after = &rendered[pos + marker.len()..];
        // A debug rendering lists subsequent sections as "\n- ..." items;
        // the block ends at the next section or at end of text.
        let end = after.find("\n- ").unwrap_or(after.len());
        let block = collapse_blank_runs(after[..end].trim());
        if !block.is_empty() {
            return Some(block);
        }
    }
    None
}

/// Collapse runs of 2+ blank lines to exactly one
fn collapse_blank_runs(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(line);
        previous_blank = blank;
    }
    out.join("\n")
}

/// Step 4: serialize the whole envelope, bounded
///
/// Only structured envelopes are serialized; a string-like envelope's textual
/// form is already what the last-resort step returns, and quoting it would
/// only add JSON escapes. Empty shells (`{}`, `[]`) carry no information and
/// are rejected so the caller's own substitution policy can run instead.
fn probe_serialized(envelope: &CallEnvelope) -> Option<String> {
    if matches!(
        envelope,
        CallEnvelope::PlainText(_) | CallEnvelope::Opaque(_)
    ) {
        return None;
    }
    let serialized = serde_json::to_string(envelope).ok()?;
    if serialized == "{}" || serialized == "[]" {
        return None;
    }
    if serialized.chars().count() > MAX_SERIALIZED_CHARS {
        Some(serialized.chars().take(MAX_SERIALIZED_CHARS).collect())
    } else {
        Some(serialized)
    }
}
