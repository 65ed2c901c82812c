//! Property tests for the extraction cascade
//!
//! The cascade's contract is totality: any envelope a collaborator can hand
//! back yields a string without panicking, and the well-known shapes yield
//! exactly the text they carry.

use deskroute::agent::CallEnvelope;
use deskroute::extract::extract_text;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

/// Arbitrary JSON values, nested a few levels deep
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[ -~]{0,40}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,12}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strings that survive trimming
fn nonblank_text() -> impl Strategy<Value = String> {
    "[ -~]{1,60}".prop_filter("must not be blank", |s| !s.trim().is_empty())
}

proptest! {
    #[test]
    fn extraction_is_total_over_arbitrary_json(value in arb_json()) {
        let envelope = CallEnvelope::from_value(value);
        // Must complete without panicking for any shape
        let _ = extract_text(&envelope);
    }

    #[test]
    fn extraction_is_total_over_arbitrary_opaque_text(text in "[ -~\\n]{0,200}") {
        let _ = extract_text(&CallEnvelope::Opaque(text));
    }

    #[test]
    fn nonblank_plain_text_extracts_to_its_trimmed_form(text in nonblank_text()) {
        let envelope = CallEnvelope::PlainText(text.clone());
        prop_assert_eq!(extract_text(&envelope), text.trim());
    }

    #[test]
    fn blank_plain_text_extracts_to_empty(padding in "[ \\t\\n]{0,20}") {
        let envelope = CallEnvelope::PlainText(padding);
        prop_assert_eq!(extract_text(&envelope), "");
    }

    #[test]
    fn output_text_field_wins_regardless_of_sibling_noise(
        text in nonblank_text(),
        noise in arb_json(),
    ) {
        let mut map = Map::new();
        map.insert("output_text".to_string(), Value::String(text.clone()));
        map.insert("zz_sibling".to_string(), noise);
        let envelope = CallEnvelope::Mapping(map);
        prop_assert_eq!(extract_text(&envelope), text.trim());
    }

    #[test]
    fn final_output_field_wins_over_lower_priority_fields(
        winner in nonblank_text(),
        loser in nonblank_text(),
    ) {
        let envelope = CallEnvelope::from_value(json!({
            "final_output": winner.clone(),
            "text": loser,
        }));
        prop_assert_eq!(extract_text(&envelope), winner.trim());
    }

    #[test]
    fn serialized_fallback_never_exceeds_its_cap(payload in "[a-z]{0,100}") {
        // A mapping with no recognized fields falls back to serialization,
        // which is bounded even for very large payloads.
        let envelope = CallEnvelope::from_value(json!({
            "unrecognized": payload.repeat(300),
        }));
        prop_assert!(extract_text(&envelope).chars().count() <= 10_000);
    }
}
