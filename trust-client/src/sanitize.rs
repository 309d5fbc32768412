//! Recursive removal of empty and null-like values
//!
//! Operates on `serde_json::Value`. Absence (`None`) is the canonical form of
//! "not provided"; the function is idempotent.

use serde_json::Value;

/// Trimmed, lower-cased strings treated as "not provided"
const NULL_SENTINELS: [&str; 5] = ["", "n/a", "na", "null", "none"];

/// Whether a string is a null sentinel
pub fn is_null_sentinel(text: &str) -> bool {
    let folded = text.trim().to_lowercase();
    NULL_SENTINELS.contains(&folded.as_str())
}

/// Strip nulls, sentinel strings and containers left empty
///
/// Booleans and numbers (including `false` and `0`) are kept. Non-sentinel
/// strings keep their original text.
pub fn sanitize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) => {
            if is_null_sentinel(&text) {
                None
            } else {
                Some(Value::String(text))
            }
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(sanitize).collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Array(kept))
            }
        }
        Value::Object(map) => {
            let kept: serde_json::Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, member)| sanitize(member).map(|clean| (key, clean)))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        scalar @ (Value::Bool(_) | Value::Number(_)) => Some(scalar),
    }
}
