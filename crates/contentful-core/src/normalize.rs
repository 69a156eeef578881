//! Canonical text form for free-form JSON content.
//!
//! Entry fields, role constraints and similar values are kept in state as
//! strings. To keep successive reads byte-stable, JSON strings are re-serialized
//! with object keys sorted recursively. Anything that is not JSON is an opaque
//! literal and passes through unchanged.

use serde_json::{Map, Value};

/// Returns the canonical form of `raw`. Idempotent.
pub fn normalize_json(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => to_canonical_string(&value),
        Err(_) => raw.to_string(),
    }
}

/// Recursively rebuilds every object with its keys in lexicographic order.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key, sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Compact serialization of `value` with sorted keys.
pub fn to_canonical_string(value: &Value) -> String {
    sort_keys(value.clone()).to_string()
}

/// Converts stored content to its wire value: JSON text becomes structured
/// data, anything else is sent as a JSON string.
pub fn content_to_value(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_string()))
}

/// Converts a wire value back to stored content. Plain strings are kept
/// verbatim, everything else is stored as canonical JSON text.
pub fn value_to_content(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => to_canonical_string(other),
    }
}
