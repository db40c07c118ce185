//! Best-effort coercion of loosely-typed configuration values
//!
//! Exporter settings arrive as untyped JSON. Values of an unexpected shape are
//! formatted rather than rejected, and this module is the only place that
//! formatting happens.

use serde_json::Value;
use std::collections::BTreeMap;

/// Format any value as a string
///
/// Strings are returned verbatim, scalars use their plain representation,
/// `null` becomes the empty string, and arrays/objects are rendered as
/// compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Interpret a value as a boolean
///
/// Accepts JSON booleans and the strings `true`/`false` (any case).
/// Anything else yields `None`.
pub fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Interpret a value as a non-negative integer
///
/// Accepts unsigned JSON numbers and numeric strings.
pub fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flatten a key/value object into string pairs
///
/// Non-object values produce an empty map.
pub fn value_to_string_map(value: &Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(key, val)| (key.clone(), value_to_string(val)))
                .collect()
        })
        .unwrap_or_default()
}
