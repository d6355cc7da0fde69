//! Vendor format normalization.
//!
//! Kubernetes marks fields that accept either an integer or a string with
//! `format: int-or-string`, which JSON Schema validators ignore. Such nodes
//! are replaced with an explicit union.

use serde_json::{json, Map, Value};

use crate::types::{is_literal_keyword, SCHEMA_MAPS};

const INT_OR_STRING: &str = "int-or-string";

/// The union schema substituted for `int-or-string` nodes.
pub fn int_or_string_schema() -> Value {
    json!({ "oneOf": [{ "type": "string" }, { "type": "integer" }] })
}

/// Replace every `format: int-or-string` node, at any depth, with a
/// `oneOf` of string and integer. Literal data (`example`, `default`, `x-*`)
/// is copied as is.
pub fn normalize_int_or_string(value: &Value) -> Value {
    normalize(value, false)
}

fn normalize(value: &Value, in_schema_map: bool) -> Value {
    match value {
        Value::Object(map) if !in_schema_map && is_int_or_string(map) => int_or_string_schema(),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let normalized = if !in_schema_map && is_literal_keyword(k) {
                        v.clone()
                    } else {
                        normalize(v, !in_schema_map && SCHEMA_MAPS.contains(&k.as_str()))
                    };
                    (k.clone(), normalized)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|item| normalize(item, false)).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}

fn is_int_or_string(map: &Map<String, Value>) -> bool {
    map.get("format").and_then(Value::as_str) == Some(INT_OR_STRING)
}
