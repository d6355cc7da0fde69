//! Strict mode: closed object schemas.
//!
//! Mirrors what `kubectl` validation does: an object schema that lists its
//! `properties` rejects anything else.

use serde_json::{Map, Value};

use crate::types::{is_literal_keyword, SCHEMA_MAPS};

/// Set `additionalProperties: false` on every schema that declares
/// `properties` but says nothing about additional ones, at any depth.
///
/// An explicit `additionalProperties` (boolean or schema) is never
/// overwritten.
pub fn close_objects(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(close_schema(map)),
        Value::Array(items) => Value::Array(items.iter().map(close_objects).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => schema.clone(),
    }
}

/// Apply strict mode to each schema of a name-to-schema map.
pub fn close_schema_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(name, schema)| (name.clone(), close_objects(schema)))
        .collect()
}

fn close_schema(map: &Map<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in map {
        let closed = match value {
            _ if is_literal_keyword(key) => value.clone(),
            Value::Object(children) if SCHEMA_MAPS.contains(&key.as_str()) => {
                Value::Object(close_schema_map(children))
            }
            other => close_objects(other),
        };
        result.insert(key.clone(), closed);
    }

    if result.contains_key("properties") && !result.contains_key("additionalProperties") {
        result.insert("additionalProperties".to_string(), Value::Bool(false));
    }
    result
}
