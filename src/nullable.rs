//! Nullability expansion for optional fields.
//!
//! Kubernetes clients routinely send `null` for optional fields. Every
//! `type` of a field that its owning object schema does not list in
//! `required` is widened to also accept `null`.

use serde_json::{Map, Value};

use crate::types::{is_literal_keyword, SCHEMA_MAPS};

/// Where a node sits in the tree.
///
/// For a property schema, `parent` is the `properties` container and
/// `grandparent` is the object schema that owns the `required` list.
#[derive(Clone, Copy, Default)]
struct Ancestors<'a> {
    parent: Option<&'a Map<String, Value>>,
    grandparent: Option<&'a Map<String, Value>>,
    key: Option<&'a str>,
    /// The node maps names to schemas, so its keys are not keywords.
    in_schema_map: bool,
}

impl Ancestors<'_> {
    fn is_required(&self) -> bool {
        let (Some(owner), Some(key)) = (self.grandparent, self.key) else {
            return false;
        };
        owner
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().any(|r| r.as_str() == Some(key)))
            .unwrap_or(false)
    }
}

/// Widen the `type` of every optional field to include `"null"`.
///
/// The document root's own `type` is left alone. Items of a list (such as
/// `oneOf` branches) share the requiredness of the field that owns the list.
pub fn expand_nullable(schema: &Value) -> Value {
    walk(schema, Ancestors::default())
}

fn walk(node: &Value, ancestors: Ancestors<'_>) -> Value {
    match node {
        Value::Object(map) => {
            let mut result = Map::new();
            for (key, value) in map {
                let expanded = match value {
                    _ if !ancestors.in_schema_map && is_literal_keyword(key) => value.clone(),
                    Value::String(_) | Value::Array(_)
                        if key == "type" && ancestors.key.is_some() =>
                    {
                        if ancestors.is_required() {
                            value.clone()
                        } else {
                            widen(value)
                        }
                    }
                    Value::Object(_) => walk(
                        value,
                        Ancestors {
                            parent: Some(map),
                            grandparent: ancestors.parent,
                            key: Some(key),
                            in_schema_map: SCHEMA_MAPS.contains(&key.as_str()),
                        },
                    ),
                    Value::Array(items) => {
                        let ancestors = Ancestors {
                            in_schema_map: false,
                            ..ancestors
                        };
                        Value::Array(items.iter().map(|item| walk(item, ancestors)).collect())
                    }
                    Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                        value.clone()
                    }
                };
                result.insert(key.clone(), expanded);
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| walk(item, ancestors)).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => node.clone(),
    }
}

/// Add `"null"` to a type, once.
fn widen(type_value: &Value) -> Value {
    match type_value {
        Value::String(t) if t == "null" => type_value.clone(),
        Value::String(t) => Value::Array(vec![Value::String(t.clone()), Value::from("null")]),
        Value::Array(types) if types.iter().any(|t| t == "null") => type_value.clone(),
        Value::Array(types) => {
            let mut widened = types.clone();
            widened.push(Value::from("null"));
            Value::Array(widened)
        }
        other => other.clone(),
    }
}
