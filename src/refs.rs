//! Reference rewriting.
//!
//! Source documents point at their own schema container
//! (`#/definitions/Pet`, `#/components/schemas/Pet`). Once every entry lives
//! in its own file those pointers have to be redirected: into the shared
//! definitions file, to a sibling file, or into the `definitions` map of a
//! single aggregate document.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::EntryError;
use crate::types::Dialect;

const SWAGGER_PREFIX: &str = "#/definitions/";
const OPENAPI_PREFIX: &str = "#/components/schemas/";

/// How `$ref` values are rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefStyle {
    /// `#/definitions/Pet` → `<prefix>#/definitions/Pet` (pre-3.0).
    SharedPrefix(String),
    /// `#/components/schemas/Pet` → `Pet.json` (3.0+).
    SiblingFile,
    /// Any pointer → `#/definitions/<last segment>` (root mode).
    LocalDefinitions,
}

impl RefStyle {
    /// The per-type style for a dialect.
    pub fn for_dialect(dialect: Dialect, prefix: &str) -> Self {
        match dialect {
            Dialect::Swagger2 => RefStyle::SharedPrefix(prefix.to_string()),
            Dialect::OpenApi3 => RefStyle::SiblingFile,
        }
    }

    /// The ref an output file uses to point at the entry `name`.
    pub fn entry_ref(&self, name: &str) -> String {
        match self {
            RefStyle::SharedPrefix(prefix) => shared_ref(prefix, name),
            RefStyle::SiblingFile => sibling_ref(name),
            RefStyle::LocalDefinitions => format!("{}{}", SWAGGER_PREFIX, name),
        }
    }
}

/// Join the shared-definitions prefix and an entry name.
///
/// A prefix that already carries a fragment (`_definitions.json#/definitions/`)
/// is used as is; a bare location (`_definitions.json`) gets
/// `#/definitions/` inserted.
pub fn shared_ref(prefix: &str, name: &str) -> String {
    if prefix.contains('#') {
        format!("{}{}", prefix, name)
    } else {
        format!("{}{}{}", prefix, SWAGGER_PREFIX, name)
    }
}

/// File name of the sibling artifact for an entry.
pub fn sibling_ref(name: &str) -> String {
    format!("{}.json", name)
}

/// Rewrite a single reference.
///
/// Refs already in the target form are returned unchanged, so rewriting is
/// idempotent.
pub fn rewrite_ref(reference: &str, style: &RefStyle, path: &str) -> Result<String, EntryError> {
    match style {
        RefStyle::SharedPrefix(prefix) => Ok(match reference.strip_prefix(SWAGGER_PREFIX) {
            Some(name) => shared_ref(prefix, name),
            None => reference.to_string(),
        }),
        RefStyle::SiblingFile => Ok(match reference.strip_prefix(OPENAPI_PREFIX) {
            Some(name) => sibling_ref(name),
            None => reference.to_string(),
        }),
        RefStyle::LocalDefinitions => match reference.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => Ok(format!("{}{}", SWAGGER_PREFIX, name)),
            _ => Err(EntryError::StructuralAssumption {
                path: path.to_string(),
                message: format!("unable to extract a type name from {}", reference),
            }),
        },
    }
}

/// Rewrite every `$ref` string in a tree.
pub fn rewrite_refs(value: &Value, style: &RefStyle) -> Result<Value, EntryError> {
    rewrite_value(value, style, "")
}

fn rewrite_value(value: &Value, style: &RefStyle, path: &str) -> Result<Value, EntryError> {
    match value {
        Value::Object(map) => {
            let mut result = Map::new();
            for (key, child) in map {
                let child_path = format!("{}/{}", path, key);
                let rewritten = match child {
                    Value::String(reference) if key == "$ref" => {
                        Value::String(rewrite_ref(reference, style, &child_path)?)
                    }
                    other => rewrite_value(other, style, &child_path)?,
                };
                result.insert(key.clone(), rewritten);
            }
            Ok(Value::Object(result))
        }
        Value::Array(items) => {
            let mut result = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                result.push(rewrite_value(item, style, &format!("{}/{}", path, i))?);
            }
            Ok(Value::Array(result))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(value.clone()),
    }
}

/// Replace every `$ref` that is a key of `targets` with the mapped value.
///
/// Only exact matches are replaced; fragments and prefixes are left alone.
pub fn retarget_refs(value: &Value, targets: &HashMap<String, String>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| {
                    let retargeted = match child {
                        Value::String(reference) if key == "$ref" => targets
                            .get(reference)
                            .map_or_else(|| child.clone(), |to| Value::from(to.as_str())),
                        other => retarget_refs(other, targets),
                    };
                    (key.clone(), retargeted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| retarget_refs(item, targets))
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}

/// Turn OpenAPI 3 `nullable: true` into a JSON Schema type union.
///
/// The marker is consumed only where a sibling `type` exists to widen;
/// `"null"` is added at most once.
pub fn convert_nullable(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let consume =
                map.get("nullable") == Some(&Value::Bool(true)) && map.contains_key("type");
            let mut result = Map::new();
            for (key, child) in map {
                if consume && key == "nullable" {
                    continue;
                }
                let mut converted = convert_nullable(child);
                if consume && key == "type" {
                    add_null(&mut converted);
                }
                result.insert(key.clone(), converted);
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.iter().map(convert_nullable).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}

fn add_null(type_value: &mut Value) {
    match type_value {
        Value::String(t) if t.as_str() != "null" => {
            let t = std::mem::take(t);
            *type_value = Value::Array(vec![Value::String(t), Value::from("null")]);
        }
        Value::Array(types) if !types.iter().any(|t| t == "null") => {
            types.push(Value::from("null"));
        }
        _ => {}
    }
}
