//! Kubernetes extension enrichment.
//!
//! Kubernetes tags top-level resource definitions with
//! `x-kubernetes-group-version-kind`. Those triples pin down the only valid
//! `apiVersion` and `kind` values of the resource, so they are copied into
//! `enum` constraints on the matching properties.

use serde_json::{json, Map, Value};

use crate::error::EntryError;
use crate::normalize::int_or_string_schema;
use crate::types::{json_type_name, GroupVersionKind, GVK_EXTENSION};

const INT_OR_STRING_NAME: &str = "io.k8s.apimachinery.pkg.util.intstr.IntOrString";
const QUANTITY_NAME: &str = "io.k8s.apimachinery.pkg.api.resource.Quantity";

/// Read the group/version/kind triples of an entry.
///
/// An entry without the extension has none.
pub fn group_version_kinds(schema: &Value) -> Result<Vec<GroupVersionKind>, EntryError> {
    let Some(extension) = schema.get(GVK_EXTENSION) else {
        return Ok(Vec::new());
    };
    serde_json::from_value(extension.clone()).map_err(|e| EntryError::StructuralAssumption {
        path: format!("/{}", GVK_EXTENSION),
        message: e.to_string(),
    })
}

/// Add each triple's `apiVersion` and `kind` to the `enum` of the entry's
/// `apiVersion` and `kind` properties, without duplicates.
///
/// Entries lacking those properties are returned unchanged.
pub fn enrich_entry(schema: &Value) -> Result<Value, EntryError> {
    let triples = group_version_kinds(schema)?;
    if triples.is_empty() {
        return Ok(schema.clone());
    }

    let mut enriched = schema.clone();
    let Some(properties) = enriched.get_mut("properties") else {
        return Ok(enriched);
    };
    let properties = match properties {
        Value::Object(map) => map,
        other => {
            return Err(EntryError::StructuralAssumption {
                path: "/properties".to_string(),
                message: format!("expected object, got {}", json_type_name(other)),
            })
        }
    };

    for triple in &triples {
        if let Some(api_version) = properties.get_mut("apiVersion") {
            append_enum(api_version, triple.api_version(), "/properties/apiVersion")?;
        }
        if let Some(kind) = properties.get_mut("kind") {
            append_enum(kind, triple.kind.clone(), "/properties/kind")?;
        }
    }
    Ok(enriched)
}

/// Append `value` to `schema.enum`, creating the list if needed.
fn append_enum(schema: &mut Value, value: String, path: &str) -> Result<(), EntryError> {
    let map = match schema {
        Value::Object(map) => map,
        other => {
            return Err(EntryError::StructuralAssumption {
                path: path.to_string(),
                message: format!("expected object, got {}", json_type_name(other)),
            })
        }
    };
    let values = match map.entry("enum").or_insert_with(|| Value::Array(Vec::new())) {
        Value::Array(values) => values,
        other => {
            return Err(EntryError::StructuralAssumption {
                path: format!("{}/enum", path),
                message: format!("expected array, got {}", json_type_name(other)),
            })
        }
    };
    if !values.iter().any(|v| v.as_str() == Some(value.as_str())) {
        values.push(Value::String(value));
    }
    Ok(())
}

/// Replace the Kubernetes `IntOrString` and `Quantity` definitions with
/// unions validators understand.
///
/// `Quantity` also accepts numbers: the API itself only takes strings, but
/// almost all Kubernetes tooling accepts `cpu: 1`.
pub fn apply_builtin_overrides(container: &Map<String, Value>) -> Map<String, Value> {
    let mut result = container.clone();
    if let Some(int_or_string) = result.get_mut(INT_OR_STRING_NAME) {
        *int_or_string = int_or_string_schema();
    }
    if let Some(quantity) = result.get_mut(QUANTITY_NAME) {
        *quantity = json!({ "oneOf": [{ "type": "string" }, { "type": "number" }] });
    }
    result
}
