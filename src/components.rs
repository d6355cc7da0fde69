//! Component entry extraction.
//!
//! Pulls the named schema definitions out of a document's container
//! (`definitions` or `components.schemas`), and optionally synthesizes
//! extra entries from the request and response bodies declared under
//! `paths`.

use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::loader::Document;
use crate::names::QualifiedName;

/// One named schema definition from the source document.
#[derive(Debug, Clone)]
pub struct ComponentEntry {
    pub name: QualifiedName,
    pub schema: Value,
}

/// Return the schema container as an ordered map.
///
/// # Errors
///
/// Returns `ConvertError::MissingContainer` if the container is absent or
/// not an object.
pub fn schema_container(document: &Document) -> Result<&Map<String, Value>, ConvertError> {
    let path = document.dialect.container_path();
    let mut current = &document.tree;
    for key in path {
        current = current
            .get(*key)
            .ok_or_else(|| missing_container(path))?;
    }
    current.as_object().ok_or_else(|| missing_container(path))
}

fn missing_container(path: &[&str]) -> ConvertError {
    ConvertError::MissingContainer {
        container: path.join("."),
    }
}

/// Split a container into entries, in document order.
pub fn entries(container: &Map<String, Value>) -> Vec<ComponentEntry> {
    container
        .iter()
        .map(|(name, schema)| ComponentEntry {
            name: QualifiedName::parse(name),
            schema: schema.clone(),
        })
        .collect()
}

/// Short type names for well-known body media types.
fn mimetype_type_name(mimetype: &str) -> String {
    match mimetype {
        "application/json" => "json".to_string(),
        "application/vnd.api+json" => "jsonapi".to_string(),
        other => other.replace('/', "_"),
    }
}

/// Schemas from a request body or response object, keyed by
/// `<prefix><type name>`.
fn body_components(body: &Value, prefix: &str) -> Map<String, Value> {
    let mut result = Map::new();
    let Some(content) = body.get("content").and_then(Value::as_object) else {
        return result;
    };
    for (mimetype, definition) in content {
        if let Some(schema) = definition.get("schema") {
            result.insert(
                format!("{}{}", prefix, mimetype_type_name(mimetype)),
                schema.clone(),
            );
        }
    }
    result
}

/// `paths_<path>_<METHOD>_` with `{param}` segments turned into `_param_`.
fn operation_prefix(path: &str, method: &str) -> String {
    let trimmed = path.trim_start_matches('/').replace('/', "_");
    let path_part = if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed
    };
    let raw = format!("paths_{}_{}", path_part, method.to_uppercase());
    let mut prefix = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '{' {
            prefix.push(c);
            continue;
        }
        prefix.push('_');
        for inner in chars.by_ref() {
            if inner == '}' {
                break;
            }
            prefix.push(inner);
        }
        prefix.push('_');
    }
    prefix
}

/// Collect request and response body schemas from an OpenAPI 3 `paths` map.
///
/// Naming: `paths_<path>_<METHOD>_request_<type>` and
/// `paths_<path>_<METHOD>_response_<code>_<type>`. Paths `/` and `/root`
/// collide; the later one wins.
pub fn body_entries(paths: &Value) -> Map<String, Value> {
    let mut components = Map::new();
    let Some(paths) = paths.as_object() else {
        return components;
    };

    for (path, path_item) in paths {
        let Some(operations) = path_item.as_object() else {
            continue;
        };
        for (method, operation) in operations {
            let Some(operation) = operation.as_object() else {
                continue;
            };
            let prefix = operation_prefix(path, method);

            if let Some(request) = operation.get("requestBody") {
                components.extend(body_components(request, &format!("{}_request_", prefix)));
            }
            if let Some(responses) = operation.get("responses").and_then(Value::as_object) {
                for (code, response) in responses {
                    components.extend(body_components(
                        response,
                        &format!("{}_response_{}_", prefix, code),
                    ));
                }
            }
        }
    }
    components
}
