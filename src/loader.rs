//! Document loading from various sources.
//!
//! Handles loading OpenAPI documents from files, strings, and HTTP URLs,
//! in JSON or YAML, and detecting which dialect they are written in.

use std::path::Path;

use serde_json::Value;

use crate::error::ConvertError;
use crate::types::Dialect;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds; Kubernetes specs are large).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed source document together with its detected dialect.
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: Value,
    pub dialect: Dialect,
}

impl Document {
    /// Wrap an already-parsed tree, detecting its dialect.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::DialectUndetermined` if neither a `swagger` nor
    /// an `openapi` version marker can be read.
    pub fn from_tree(tree: Value) -> Result<Self, ConvertError> {
        let dialect = detect_dialect(&tree)?;
        Ok(Self { tree, dialect })
    }
}

/// Detect the dialect from the top-level `swagger` or `openapi` field.
pub fn detect_dialect(tree: &Value) -> Result<Dialect, ConvertError> {
    tree.get("swagger")
        .or_else(|| tree.get("openapi"))
        .and_then(Dialect::from_version)
        .ok_or(ConvertError::DialectUndetermined)
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound` if the file doesn't exist,
/// or `ConvertError::InvalidDocument` if the file isn't JSON or YAML.
pub fn load_document(path: &Path) -> Result<Document, ConvertError> {
    Document::from_tree(load_value(path)?)
}

/// Load any JSON or YAML file, with no dialect check.
///
/// Used for generated artifacts and instances to validate.
pub fn load_value(path: &Path) -> Result<Value, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConvertError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    parse_tree(&content)
}

/// Load a document from a JSON or YAML string.
///
/// JSON is tried first so key order and number formatting come straight
/// from `serde_json`; anything else goes through the YAML parser.
pub fn load_document_str(content: &str) -> Result<Document, ConvertError> {
    let tree = parse_tree(content)?;
    Document::from_tree(tree)
}

fn parse_tree(content: &str) -> Result<Value, ConvertError> {
    match serde_json::from_str(content) {
        Ok(tree) => Ok(tree),
        Err(json_err) => serde_yaml::from_str(content).map_err(|yaml_err| {
            ConvertError::InvalidDocument {
                message: format!("not JSON ({}) or YAML ({})", json_err, yaml_err),
            }
        }),
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Document, ConvertError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    // Check for HTTP errors before parsing
    let response = response
        .error_for_status()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    let body = response
        .text()
        .map_err(|source| ConvertError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    load_document_str(&body)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path, `file://` URL or HTTP(S) URL.
pub fn load_document_auto(source: &str) -> Result<Document, ConvertError> {
    if let Some(path) = source.strip_prefix("file://") {
        return load_document(Path::new(path));
    }
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ConvertError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Navigate a JSON Pointer fragment (e.g., "#/definitions/Pet").
///
/// Returns `None` when any segment is missing. An empty fragment or `#`
/// yields the whole tree.
pub fn navigate_fragment<'a>(tree: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Some(tree);
    }

    let mut current = tree;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            other => other.get(&key)?,
        };
    }
    Some(current)
}
