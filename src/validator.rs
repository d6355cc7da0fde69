//! Instance validation against generated artifacts.
//!
//! Only self-contained artifacts (root mode or standalone output) can be
//! compiled here; per-type artifacts still point at sibling files.

use std::path::Path;

use serde_json::Value;

use crate::error::{SchemaError, ValidateError};
use crate::loader::load_value;

/// Compile an artifact as a Draft 4 schema.
///
/// The emitted `$schema` URI is the unversioned one, so it is dropped before
/// compiling and the draft is set explicitly.
fn compile(schema: &Value) -> Result<jsonschema::Validator, ValidateError> {
    let mut schema = schema.clone();
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
    }
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft4)
        .build(&schema)
        .map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })
}

/// Check that an artifact compiles.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` when it does not.
pub fn check_schema(schema: &Value) -> Result<(), ValidateError> {
    compile(schema).map(|_| ())
}

/// Validate an instance against a generated artifact.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the artifact cannot be
/// compiled, or `ValidateError::Invalid` with every violation found.
pub fn validate_instance(schema: &Value, instance: &Value) -> Result<(), ValidateError> {
    let validator = compile(schema)?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(instance)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

/// Load an artifact and an instance (JSON or YAML) and validate.
pub fn validate_files(schema: &Path, instance: &Path) -> Result<(), ValidateError> {
    let schema = load_value(schema)?;
    let instance = load_value(instance)?;
    validate_instance(&schema, &instance)
}
