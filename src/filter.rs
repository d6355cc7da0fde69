//! Unsupported-entry filtering.

use crate::error::EntryError;
use crate::names::QualifiedName;
use crate::types::ConvertOptions;

/// Kubernetes kinds that carry JSON Schema documents inside them. Their
/// recursive structure does not survive dereferencing.
const EMBEDDED_SCHEMA_KINDS: &[&str] = &[
    "jsonschemaprops",
    "jsonschemapropsorarray",
    "customresourcevalidation",
    "customresourcedefinition",
    "customresourcedefinitionspec",
    "customresourcedefinitionlist",
    "jsonschemapropsorstringarray",
    "jsonschemapropsorbool",
];

/// Decide whether an entry can be converted under the given options.
///
/// # Errors
///
/// Returns `EntryError::Unsupported` for entries in the deprecated
/// `io.k8s.kubernetes.pkg` namespace, and, when both `kubernetes` and
/// `stand_alone` are set, for kinds that embed JSON Schema.
pub fn check_supported(name: &QualifiedName, options: &ConvertOptions) -> Result<(), EntryError> {
    if name.in_deprecated_namespace() {
        return Err(EntryError::Unsupported {
            name: name.to_string(),
            reason: "uses the deprecated pkg namespace".to_string(),
        });
    }

    if options.kubernetes && options.stand_alone {
        let kind = name.kind().to_lowercase();
        if EMBEDDED_SCHEMA_KINDS.contains(&kind.as_str()) {
            return Err(EntryError::Unsupported {
                name: name.to_string(),
                reason: "embeds JSON Schema and cannot be dereferenced".to_string(),
            });
        }
    }

    Ok(())
}
