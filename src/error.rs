//! Error types for OpenAPI to JSON Schema conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Document errors (exit code 2)
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("unable to determine OpenAPI version: no usable swagger or openapi field")]
    DialectUndetermined,

    #[error("document has no schema container at {container}")]
    MissingContainer { container: String },

    #[error("unable to find root type '{name}'")]
    RootNotFound { name: String },

    #[error("root type '{name}' cannot be converted: {source}")]
    RootFailed {
        name: String,
        #[source]
        source: EntryError,
    },

    #[error("cannot serialize {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::FileNotFound { .. }
            | ConvertError::ReadError { .. }
            | ConvertError::WriteError { .. } => 3,
            #[cfg(feature = "remote")]
            ConvertError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors scoped to a single component entry.
///
/// These never abort a run: the entry is skipped, the error is logged and
/// recorded in the conversion report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("{name} not currently supported: {reason}")]
    Unsupported { name: String, reason: String },

    #[error("reference cycle through {reference}")]
    ReferenceCycle { reference: String },

    #[error("unexpected structure at {path}: {message}")]
    StructuralAssumption { path: String, message: String },

    #[error("cannot parse name '{name}': expected at least {min_segments} dot-separated segments")]
    NameFormat { name: String, min_segments: usize },

    #[error("cannot resolve reference {reference}: {message}")]
    UnresolvedReference { reference: String, message: String },
}

impl EntryError {
    /// True for entries excluded by policy rather than broken input.
    pub fn is_skip(&self) -> bool {
        matches!(self, EntryError::Unsupported { .. })
    }
}

/// Errors during payload validation against a generated schema.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("schema cannot be compiled: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Convert(e) => e.exit_code(),
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_error_exit_codes() {
        let err = ConvertError::FileNotFound {
            path: PathBuf::from("openapi.yaml"),
        };
        assert_eq!(err.exit_code(), 3);

        assert_eq!(ConvertError::DialectUndetermined.exit_code(), 2);

        let err = ConvertError::RootNotFound {
            name: "Pet".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn validate_error_exit_codes() {
        let err = ValidateError::Invalid {
            errors: vec![SchemaError {
                path: "/name".into(),
                message: "missing required field".into(),
            }],
        };
        assert_eq!(err.exit_code(), 1);

        let err = ValidateError::Convert(ConvertError::DialectUndetermined);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unsupported_is_a_skip() {
        let err = EntryError::Unsupported {
            name: "JSONSchemaProps".into(),
            reason: "carries embedded JSON Schema".into(),
        };
        assert!(err.is_skip());

        let err = EntryError::ReferenceCycle {
            reference: "Node.json".into(),
        };
        assert!(!err.is_skip());
    }

    #[test]
    fn name_format_message() {
        let err = EntryError::NameFormat {
            name: "Pod".into(),
            min_segments: 3,
        };
        assert_eq!(
            err.to_string(),
            "cannot parse name 'Pod': expected at least 3 dot-separated segments"
        );
    }
}
