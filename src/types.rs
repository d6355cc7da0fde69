//! Core types for OpenAPI to JSON Schema conversion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Meta-schema URI stamped on every generated artifact.
pub const SCHEMA_URI: &str = "http://json-schema.org/schema#";

/// Default reference prefix for the shared definitions file.
pub const DEFAULT_PREFIX: &str = "_definitions.json";

/// File name of the shared definitions artifact (pre-3.0 only).
pub const DEFINITIONS_FILE: &str = "_definitions.json";

/// File name of the union-of-all-types artifact.
pub const ALL_FILE: &str = "all.json";

/// Kubernetes extension carrying group/version/kind triples.
pub const GVK_EXTENSION: &str = "x-kubernetes-group-version-kind";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Keywords whose value maps names to schemas, rather than being a schema.
pub(crate) const SCHEMA_MAPS: &[&str] = &["properties", "patternProperties", "definitions", "$defs"];

/// Keywords holding instance data, never schemas.
const LITERAL_KEYWORDS: &[&str] = &["enum", "const", "default", "example", "examples"];

/// True for keywords (and `x-` extensions) whose value is data, not a schema.
pub(crate) fn is_literal_keyword(key: &str) -> bool {
    LITERAL_KEYWORDS.contains(&key) || key.starts_with("x-")
}

/// Schema description dialect of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Swagger 2.x and older: schemas under `definitions`.
    Swagger2,
    /// OpenAPI 3.x and newer: schemas under `components.schemas`.
    OpenApi3,
}

impl Dialect {
    /// Parse a version marker (`"2.0"`, `"3.0.1"`, or a bare YAML number).
    ///
    /// Returns `None` when no leading major version can be read.
    pub fn from_version(version: &Value) -> Option<Self> {
        let text = match version {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let major: u32 = text.trim().split('.').next()?.parse().ok()?;
        Some(if major < 3 {
            Dialect::Swagger2
        } else {
            Dialect::OpenApi3
        })
    }

    /// JSON Pointer segments of the schema container.
    pub fn container_path(&self) -> &'static [&'static str] {
        match self {
            Dialect::Swagger2 => &["definitions"],
            Dialect::OpenApi3 => &["components", "schemas"],
        }
    }
}

/// Order in which the nullability and strictness passes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageOrder {
    #[default]
    StrictFirst,
    NullableFirst,
}

/// What the dereferencer does when inlining would loop forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Keep the cycle as a pointer into the artifact's own `definitions`.
    #[default]
    BackReference,
    /// Fail the entry with `EntryError::ReferenceCycle`.
    Fail,
}

/// One `x-kubernetes-group-version-kind` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Prefix for shared-definition refs (pre-3.0 only).
    pub prefix: String,
    /// When set, assemble one standalone document for this entry.
    pub root: Option<String>,
    /// Inline every reference so each artifact is self-contained.
    pub stand_alone: bool,
    /// Name artifacts `kind[-group]-version` (requires `kubernetes`).
    pub expanded: bool,
    /// Enable Kubernetes-specific processors.
    pub kubernetes: bool,
    /// Close object schemas with `additionalProperties: false`.
    pub strict: bool,
    /// Also emit request/response body schemas found under `paths` (3.0+).
    pub include_bodies: bool,
    pub stage_order: StageOrder,
    pub cycle_policy: CyclePolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            root: None,
            stand_alone: false,
            expanded: false,
            kubernetes: false,
            strict: false,
            include_bodies: false,
            stage_order: StageOrder::default(),
            cycle_policy: CyclePolicy::default(),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn stand_alone(mut self, stand_alone: bool) -> Self {
        self.stand_alone = stand_alone;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn kubernetes(mut self, kubernetes: bool) -> Self {
        self.kubernetes = kubernetes;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn include_bodies(mut self, include_bodies: bool) -> Self {
        self.include_bodies = include_bodies;
        self
    }

    pub fn stage_order(mut self, order: StageOrder) -> Self {
        self.stage_order = order;
        self
    }

    pub fn cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Expanded artifact names only make sense with Kubernetes metadata.
    pub fn expanded_naming(&self) -> bool {
        self.kubernetes && self.expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dialect_from_version_strings() {
        assert_eq!(Dialect::from_version(&json!("2.0")), Some(Dialect::Swagger2));
        assert_eq!(Dialect::from_version(&json!("1.2")), Some(Dialect::Swagger2));
        assert_eq!(Dialect::from_version(&json!("3.0.3")), Some(Dialect::OpenApi3));
        assert_eq!(Dialect::from_version(&json!("3.1.0")), Some(Dialect::OpenApi3));
    }

    #[test]
    fn dialect_from_yaml_number() {
        assert_eq!(Dialect::from_version(&json!(2.0)), Some(Dialect::Swagger2));
        assert_eq!(Dialect::from_version(&json!(3)), Some(Dialect::OpenApi3));
    }

    #[test]
    fn dialect_from_garbage() {
        assert_eq!(Dialect::from_version(&json!("latest")), None);
        assert_eq!(Dialect::from_version(&json!(null)), None);
        assert_eq!(Dialect::from_version(&json!({"major": 3})), None);
    }

    #[test]
    fn api_version_with_and_without_group() {
        let core = GroupVersionKind {
            group: String::new(),
            version: "v1".into(),
            kind: "Pod".into(),
        };
        assert_eq!(core.api_version(), "v1");

        let apps = GroupVersionKind {
            group: "apps".into(),
            version: "v1".into(),
            kind: "Deployment".into(),
        };
        assert_eq!(apps.api_version(), "apps/v1");
    }

    #[test]
    fn expanded_naming_needs_kubernetes() {
        let opts = ConvertOptions::new().expanded(true);
        assert!(!opts.expanded_naming());
        let opts = opts.kubernetes(true);
        assert!(opts.expanded_naming());
    }

    #[test]
    fn default_options() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.prefix, "_definitions.json");
        assert!(opts.root.is_none());
        assert_eq!(opts.stage_order, StageOrder::StrictFirst);
        assert_eq!(opts.cycle_policy, CyclePolicy::BackReference);
    }
}
