//! Qualified component names.
//!
//! Kubernetes definitions are named `<namespace...>.<group>.<version>.<Kind>`,
//! e.g. `io.k8s.api.apps.v1.Deployment`. Plain OpenAPI documents use bare
//! names like `Pet`, which only have a kind.

use crate::error::EntryError;

/// Segments needed to read group and version from a name.
const VENDOR_MIN_SEGMENTS: usize = 3;

/// Groups whose artifacts omit the group in expanded naming.
const CORE_GROUPS: &[&str] = &["core", "api"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    raw: String,
    segments: Vec<String>,
}

impl QualifiedName {
    pub fn parse(name: &str) -> Self {
        Self {
            raw: name.to_string(),
            segments: name.split('.').map(String::from).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Last dot-separated segment.
    pub fn kind(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or(&self.raw)
    }

    /// Third segment from the end (`apps` in `io.k8s.api.apps.v1.Deployment`).
    pub fn group(&self) -> Result<&str, EntryError> {
        self.from_end(3)
    }

    /// Second segment from the end (`v1` in `io.k8s.api.apps.v1.Deployment`).
    pub fn api_version(&self) -> Result<&str, EntryError> {
        self.from_end(2)
    }

    /// `kind-version` for core groups, `kind-group-version` otherwise.
    pub fn expanded(&self) -> Result<String, EntryError> {
        let group = self.group()?;
        let version = self.api_version()?;
        if CORE_GROUPS.contains(&group) {
            Ok(format!("{}-{}", self.kind(), version))
        } else {
            Ok(format!("{}-{}-{}", self.kind(), group, version))
        }
    }

    /// Names under the long-deprecated `io.k8s.kubernetes.pkg` namespace.
    pub fn in_deprecated_namespace(&self) -> bool {
        self.segments.len() > 3 && self.segments[2] == "kubernetes" && self.segments[3] == "pkg"
    }

    fn from_end(&self, n: usize) -> Result<&str, EntryError> {
        if self.segments.len() < VENDOR_MIN_SEGMENTS {
            return Err(EntryError::NameFormat {
                name: self.raw.clone(),
                min_segments: VENDOR_MIN_SEGMENTS,
            });
        }
        Ok(&self.segments[self.segments.len() - n])
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
