//! Reference inlining for standalone output.
//!
//! Walks an already-rewritten artifact, resolves each `$ref` through a
//! [`Resolver`], and replaces the pointer with the target's content. Refs
//! found inside inlined content are resolved relative to the document that
//! content came from, so `#/definitions/X` inside the shared definitions
//! file stays pointed at that file.
//!
//! Cycles are either preserved as back-references into the artifact's own
//! `definitions` map, or reported as [`EntryError::ReferenceCycle`],
//! depending on [`CyclePolicy`].

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::error::EntryError;
use crate::loader::navigate_fragment;
use crate::types::CyclePolicy;

/// Content a reference points at, and the document it lives in.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub value: Value,
    pub location: String,
}

/// Looks up the target of a reference.
pub trait Resolver {
    /// Resolve `reference` as seen from the document at `base`.
    fn resolve(&self, reference: &str, base: &str) -> Result<Resolved, EntryError>;
}

/// Split `file.json#/a/b` into `("file.json", "#/a/b")`.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.find('#') {
        Some(idx) => (&reference[..idx], &reference[idx..]),
        None => (reference, ""),
    }
}

/// Location of the document a reference points into, relative to `base`.
pub fn target_location(reference: &str, base: &str) -> String {
    let (document, _) = split_reference(reference);
    if document.is_empty() {
        return base.to_string();
    }
    if document.contains("://") || document.starts_with('/') {
        return document.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], document),
        None => document.to_string(),
    }
}

/// Identity of a reference target, used for cycle detection.
fn target_key(reference: &str, base: &str) -> String {
    let (_, fragment) = split_reference(reference);
    let fragment = if fragment.is_empty() { "#" } else { fragment };
    format!("{}{}", target_location(reference, base), fragment)
}

/// In-memory resolver over already-assembled artifacts.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    documents: HashMap<String, Value>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, document: Value) {
        self.documents.insert(location.into(), document);
    }

    pub fn contains(&self, location: &str) -> bool {
        self.documents.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Resolver for ArtifactStore {
    fn resolve(&self, reference: &str, base: &str) -> Result<Resolved, EntryError> {
        let location = target_location(reference, base);
        let document = self
            .documents
            .get(&location)
            .ok_or_else(|| EntryError::UnresolvedReference {
                reference: reference.to_string(),
                message: format!("no document at {}", location),
            })?;
        let (_, fragment) = split_reference(reference);
        let value = navigate_fragment(document, fragment).ok_or_else(|| {
            EntryError::UnresolvedReference {
                reference: reference.to_string(),
                message: format!("fragment not found in {}", location),
            }
        })?;
        Ok(Resolved {
            value: value.clone(),
            location,
        })
    }
}

/// Inline every reference in `schema`, which lives at `base`.
///
/// # Errors
///
/// Returns `EntryError::UnresolvedReference` when the resolver cannot find a
/// target, and `EntryError::ReferenceCycle` for cycles under
/// `CyclePolicy::Fail`.
pub fn dereference(
    schema: &Value,
    base: &str,
    resolver: &dyn Resolver,
    policy: CyclePolicy,
) -> Result<Value, EntryError> {
    let root_key = format!("{}#", base);
    let mut state = Dereferencer {
        resolver,
        policy,
        root_key: root_key.clone(),
        in_progress: vec![root_key],
        back_refs: HashMap::new(),
        reserved: schema
            .get("definitions")
            .and_then(Value::as_object)
            .map(|existing| existing.keys().cloned().collect())
            .unwrap_or_default(),
        definitions: Map::new(),
    };
    let mut result = state.walk(schema, base)?;

    if !state.definitions.is_empty() {
        if let Value::Object(map) = &mut result {
            let existing = map
                .entry("definitions")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(existing) = existing {
                for (name, definition) in state.definitions {
                    existing.entry(name).or_insert(definition);
                }
            }
        }
    }
    Ok(result)
}

struct Dereferencer<'r> {
    resolver: &'r dyn Resolver,
    policy: CyclePolicy,
    root_key: String,
    /// Targets currently being inlined, outermost first.
    in_progress: Vec<String>,
    /// Target key → local definition name, for targets reached cyclically.
    back_refs: HashMap<String, String>,
    /// Names the schema's own `definitions` already use.
    reserved: HashSet<String>,
    definitions: Map<String, Value>,
}

impl Dereferencer<'_> {
    fn walk(&mut self, node: &Value, base: &str) -> Result<Value, EntryError> {
        match node {
            Value::Object(map) => match map.get("$ref") {
                Some(Value::String(reference)) => self.inline(map, reference, base),
                _ => {
                    let mut result = Map::new();
                    for (key, child) in map {
                        result.insert(key.clone(), self.walk(child, base)?);
                    }
                    Ok(Value::Object(result))
                }
            },
            Value::Array(items) => {
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    result.push(self.walk(item, base)?);
                }
                Ok(Value::Array(result))
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(node.clone()),
        }
    }

    fn inline(
        &mut self,
        map: &Map<String, Value>,
        reference: &str,
        base: &str,
    ) -> Result<Value, EntryError> {
        let mut siblings = Map::new();
        for (key, child) in map {
            if key != "$ref" {
                siblings.insert(key.clone(), self.walk(child, base)?);
            }
        }

        let key = target_key(reference, base);
        if self.in_progress.contains(&key) {
            let pointer = self.back_reference(&key, reference)?;
            siblings.insert("$ref".to_string(), Value::String(pointer));
            return Ok(Value::Object(siblings));
        }

        let resolved = self.resolver.resolve(reference, base)?;
        self.in_progress.push(key.clone());
        let inlined = self.walk(&resolved.value, &resolved.location);
        self.in_progress.pop();
        let inlined = inlined?;

        if let Some(name) = self.back_refs.get(&key) {
            if !self.definitions.contains_key(name) {
                self.definitions.insert(name.clone(), inlined.clone());
            }
        }

        match inlined {
            Value::Object(target) => {
                for (k, v) in target {
                    siblings.entry(k).or_insert(v);
                }
                Ok(Value::Object(siblings))
            }
            other if siblings.is_empty() => Ok(other),
            other => {
                siblings.insert("allOf".to_string(), Value::Array(vec![other]));
                Ok(Value::Object(siblings))
            }
        }
    }

    /// Pointer that stands in for a target already being inlined.
    fn back_reference(&mut self, key: &str, reference: &str) -> Result<String, EntryError> {
        if self.policy == CyclePolicy::Fail {
            return Err(EntryError::ReferenceCycle {
                reference: reference.to_string(),
            });
        }
        if key == self.root_key {
            return Ok("#".to_string());
        }
        if let Some(name) = self.back_refs.get(key) {
            return Ok(format!("#/definitions/{}", name));
        }

        let name = self.unique_name(local_name(key));
        self.back_refs.insert(key.to_string(), name.clone());
        Ok(format!("#/definitions/{}", name))
    }

    fn unique_name(&self, candidate: String) -> String {
        let taken =
            |name: &str| self.reserved.contains(name) || self.back_refs.values().any(|n| n == name);
        let mut name = candidate.clone();
        let mut suffix = 2;
        while taken(&name) {
            name = format!("{}_{}", candidate, suffix);
            suffix += 1;
        }
        name
    }
}

/// Readable definition name for a target key: the last fragment segment,
/// or the document's file stem.
fn local_name(key: &str) -> String {
    let (document, fragment) = split_reference(key);
    match fragment.trim_start_matches('#').rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => {
            let file = document.rsplit('/').next().unwrap_or(document);
            file.strip_suffix(".json").unwrap_or(file).to_string()
        }
    }
}
