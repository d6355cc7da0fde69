//! Conversion pipeline.
//!
//! Drives every entry of the schema container through filtering, reference
//! rewriting, the optional Kubernetes processors, strictness and
//! dereferencing, then hands the finished artifacts to a [`Sink`].
//!
//! Each entry runs inside its own failure boundary: an [`EntryError`] is
//! logged, recorded in the [`ConversionReport`], and the run moves on. Only
//! the errors in [`ConvertError`] abort a run.

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::components::{body_entries, entries, schema_container};
use crate::deref::{dereference, split_reference, ArtifactStore};
use crate::enrich::{apply_builtin_overrides, enrich_entry};
use crate::error::{ConvertError, EntryError};
use crate::filter::check_supported;
use crate::loader::Document;
use crate::names::QualifiedName;
use crate::normalize::normalize_int_or_string;
use crate::nullable::expand_nullable;
use crate::refs::{convert_nullable, retarget_refs, rewrite_refs, sibling_ref, RefStyle};
use crate::sink::Sink;
use crate::strict::close_objects;
use crate::types::{
    json_type_name, ConvertOptions, Dialect, StageOrder, ALL_FILE, DEFINITIONS_FILE, SCHEMA_URI,
};

/// What happened to one component entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryStatus {
    Converted,
    Skipped {
        #[serde(serialize_with = "display")]
        reason: EntryError,
    },
    Failed {
        #[serde(serialize_with = "display")]
        error: EntryError,
    },
}

fn display<S: Serializer>(err: &EntryError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Per-entry result of a conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct EntryOutcome {
    pub name: String,
    /// Artifact the entry ended up in, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl EntryOutcome {
    pub fn is_converted(&self) -> bool {
        self.status == EntryStatus::Converted
    }
}

/// Summary of a conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub dialect: Dialect,
    /// Artifact names in write order.
    pub artifacts: Vec<String>,
    /// One outcome per entry, in document order.
    pub outcomes: Vec<EntryOutcome>,
}

impl ConversionReport {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            artifacts: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn outcome(&self, name: &str) -> Option<&EntryOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, EntryStatus::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, EntryStatus::Failed { .. }))
            .count()
    }

    fn write(
        &mut self,
        sink: &mut dyn Sink,
        name: &str,
        artifact: &Value,
    ) -> Result<(), ConvertError> {
        sink.write(name, artifact)?;
        if self.artifacts.iter().any(|a| a == name) {
            warn!(artifact = name, "Overwriting artifact written earlier in this run");
        } else {
            self.artifacts.push(name.to_string());
        }
        Ok(())
    }

    fn converted_entry(&mut self, name: &QualifiedName, artifact: &str) {
        debug!(entry = %name, artifact, "Converted");
        self.outcomes.push(EntryOutcome {
            name: name.to_string(),
            artifact: Some(artifact.to_string()),
            status: EntryStatus::Converted,
        });
    }

    fn rejected_entry(&mut self, name: &QualifiedName, err: EntryError) {
        let status = if err.is_skip() {
            warn!(entry = %name, "Skipping: {}", err);
            EntryStatus::Skipped { reason: err }
        } else {
            error!(entry = %name, "An error occurred processing entry: {}", err);
            EntryStatus::Failed { error: err }
        };
        self.outcomes.push(EntryOutcome {
            name: name.to_string(),
            artifact: None,
            status,
        });
    }
}

/// Convert a loaded document, writing every artifact to `sink`.
///
/// # Errors
///
/// Returns `ConvertError::MissingContainer` when the document has no schema
/// container, `ConvertError::RootNotFound`/`RootFailed` in root mode, and
/// any error the sink reports.
///
/// # Example
///
/// ```
/// use openapi2jsonschema::{convert, load_document_str, ConvertOptions, MemorySink};
///
/// let doc = load_document_str(r#"{
///     "swagger": "2.0",
///     "definitions": { "Pet": { "properties": { "name": { "type": "string" } } } }
/// }"#).unwrap();
///
/// let mut sink = MemorySink::new();
/// let report = convert(&doc, &ConvertOptions::new(), &mut sink).unwrap();
/// assert_eq!(report.converted(), 1);
/// assert_eq!(sink.names(), vec!["_definitions.json", "Pet.json", "all.json"]);
/// ```
pub fn convert(
    document: &Document,
    options: &ConvertOptions,
    sink: &mut dyn Sink,
) -> Result<ConversionReport, ConvertError> {
    let dialect = document.dialect;
    let mut container = schema_container(document)?.clone();

    if options.include_bodies {
        match (dialect, document.tree.get("paths")) {
            (Dialect::OpenApi3, Some(paths)) => {
                let bodies = body_entries(paths);
                info!(count = bodies.len(), "Adding request and response body schemas");
                for (name, schema) in bodies {
                    container.entry(name).or_insert(schema);
                }
            }
            (Dialect::Swagger2, _) => {
                warn!("Body schemas are only extracted from OpenAPI 3 documents")
            }
            (Dialect::OpenApi3, None) => {}
        }
    }

    let prepared = Prepared::new(&container, options);
    match &options.root {
        Some(root) => convert_root(root, &prepared, dialect, options, sink),
        None => convert_per_type(&prepared, dialect, options, sink),
    }
}

/// Container after the whole-document Kubernetes processors ran.
struct Prepared {
    schemas: Map<String, Value>,
    /// Entries whose enrichment failed; they keep the normalized schema but
    /// are reported as failed.
    failures: HashMap<String, EntryError>,
}

impl Prepared {
    fn new(container: &Map<String, Value>, options: &ConvertOptions) -> Self {
        if !options.kubernetes {
            return Self {
                schemas: container.clone(),
                failures: HashMap::new(),
            };
        }

        let mut schemas = Map::new();
        let mut failures = HashMap::new();
        for (name, schema) in apply_builtin_overrides(container) {
            let normalized = normalize_int_or_string(&schema);
            match enrich_entry(&normalized) {
                Ok(enriched) => {
                    schemas.insert(name, enriched);
                }
                Err(err) => {
                    failures.insert(name.clone(), err);
                    schemas.insert(name, normalized);
                }
            }
        }
        Self { schemas, failures }
    }

    fn check(&self, name: &QualifiedName) -> Result<(), EntryError> {
        match self.failures.get(name.as_str()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Output file name of an entry in per-type mode.
///
/// Kinds shared between API groups collide unless expanded naming is on;
/// the entry converted last wins.
pub fn artifact_name(name: &QualifiedName, options: &ConvertOptions) -> Result<String, EntryError> {
    let stem = if options.expanded_naming() {
        name.expanded()?
    } else {
        name.kind().to_string()
    };
    Ok(format!("{}.json", stem))
}

/// Run the strictness and nullability passes in the configured order.
fn apply_passes(schema: &Value, options: &ConvertOptions) -> Value {
    let strict = |s: Value| if options.strict { close_objects(&s) } else { s };
    let nullable = |s: Value| {
        if options.kubernetes {
            expand_nullable(&s)
        } else {
            s
        }
    };
    match options.stage_order {
        StageOrder::StrictFirst => nullable(strict(schema.clone())),
        StageOrder::NullableFirst => strict(nullable(schema.clone())),
    }
}

fn transform(
    schema: &Value,
    style: &RefStyle,
    dialect: Dialect,
    options: &ConvertOptions,
) -> Result<Value, EntryError> {
    let rewritten = rewrite_refs(schema, style)?;
    let rewritten = match dialect {
        Dialect::Swagger2 => rewritten,
        Dialect::OpenApi3 => convert_nullable(&rewritten),
    };
    Ok(apply_passes(&rewritten, options))
}

/// Put `$schema` first and default `type` to `object`.
fn stamp(schema: Value) -> Result<Map<String, Value>, EntryError> {
    let map = match schema {
        Value::Object(map) => map,
        other => {
            return Err(EntryError::StructuralAssumption {
                path: String::new(),
                message: format!("expected object schema, got {}", json_type_name(&other)),
            })
        }
    };
    let mut result = Map::new();
    result.insert("$schema".to_string(), Value::from(SCHEMA_URI));
    for (key, value) in map {
        if key != "$schema" {
            result.insert(key, value);
        }
    }
    result
        .entry("type")
        .or_insert_with(|| Value::from("object"));
    Ok(result)
}

/// Location the shared definitions are referenced under.
fn shared_location(prefix: &str) -> &str {
    match split_reference(prefix).0 {
        "" => DEFINITIONS_FILE,
        location => location,
    }
}

fn convert_per_type(
    prepared: &Prepared,
    dialect: Dialect,
    options: &ConvertOptions,
    sink: &mut dyn Sink,
) -> Result<ConversionReport, ConvertError> {
    let style = RefStyle::for_dialect(dialect, &options.prefix);
    let mut report = ConversionReport::new(dialect);
    let mut store = ArtifactStore::new();

    if dialect == Dialect::Swagger2 {
        info!("Generating shared definitions");
        let definitions: Map<String, Value> = prepared
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), apply_passes(schema, options)))
            .collect();
        let shared = json!({ "definitions": definitions });
        report.write(sink, DEFINITIONS_FILE, &shared)?;
        store.insert(shared_location(&options.prefix), shared);
    }

    info!("Generating individual schemas");
    let mut pending = Vec::new();
    for entry in entries(&prepared.schemas) {
        debug!(entry = %entry.name, "Processing");
        let result = check_supported(&entry.name, options)
            .and_then(|()| prepared.check(&entry.name))
            .and_then(|()| {
                let artifact = artifact_name(&entry.name, options)?;
                let schema = transform(&entry.schema, &style, dialect, options)?;
                Ok((artifact, schema))
            });
        if let (Dialect::OpenApi3, Ok((_, schema))) = (dialect, &result) {
            store.insert(sibling_ref(entry.name.as_str()), schema.clone());
        }
        pending.push((entry.name, result));
    }

    // Sibling refs name the entry, files are named by kind
    let renames: HashMap<String, String> = match dialect {
        Dialect::Swagger2 => HashMap::new(),
        Dialect::OpenApi3 => pending
            .iter()
            .filter_map(|(name, result)| {
                let (artifact, _) = result.as_ref().ok()?;
                let reference = sibling_ref(name.as_str());
                (reference != *artifact).then(|| (reference, artifact.clone()))
            })
            .collect(),
    };

    let mut union = Vec::new();
    for (name, result) in pending {
        let result = result.and_then(|(artifact, schema)| {
            let schema = if options.stand_alone {
                let base = sibling_ref(name.as_str());
                dereference(&schema, &base, &store, options.cycle_policy)?
            } else {
                schema
            };
            let schema = retarget_refs(&schema, &renames);
            Ok((artifact, Value::Object(stamp(schema)?)))
        });
        match result {
            Ok((artifact, schema)) => {
                report.write(sink, &artifact, &schema)?;
                let reference = match dialect {
                    Dialect::Swagger2 => style.entry_ref(name.as_str()),
                    Dialect::OpenApi3 => artifact.clone(),
                };
                union.push(json!({ "$ref": reference }));
                report.converted_entry(&name, &artifact);
            }
            Err(err) => report.rejected_entry(&name, err),
        }
    }

    info!("Generating schema for all types");
    report.write(sink, ALL_FILE, &json!({ "oneOf": union }))?;
    Ok(report)
}

fn convert_root(
    root: &str,
    prepared: &Prepared,
    dialect: Dialect,
    options: &ConvertOptions,
    sink: &mut dyn Sink,
) -> Result<ConversionReport, ConvertError> {
    let root_schema = prepared
        .schemas
        .get(root)
        .ok_or_else(|| ConvertError::RootNotFound {
            name: root.to_string(),
        })?;
    let root_name = QualifiedName::parse(root);
    let artifact = format!("{}.json", root);
    let style = RefStyle::LocalDefinitions;
    let mut report = ConversionReport::new(dialect);

    info!(root, "Generating standalone schema");
    let root_result = check_supported(&root_name, options)
        .and_then(|()| prepared.check(&root_name))
        .and_then(|()| transform(root_schema, &style, dialect, options))
        .and_then(stamp);
    let mut contents = root_result.map_err(|source| ConvertError::RootFailed {
        name: root.to_string(),
        source,
    })?;

    info!("Incorporating individual schemas");
    let mut definitions = match contents.shift_remove("definitions") {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    for entry in entries(&prepared.schemas) {
        if entry.name.as_str() == root {
            report.converted_entry(&entry.name, &artifact);
            continue;
        }
        debug!(entry = %entry.name, "Merging schema");
        let result = check_supported(&entry.name, options)
            .and_then(|()| prepared.check(&entry.name))
            .and_then(|()| transform(&entry.schema, &style, dialect, options));
        match result {
            Ok(mut schema) => {
                if let Value::Object(map) = &mut schema {
                    map.entry("type").or_insert_with(|| Value::from("object"));
                }
                definitions.insert(entry.name.to_string(), schema);
                report.converted_entry(&entry.name, &artifact);
            }
            Err(err) => report.rejected_entry(&entry.name, err),
        }
    }
    contents.insert("definitions".to_string(), Value::Object(definitions));

    // The root is the document itself, not one of its definitions
    let targets = HashMap::from([(style.entry_ref(root), "#".to_string())]);
    let contents = retarget_refs(&Value::Object(contents), &targets);
    report.write(sink, &artifact, &contents)?;
    Ok(report)
}
