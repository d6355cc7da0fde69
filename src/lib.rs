//! OpenAPI to JSON Schema
//!
//! Converts the schema definitions of an OpenAPI/Swagger document into a
//! family of standalone JSON Schema files.
//!
//! Each named schema under `definitions` (Swagger 2) or `components.schemas`
//! (OpenAPI 3) becomes its own artifact, with `$ref`s redirected so they
//! still resolve once split apart. An `all.json` union of every converted
//! type is written alongside.
//!
//! # Example
//!
//! ```
//! use openapi2jsonschema::{convert, load_document_str, ConvertOptions, MemorySink};
//!
//! let doc = load_document_str(r##"{
//!     "openapi": "3.0.0",
//!     "components": { "schemas": {
//!         "Pet": {
//!             "type": "object",
//!             "properties": {
//!                 "tag": { "type": "string", "nullable": true },
//!                 "owner": { "$ref": "#/components/schemas/User" }
//!             }
//!         },
//!         "User": { "type": "object" }
//!     } }
//! }"##).unwrap();
//!
//! let mut sink = MemorySink::new();
//! convert(&doc, &ConvertOptions::new().strict(true), &mut sink).unwrap();
//!
//! let pet = sink.get("Pet.json").unwrap();
//! assert_eq!(pet["properties"]["owner"]["$ref"], "User.json");
//! assert_eq!(pet["properties"]["tag"]["type"][1], "null");
//! assert_eq!(pet["additionalProperties"], false);
//! ```
//!
//! # Output Modes
//!
//! | Mode | Artifacts | References |
//! |------|-----------|------------|
//! | per-type (Swagger 2) | `_definitions.json`, `<Kind>.json`, `all.json` | `<prefix>#/definitions/<Name>` |
//! | per-type (OpenAPI 3) | `<Kind>.json`, `all.json` | `<Name>.json` |
//! | stand-alone | as above | inlined |
//! | root | `<root>.json` | `#/definitions/<Name>` |
//!
//! # Kubernetes Mode
//!
//! With [`ConvertOptions::kubernetes`], `x-kubernetes-group-version-kind`
//! values become `apiVersion`/`kind` enums, `int-or-string` formats become
//! unions, and optional fields accept `null`.

mod components;
mod convert;
mod deref;
mod enrich;
mod error;
mod filter;
mod loader;
mod names;
mod normalize;
mod nullable;
mod refs;
mod sink;
mod strict;
mod types;
mod validator;

pub use components::{body_entries, entries, schema_container, ComponentEntry};
pub use convert::{artifact_name, convert, ConversionReport, EntryOutcome, EntryStatus};
pub use deref::{dereference, ArtifactStore, Resolved, Resolver};
pub use enrich::{apply_builtin_overrides, enrich_entry, group_version_kinds};
pub use error::{ConvertError, EntryError, SchemaError, ValidateError};
pub use filter::check_supported;
pub use loader::{
    detect_dialect, load_document, load_document_auto, load_document_str, load_value,
    navigate_fragment, Document,
};
pub use names::QualifiedName;
pub use normalize::normalize_int_or_string;
pub use nullable::expand_nullable;
pub use refs::{convert_nullable, rewrite_refs, RefStyle};
pub use sink::{DirectorySink, MemorySink, Sink};
pub use strict::close_objects;
pub use types::{
    ConvertOptions, CyclePolicy, Dialect, GroupVersionKind, StageOrder, ALL_FILE, DEFAULT_PREFIX,
    DEFINITIONS_FILE, SCHEMA_URI,
};
pub use validator::{check_schema, validate_files, validate_instance};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
