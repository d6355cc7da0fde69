//! Integration tests for the conversion pipeline.

use openapi2jsonschema::{
    convert, load_document, load_document_str, validate_instance, ConversionReport,
    ConvertError, ConvertOptions, DirectorySink, Document, EntryError, EntryStatus, MemorySink,
    StageOrder, SCHEMA_URI,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn run(doc: Value, options: &ConvertOptions) -> (ConversionReport, MemorySink) {
    let doc = Document::from_tree(doc).unwrap();
    let mut sink = MemorySink::new();
    let report = convert(&doc, options, &mut sink).unwrap();
    (report, sink)
}

fn petstore_v2() -> Value {
    json!({
        "swagger": "2.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "definitions": {
            "Pet": {
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "tags": { "type": "array", "items": { "$ref": "#/definitions/Tag" } },
                    "owner": { "$ref": "#/definitions/User" }
                }
            },
            "Tag": { "properties": { "label": { "type": "string" } } },
            "User": { "type": "object", "properties": { "id": { "type": "integer" } } }
        }
    })
}

fn petstore_v3() -> Value {
    json!({
        "openapi": "3.0.3",
        "components": { "schemas": {
            "Pet": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "nickname": { "type": "string", "nullable": true },
                    "owner": { "$ref": "#/components/schemas/User" }
                }
            },
            "User": {
                "type": "object",
                "properties": { "pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } } }
            }
        }}
    })
}

mod per_type {
    use super::*;

    #[test]
    fn swagger2_with_fragment_prefix() {
        let options = ConvertOptions::new().prefix("_definitions.json#/definitions/");
        let doc = json!({
            "swagger": "2.0",
            "definitions": {
                "Pet": { "properties": { "owner": { "$ref": "#/definitions/Owner" } } },
                "Owner": { "type": "object" }
            }
        });
        let (_, sink) = run(doc, &options);

        let pet = sink.get("Pet.json").unwrap();
        assert_eq!(
            pet["properties"]["owner"]["$ref"],
            json!("_definitions.json#/definitions/Owner")
        );

        let shared = sink.get("_definitions.json").unwrap();
        assert_eq!(
            shared["definitions"]["Pet"]["properties"]["owner"]["$ref"],
            json!("#/definitions/Owner")
        );
        assert_eq!(
            sink.get("all.json").unwrap(),
            &json!({ "oneOf": [
                { "$ref": "_definitions.json#/definitions/Pet" },
                { "$ref": "_definitions.json#/definitions/Owner" }
            ]})
        );
    }

    #[test]
    fn openapi3_uses_sibling_files() {
        let (report, sink) = run(petstore_v3(), &ConvertOptions::new());
        assert!(sink.get("_definitions.json").is_none());
        assert_eq!(report.artifacts, vec!["Pet.json", "User.json", "all.json"]);

        let pet = sink.get("Pet.json").unwrap();
        assert_eq!(pet["properties"]["owner"]["$ref"], json!("User.json"));
        let user = sink.get("User.json").unwrap();
        assert_eq!(user["properties"]["pets"]["items"]["$ref"], json!("Pet.json"));
    }

    #[test]
    fn every_artifact_is_stamped() {
        let (_, sink) = run(petstore_v2(), &ConvertOptions::new());
        for name in ["Pet.json", "Tag.json", "User.json"] {
            let artifact = sink.get(name).unwrap();
            assert_eq!(artifact["$schema"], json!(SCHEMA_URI), "{}", name);
            assert_eq!(artifact["type"], json!("object"), "{}", name);
        }
    }

    #[test]
    fn source_document_is_untouched() {
        let tree = petstore_v2();
        let doc = Document::from_tree(tree.clone()).unwrap();
        let mut sink = MemorySink::new();
        let options = ConvertOptions::new()
            .kubernetes(true)
            .strict(true)
            .stand_alone(true);
        convert(&doc, &options, &mut sink).unwrap();
        assert_eq!(doc.tree, tree);
    }

    #[test]
    fn writes_to_directory() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("schemas");
        let doc = Document::from_tree(petstore_v3()).unwrap();
        let mut sink = DirectorySink::create(&out).unwrap();
        convert(&doc, &ConvertOptions::new(), &mut sink).unwrap();

        let pet: Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("Pet.json")).unwrap())
                .unwrap();
        assert_eq!(pet["$schema"], json!(SCHEMA_URI));
        assert!(out.join("all.json").exists());
    }

    #[test]
    fn yaml_source_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("petstore.yaml");
        std::fs::write(
            &path,
            "swagger: \"2.0\"\ndefinitions:\n  Pet:\n    properties:\n      name:\n        type: string\n",
        )
        .unwrap();
        let doc = load_document(&path).unwrap();
        let mut sink = MemorySink::new();
        let report = convert(&doc, &ConvertOptions::new(), &mut sink).unwrap();
        assert_eq!(report.converted(), 1);
    }
}

mod root_mode {
    use super::*;

    #[test]
    fn single_document_with_local_definitions() {
        let (report, sink) = run(petstore_v3(), &ConvertOptions::new().root("Pet"));
        assert_eq!(sink.names(), vec!["Pet.json"]);
        assert_eq!(report.artifacts, vec!["Pet.json"]);

        let pet = sink.get("Pet.json").unwrap();
        assert_eq!(pet["$schema"], json!(SCHEMA_URI));
        assert_eq!(pet["properties"]["owner"]["$ref"], json!("#/definitions/User"));
        assert_eq!(
            pet["definitions"]["User"]["properties"]["pets"]["items"]["$ref"],
            json!("#")
        );
    }

    #[test]
    fn root_artifact_validates_instances() {
        let (_, sink) = run(petstore_v2(), &ConvertOptions::new().root("Pet").strict(true));
        let pet = sink.get("Pet.json").unwrap();

        let valid = json!({ "name": "Rex", "owner": { "id": 7 }, "tags": [{ "label": "good" }] });
        assert!(validate_instance(pet, &valid).is_ok());

        let invalid = json!({ "name": "Rex", "owner": { "id": "seven" } });
        assert!(validate_instance(pet, &invalid).is_err());

        let unknown = json!({ "name": "Rex", "colour": "brown" });
        assert!(validate_instance(pet, &unknown).is_err());
    }

    #[test]
    fn missing_root_aborts() {
        let doc = Document::from_tree(petstore_v2()).unwrap();
        let mut sink = MemorySink::new();
        let err = convert(&doc, &ConvertOptions::new().root("Dog"), &mut sink).unwrap_err();
        assert!(matches!(err, ConvertError::RootNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unconvertible_root_aborts() {
        let doc = Document::from_tree(json!({
            "swagger": "2.0",
            "definitions": { "Broken": 42, "Pet": {} }
        }))
        .unwrap();
        let mut sink = MemorySink::new();
        let err = convert(&doc, &ConvertOptions::new().root("Broken"), &mut sink).unwrap_err();
        assert!(matches!(err, ConvertError::RootFailed { .. }));
        assert!(sink.artifacts.is_empty());
    }
}

mod kubernetes {
    use super::*;

    fn cluster_api() -> Value {
        json!({
            "swagger": "2.0",
            "definitions": {
                "io.k8s.api.apps.v1.Deployment": {
                    "required": ["spec"],
                    "properties": {
                        "apiVersion": { "type": "string" },
                        "kind": { "type": "string" },
                        "spec": { "$ref": "#/definitions/io.k8s.api.apps.v1.DeploymentSpec" }
                    },
                    "x-kubernetes-group-version-kind": [
                        { "group": "apps", "kind": "Deployment", "version": "v1" }
                    ]
                },
                "io.k8s.api.apps.v1.DeploymentSpec": {
                    "required": ["selector"],
                    "properties": {
                        "replicas": { "type": "integer" },
                        "selector": { "type": "object" },
                        "strategy": {
                            "properties": {
                                "maxSurge": { "type": "string", "format": "int-or-string" }
                            }
                        }
                    }
                },
                "io.k8s.api.core.v1.Pod": {
                    "properties": { "kind": { "type": "string" } },
                    "x-kubernetes-group-version-kind": [
                        { "group": "", "kind": "Pod", "version": "v1" }
                    ]
                },
                "io.k8s.apimachinery.pkg.util.intstr.IntOrString": {
                    "type": "string",
                    "format": "int-or-string"
                },
                "io.k8s.apiextensions-apiserver.pkg.apis.apiextensions.v1.JSONSchemaProps": {
                    "properties": { "not": { "$ref": "#/definitions/io.k8s.apiextensions-apiserver.pkg.apis.apiextensions.v1.JSONSchemaProps" } }
                },
                "io.k8s.kubernetes.pkg.api.v1.Binding": { "type": "object" }
            }
        })
    }

    #[test]
    fn gvk_enums() {
        let (_, sink) = run(cluster_api(), &ConvertOptions::new().kubernetes(true));
        let deployment = sink.get("Deployment.json").unwrap();
        assert_eq!(deployment["properties"]["apiVersion"]["enum"], json!(["apps/v1"]));
        assert_eq!(deployment["properties"]["kind"]["enum"], json!(["Deployment"]));

        let pod = sink.get("Pod.json").unwrap();
        assert_eq!(pod["properties"]["kind"]["enum"], json!(["Pod"]));
    }

    #[test]
    fn optional_fields_accept_null() {
        let (_, sink) = run(cluster_api(), &ConvertOptions::new().kubernetes(true));
        let spec = sink.get("DeploymentSpec.json").unwrap();
        assert_eq!(spec["properties"]["replicas"]["type"], json!(["integer", "null"]));
        assert_eq!(spec["properties"]["selector"]["type"], json!("object"));
        assert_eq!(spec["type"], json!("object"));
    }

    #[test]
    fn int_or_string_at_any_depth() {
        let (_, sink) = run(cluster_api(), &ConvertOptions::new().kubernetes(true));
        let spec = sink.get("DeploymentSpec.json").unwrap();
        let max_surge = &spec["properties"]["strategy"]["properties"]["maxSurge"];
        assert_eq!(max_surge["oneOf"][1]["type"], json!(["integer", "null"]));
        assert!(max_surge.get("format").is_none());

        let builtin = sink.get("IntOrString.json").unwrap();
        assert!(builtin["oneOf"].is_array());
    }

    #[test]
    fn stand_alone_skips_deny_list() {
        let options = ConvertOptions::new().kubernetes(true).stand_alone(true);
        let (report, sink) = run(cluster_api(), &options);

        assert!(sink.get("JSONSchemaProps.json").is_none());
        assert!(sink.get("Binding.json").is_none());
        assert_eq!(report.skipped(), 2);

        let all = sink.get("all.json").unwrap().to_string();
        assert!(!all.contains("JSONSchemaProps"));
        assert!(!all.contains("Binding"));
        assert!(all.contains("io.k8s.api.apps.v1.Deployment"));

        let deployment = sink.get("Deployment.json").unwrap();
        assert_eq!(
            deployment["properties"]["spec"]["properties"]["replicas"]["type"],
            json!(["integer", "null"])
        );
        assert!(!deployment.to_string().contains("$ref"));
    }

    #[test]
    fn deprecated_namespace_skipped_without_stand_alone() {
        let (report, _) = run(cluster_api(), &ConvertOptions::new().kubernetes(true));
        let binding = report.outcome("io.k8s.kubernetes.pkg.api.v1.Binding").unwrap();
        assert!(matches!(binding.status, EntryStatus::Skipped { .. }));
        assert!(report
            .outcome("io.k8s.apiextensions-apiserver.pkg.apis.apiextensions.v1.JSONSchemaProps")
            .unwrap()
            .is_converted());
    }

    #[test]
    fn expanded_names() {
        let options = ConvertOptions::new().kubernetes(true).expanded(true);
        let (_, sink) = run(cluster_api(), &options);
        assert!(sink.get("Deployment-apps-v1.json").is_some());
        assert!(sink.get("Pod-v1.json").is_some());
        assert!(sink.get("Pod.json").is_none());
    }
}

mod strictness {
    use super::*;

    #[test]
    fn nested_objects_closed() {
        let doc = json!({
            "swagger": "2.0",
            "definitions": {
                "Outer": {
                    "properties": {
                        "inner": {
                            "properties": {
                                "deepest": { "properties": { "x": { "type": "string" } } }
                            }
                        },
                        "open": {
                            "properties": { "y": { "type": "string" } },
                            "additionalProperties": true
                        }
                    }
                }
            }
        });
        let (_, sink) = run(doc, &ConvertOptions::new().strict(true));
        let outer = sink.get("Outer.json").unwrap();
        assert_eq!(outer["additionalProperties"], json!(false));
        assert_eq!(
            outer["properties"]["inner"]["additionalProperties"],
            json!(false)
        );
        assert_eq!(
            outer["properties"]["inner"]["properties"]["deepest"]["additionalProperties"],
            json!(false)
        );
        assert_eq!(outer["properties"]["open"]["additionalProperties"], json!(true));
    }

    #[test]
    fn stage_order_does_not_change_output() {
        let base = ConvertOptions::new().kubernetes(true).strict(true);
        let (_, first) = run(petstore_v2(), &base.clone());
        let (_, second) = run(
            petstore_v2(),
            &base.stage_order(StageOrder::NullableFirst),
        );
        assert_eq!(first.artifacts, second.artifacts);
    }
}

mod stand_alone {
    use super::*;

    #[test]
    fn openapi3_cycles_become_back_references() {
        let (report, sink) = run(petstore_v3(), &ConvertOptions::new().stand_alone(true));
        assert_eq!(report.failed(), 0);

        let pet = sink.get("Pet.json").unwrap();
        let owner = &pet["properties"]["owner"];
        assert_eq!(owner["type"], json!("object"));
        assert_eq!(owner["properties"]["pets"]["items"], json!({ "$ref": "#" }));

        let pet_with_null = &pet["properties"]["nickname"]["type"];
        assert_eq!(pet_with_null, &json!(["string", "null"]));
    }

    #[test]
    fn dangling_reference_fails_only_that_entry() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": { "schemas": {
                "Pet": { "properties": { "owner": { "$ref": "#/components/schemas/Ghost" } } },
                "Tag": { "type": "object" }
            }}
        });
        let (report, sink) = run(doc, &ConvertOptions::new().stand_alone(true));
        assert!(matches!(
            report.outcome("Pet").unwrap().status,
            EntryStatus::Failed {
                error: EntryError::UnresolvedReference { .. }
            }
        ));
        assert!(sink.get("Tag.json").is_some());
        assert_eq!(
            sink.get("all.json").unwrap()["oneOf"],
            json!([{ "$ref": "Tag.json" }])
        );
    }

    #[test]
    fn stand_alone_artifact_validates() {
        let (_, sink) = run(petstore_v2(), &ConvertOptions::new().stand_alone(true));
        let pet = sink.get("Pet.json").unwrap();
        assert!(validate_instance(pet, &json!({ "name": "Rex", "tags": [{ "label": "a" }] })).is_ok());
        assert!(validate_instance(pet, &json!({ "tags": [] })).is_err());
    }
}

#[test]
fn body_components_from_yaml() {
    let doc = load_document_str(
        r#"
openapi: 3.1.0
paths:
  /pets/{petId}:
    get:
      responses:
        "200":
          content:
            application/vnd.api+json:
              schema:
                type: object
components:
  schemas: {}
"#,
    )
    .unwrap();
    let mut sink = MemorySink::new();
    let report = convert(&doc, &ConvertOptions::new().include_bodies(true), &mut sink).unwrap();
    assert_eq!(report.converted(), 1);
    assert!(sink
        .get("paths_pets__petId__GET_response_200_jsonapi.json")
        .is_some());
}
