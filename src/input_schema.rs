//! Input document validation
//!
//! Checks the parsed JSON document against a strict draft-07 structural schema
//! before any defaulting or identifier allocation happens. The schema fails closed:
//! unknown properties at the top level or at any task level are rejected, and every
//! numeric range and enumeration is enforced recursively over `children`.

use jsonschema::{Draft, JSONSchema};
use serde_json::{Value, json};

use crate::error::{ConvertError, Result, SchemaViolation};

/// Properties common to every task node, the root included.
fn task_properties() -> Value {
    json!({
        "id": {
            "type": "string",
            "pattern": "^[a-zA-Z0-9_-]+$"
        },
        "label": {
            "type": "string",
            "minLength": 1,
            "maxLength": 200
        },
        "type": {
            "type": "string",
            "enum": ["abstract", "goal", "user", "system", "cognitive", "interaction", "cooperative"]
        },
        "description": {
            "type": "string",
            "maxLength": 1000
        },
        // Null is accepted so the emitted IR, which materializes the absent
        // operator explicitly, re-validates unchanged.
        "operator": {
            "anyOf": [
                { "type": "null" },
                {
                    "type": "string",
                    "enum": ["sequence", "choice", "order-independent", "concurrency", "loop", "optional", "interrupt", "suspend_resume"]
                }
            ]
        },
        "duration": {
            "type": "object",
            "properties": {
                "min": { "type": "integer", "minimum": 0, "maximum": 1_000_000 },
                "max": { "type": "integer", "minimum": 0, "maximum": 1_000_000 },
                "unit": { "type": "string", "enum": ["ms", "s", "min", "h"] }
            },
            "additionalProperties": false
        },
        "loop": {
            "type": "object",
            "properties": {
                "minIterations": { "type": "integer", "minimum": 0, "maximum": 10_000 },
                "maxIterations": { "type": "integer", "minimum": 0, "maximum": 10_000 }
            },
            "additionalProperties": false
        },
        "optional": { "type": "boolean" },
        "metadata": {
            "type": "object",
            "maxProperties": 50,
            "additionalProperties": true
        },
        "children": {
            "type": "array",
            "items": { "$ref": "#/definitions/task" },
            "maxItems": 100
        }
    })
}

/// Build the complete draft-07 schema for the input document.
///
/// The root object carries the task properties plus the optional `datas` and
/// `errors` sub-models; nested tasks allow the task properties only.
fn build_schema() -> Value {
    let root_properties = {
        let mut properties = task_properties();
        let map = properties.as_object_mut().expect("task properties object");
        map.insert("datas".to_string(), json!({
            "type": "array",
            "items": { "$ref": "#/definitions/dataObject" }
        }));
        map.insert("errors".to_string(), json!({ "$ref": "#/definitions/errorModel" }));
        properties
    };

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "HAMSTERS Task Definition",
        "type": "object",
        "properties": root_properties,
        "required": ["label"],
        "additionalProperties": false,
        "definitions": {
            "task": {
                "type": "object",
                "properties": task_properties(),
                "required": ["label"],
                "additionalProperties": false
            },
            "position": {
                "type": "object",
                "properties": {
                    "x": { "type": "number" },
                    "y": { "type": "number" }
                },
                "additionalProperties": false
            },
            "dataObject": {
                "type": "object",
                "properties": {
                    "id": { "type": "string", "pattern": "^[a-zA-Z0-9_-]+$" },
                    "type": {
                        "type": "string",
                        "enum": ["objectdod", "informationdod", "deviceouputdod", "deviceinputdod"]
                    },
                    "description": { "type": "string" },
                    "links": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "taskId": { "type": "string" },
                                "linkType": {
                                    "type": "string",
                                    "enum": ["ACCESS_TYPE", "STORE_TYPE", "USES_TYPE", "MODIFY_TYPE"]
                                }
                            },
                            "required": ["taskId"],
                            "additionalProperties": false
                        }
                    },
                    "position": { "$ref": "#/definitions/position" }
                },
                "required": ["description"],
                "additionalProperties": false
            },
            "errorModel": {
                "type": "object",
                "properties": {
                    "connectors": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string", "pattern": "^[a-zA-Z0-9_-]+$" },
                                "name": { "type": "string" },
                                "type": { "type": "string", "enum": ["OR", "AND"] },
                                "position": { "$ref": "#/definitions/position" }
                            },
                            "required": ["name", "type"],
                            "additionalProperties": false
                        }
                    },
                    "phenotypes": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string", "pattern": "^[a-zA-Z0-9_-]+$" },
                                "name": { "type": "string" },
                                "type": {
                                    "type": "string",
                                    "enum": ["humanerror", "systemerror", "designerror"]
                                },
                                "position": { "$ref": "#/definitions/position" },
                                "links": { "type": "array", "items": { "type": "string" } }
                            },
                            "required": ["name", "type"],
                            "additionalProperties": false
                        }
                    },
                    "genotypes": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string", "pattern": "^[a-zA-Z0-9_-]+$" },
                                "name": { "type": "string" },
                                "type": {
                                    "type": "string",
                                    "enum": ["slip", "lapse", "mistake", "rbm"]
                                },
                                "gemstype": {
                                    "type": "string",
                                    "enum": ["Undefined", "Routine", "Familiar", "Unfamiliar"]
                                },
                                "position": { "$ref": "#/definitions/position" },
                                "phenotypeLinks": { "type": "array", "items": { "type": "string" } },
                                "taskLinks": { "type": "array", "items": { "type": "string" } }
                            },
                            "required": ["name", "type"],
                            "additionalProperties": false
                        }
                    }
                },
                "additionalProperties": false
            }
        }
    })
}

/// Validates input documents against the embedded task-definition schema.
///
/// The schema is compiled once at construction time; validation itself allocates
/// only for the violation list.
pub struct InputValidator {
    compiled: JSONSchema,
}

impl InputValidator {
    pub fn new() -> Self {
        let schema = build_schema();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .expect("embedded input schema compiles");
        Self { compiled }
    }

    /// Collect every violation in the document. Empty means valid.
    pub fn validate(&self, document: &Value) -> Vec<SchemaViolation> {
        match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| {
                    let pointer = error.instance_path.to_string();
                    let path = if pointer.is_empty() {
                        "root".to_string()
                    } else {
                        format!("root{pointer}")
                    };
                    SchemaViolation::new(path, error.to_string().replace('\n', " "))
                })
                .collect(),
        }
    }

    /// Validate and convert any violations into a terminal error.
    pub fn check(&self, document: &Value) -> Result<()> {
        let violations = self.validate(document);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::input_violations(violations))
        }
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}
