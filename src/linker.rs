//! Auxiliary sub-model linking
//!
//! Builds the optional data-object (DOD) and error-model records from the validated
//! input, sharing the conversion's identifier allocator, and resolves every
//! cross-reference against the id sets built so far. An unresolved reference is a
//! terminal error naming the offending link and the missing target id; references
//! are never dropped silently.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{ConvertError, Result};
use crate::id_alloc::{IdAllocator, IdClass};
use crate::model::{
    ConnectorIr, DataLink, DataObjectIr, ErrorModelIr, GenotypeIr, PhenotypeIr, Position,
};

/// Default link type when a data link omits one: device DODs transfer through
/// `USES_TYPE`, everything else is plain access.
fn default_link_type(data_type: &str) -> &'static str {
    match data_type {
        "deviceouputdod" | "deviceinputdod" => "USES_TYPE",
        _ => "ACCESS_TYPE",
    }
}

fn parse_position(raw: Option<&Value>) -> Position {
    match raw {
        Some(value) => Position {
            x: value.get("x").and_then(Value::as_f64).unwrap_or(0.0),
            y: value.get("y").and_then(Value::as_f64).unwrap_or(0.0),
        },
        None => Position::default(),
    }
}

fn str_field<'v>(raw: &'v Value, key: &str) -> Option<&'v str> {
    raw.get(key).and_then(Value::as_str)
}

fn string_list(raw: &Value, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Resolves the `datas` and `errors` sub-objects into internal records.
pub struct AuxiliaryLinker<'a> {
    alloc: &'a mut IdAllocator,
    task_ids: &'a HashSet<String>,
}

impl<'a> AuxiliaryLinker<'a> {
    pub fn new(alloc: &'a mut IdAllocator, task_ids: &'a HashSet<String>) -> Self {
        Self { alloc, task_ids }
    }

    /// Link both sub-models. Absent sections yield empty collections.
    pub fn link(&mut self, raw_doc: &Value) -> Result<(Vec<DataObjectIr>, ErrorModelIr)> {
        self.reserve_explicit_ids(raw_doc);
        let datas = self.link_datas(raw_doc.get("datas"))?;
        let errors = self.link_errors(raw_doc.get("errors"))?;
        Ok((datas, errors))
    }

    /// Reserve every explicit auxiliary id before allocation starts, so an id
    /// appearing late in a collection is never handed out earlier.
    fn reserve_explicit_ids(&mut self, raw_doc: &Value) {
        if let Some(datas) = raw_doc.get("datas").and_then(Value::as_array) {
            for data in datas {
                if let Some(id) = str_field(data, "id") {
                    self.alloc.reserve(IdClass::DataObject, id);
                }
            }
        }
        if let Some(errors) = raw_doc.get("errors") {
            for collection in ["connectors", "phenotypes", "genotypes"] {
                if let Some(items) = errors.get(collection).and_then(Value::as_array) {
                    for item in items {
                        if let Some(id) = str_field(item, "id") {
                            self.alloc.reserve(IdClass::ErrorEntity, id);
                        }
                    }
                }
            }
        }
    }

    fn link_datas(&mut self, raw: Option<&Value>) -> Result<Vec<DataObjectIr>> {
        let Some(items) = raw.and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        let mut datas = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let id = self
                .alloc
                .resolve(IdClass::DataObject, str_field(item, "id"));
            let data_type = str_field(item, "type").unwrap_or("objectdod").to_string();
            let description = str_field(item, "description").unwrap_or_default().to_string();

            let mut links = Vec::new();
            if let Some(raw_links) = item.get("links").and_then(Value::as_array) {
                for (link_index, raw_link) in raw_links.iter().enumerate() {
                    let task_id = str_field(raw_link, "taskId").unwrap_or_default();
                    if !self.task_ids.contains(task_id) {
                        return Err(ConvertError::Reference {
                            link: format!("datas[{index}].links[{link_index}]"),
                            entity: "task",
                            target: task_id.to_string(),
                        });
                    }
                    let link_type = str_field(raw_link, "linkType")
                        .unwrap_or_else(|| default_link_type(&data_type))
                        .to_string();
                    links.push(DataLink {
                        task_id: task_id.to_string(),
                        link_type,
                    });
                }
            }

            datas.push(DataObjectIr {
                id,
                data_type,
                description,
                links,
                position: parse_position(item.get("position")),
            });
        }
        Ok(datas)
    }

    fn link_errors(&mut self, raw: Option<&Value>) -> Result<ErrorModelIr> {
        let Some(raw) = raw else {
            return Ok(ErrorModelIr::default());
        };

        let mut model = ErrorModelIr::default();

        if let Some(items) = raw.get("connectors").and_then(Value::as_array) {
            for item in items {
                model.connectors.push(ConnectorIr {
                    id: self.alloc.resolve(IdClass::ErrorEntity, str_field(item, "id")),
                    name: str_field(item, "name").unwrap_or_default().to_string(),
                    connector_type: str_field(item, "type").unwrap_or("OR").to_string(),
                    position: parse_position(item.get("position")),
                });
            }
        }
        let connector_ids: HashSet<&str> =
            model.connectors.iter().map(|c| c.id.as_str()).collect();

        if let Some(items) = raw.get("phenotypes").and_then(Value::as_array) {
            for (index, item) in items.iter().enumerate() {
                let links = string_list(item, "links");
                for (link_index, target) in links.iter().enumerate() {
                    if !connector_ids.contains(target.as_str()) {
                        return Err(ConvertError::Reference {
                            link: format!("errors.phenotypes[{index}].links[{link_index}]"),
                            entity: "connector",
                            target: target.clone(),
                        });
                    }
                }
                model.phenotypes.push(PhenotypeIr {
                    id: self.alloc.resolve(IdClass::ErrorEntity, str_field(item, "id")),
                    name: str_field(item, "name").unwrap_or_default().to_string(),
                    phenotype_type: str_field(item, "type").unwrap_or("humanerror").to_string(),
                    position: parse_position(item.get("position")),
                    links,
                });
            }
        }
        let phenotype_ids: HashSet<&str> =
            model.phenotypes.iter().map(|p| p.id.as_str()).collect();

        if let Some(items) = raw.get("genotypes").and_then(Value::as_array) {
            for (index, item) in items.iter().enumerate() {
                let phenotype_links = string_list(item, "phenotypeLinks");
                for (link_index, target) in phenotype_links.iter().enumerate() {
                    if !phenotype_ids.contains(target.as_str()) {
                        return Err(ConvertError::Reference {
                            link: format!("errors.genotypes[{index}].phenotypeLinks[{link_index}]"),
                            entity: "phenotype",
                            target: target.clone(),
                        });
                    }
                }
                let task_links = string_list(item, "taskLinks");
                for (link_index, target) in task_links.iter().enumerate() {
                    if !self.task_ids.contains(target.as_str()) {
                        return Err(ConvertError::Reference {
                            link: format!("errors.genotypes[{index}].taskLinks[{link_index}]"),
                            entity: "task",
                            target: target.clone(),
                        });
                    }
                }
                model.genotypes.push(GenotypeIr {
                    id: self.alloc.resolve(IdClass::ErrorEntity, str_field(item, "id")),
                    name: str_field(item, "name").unwrap_or_default().to_string(),
                    genotype_type: str_field(item, "type").unwrap_or("slip").to_string(),
                    gemstype: str_field(item, "gemstype").unwrap_or("Undefined").to_string(),
                    position: parse_position(item.get("position")),
                    phenotype_links,
                    task_links,
                });
            }
        }

        Ok(model)
    }
}
