//! Conversion pipeline
//!
//! Ties the stages together in their fixed order: input validation, task tree
//! transformation, auxiliary linking, then emission. Identifier allocation state
//! is created fresh per conversion, so converting the same document twice yields
//! byte-identical output.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::Result;
use crate::id_alloc::IdAllocator;
use crate::input_schema::InputValidator;
use crate::linker::AuxiliaryLinker;
use crate::markup::emit_markup;
use crate::model::ModelIr;
use crate::output_validator::{MarkupValidator, OutputReport, check_markup};
use crate::transform::TaskTreeTransformer;

/// Build the internal model from an already validated document.
///
/// Task ids are allocated first, in pre-order; the auxiliary linker then resolves
/// `datas` and `errors` against the complete task id set, sharing the same
/// allocator so explicit ids from any section stay reserved.
pub fn build_model(doc: &Value) -> Result<ModelIr> {
    let mut alloc = IdAllocator::new();

    let task = TaskTreeTransformer::new(&mut alloc).transform_root(doc)?;
    let task_ids: HashSet<String> = task.iter_preorder().map(|t| t.id.clone()).collect();

    let (datas, errors) = AuxiliaryLinker::new(&mut alloc, &task_ids).link(doc)?;

    Ok(ModelIr {
        task,
        datas,
        errors,
    })
}

/// Generated markup plus the validation report produced for it.
#[derive(Debug)]
pub struct MarkupArtifact {
    pub bytes: Vec<u8>,
    pub report: OutputReport,
}

/// Full-document converter. Owns the compiled input schema; one instance can
/// convert any number of documents.
pub struct Converter {
    input: InputValidator,
}

impl Converter {
    pub fn new() -> Self {
        Self {
            input: InputValidator::new(),
        }
    }

    /// Validate the document and build the internal model.
    ///
    /// A schema violation or an unresolved reference aborts here; no output of
    /// any kind is produced for an invalid document.
    pub fn convert(&self, doc: &Value) -> Result<ModelIr> {
        self.input.check(doc)?;
        build_model(doc)
    }

    /// Convert to the normalized intermediate JSON representation.
    pub fn to_ir(&self, doc: &Value) -> Result<Vec<u8>> {
        self.convert(doc)?.to_ir_json()
    }

    /// Convert to task-model markup and check the result with the given
    /// validator. Markup that fails the output check is discarded.
    pub fn to_markup(
        &self,
        doc: &Value,
        validator: &dyn MarkupValidator,
    ) -> Result<MarkupArtifact> {
        let model = self.convert(doc)?;
        let bytes = emit_markup(&model)?;
        let report = check_markup(validator, &bytes, model.datas.is_empty())?;
        Ok(MarkupArtifact { bytes, report })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::output_validator::ReducedMarkupValidator;
    use serde_json::json;

    #[test]
    fn test_convert_allocates_across_sections() {
        let doc = json!({
            "label": "Login",
            "children": [ { "label": "Enter PIN" } ],
            "datas": [ { "description": "PIN", "links": [ { "taskId": "t1" } ] } ],
            "errors": { "connectors": [ { "name": "gate", "type": "OR" } ] }
        });
        let model = Converter::new().convert(&doc).unwrap();
        assert_eq!(model.task.id, "t0");
        assert_eq!(model.task.children[0].id, "t1");
        assert_eq!(model.datas[0].id, "a0");
        assert_eq!(model.errors.connectors[0].id, "e0");
    }

    #[test]
    fn test_invalid_document_rejected_before_allocation() {
        let doc = json!({ "type": "goal" });
        let err = Converter::new().convert(&doc).unwrap_err();
        assert!(matches!(err, ConvertError::InputSchemaViolation { .. }));
    }

    #[test]
    fn test_duplicate_task_ids_abort_conversion() {
        let doc = json!({
            "label": "root",
            "children": [
                { "label": "a", "id": "dup" },
                { "label": "b", "id": "dup" }
            ]
        });
        let err = Converter::new()
            .to_markup(&doc, &ReducedMarkupValidator::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InputSchemaViolation { .. }));
        assert!(err.to_string().contains("'dup'"));
    }

    #[test]
    fn test_unresolved_reference_aborts_conversion() {
        let doc = json!({
            "label": "Login",
            "datas": [ { "description": "PIN", "links": [ { "taskId": "t99" } ] } ]
        });
        let err = Converter::new().convert(&doc).unwrap_err();
        assert!(matches!(err, ConvertError::Reference { .. }));
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let doc = json!({
            "label": "Login",
            "operator": "sequence",
            "children": [ { "label": "a" }, { "label": "b" } ]
        });
        let converter = Converter::new();
        let first = converter.to_ir(&doc).unwrap();
        let second = converter.to_ir(&doc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_markup_passes_reduced_validation() {
        let doc = json!({
            "label": "Login",
            "operator": "sequence",
            "children": [ { "label": "Enter PIN" }, { "label": "Confirm" } ]
        });
        let artifact = Converter::new()
            .to_markup(&doc, &ReducedMarkupValidator::new())
            .unwrap();
        assert!(artifact.report.performed);
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("version=\"7\""));
    }

    #[test]
    fn test_ir_round_trip_is_idempotent() {
        let doc = json!({
            "label": "Login",
            "operator": "sequence",
            "children": [
                { "label": "Enter PIN", "duration": { "min": 2, "max": 10 } },
                { "label": "Confirm", "optional": true }
            ],
            "datas": [ { "description": "PIN" } ]
        });
        let converter = Converter::new();
        let first = converter.to_ir(&doc).unwrap();
        let reparsed: Value = serde_json::from_slice(&first).unwrap();
        let second = converter.to_ir(&reparsed).unwrap();
        assert_eq!(first, second);
    }
}
