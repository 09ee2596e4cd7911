//! End-to-end conversion tests through the public crate API
//!
//! These exercise the complete pipeline: input validation, identifier
//! allocation, tree transformation, auxiliary linking, and both emitters.

use serde_json::{Value, json};

use hmst_convert::{
    ConvertError, Converter, DisabledValidator, HAMSTERS_NAMESPACE, ReducedMarkupValidator,
};

fn convert_to_markup(doc: Value) -> String {
    let artifact = Converter::new()
        .to_markup(&doc, &ReducedMarkupValidator::new())
        .expect("conversion succeeds");
    String::from_utf8(artifact.bytes).unwrap()
}

#[test]
fn test_login_procedure_end_to_end() {
    let doc = json!({
        "label": "Login Procedure",
        "description": "User authentication workflow",
        "operator": "sequence"
    });

    let model = Converter::new().convert(&doc).unwrap();
    assert_eq!(model.task.id, "t0");
    assert_eq!(model.task.task_type, "goal");
    assert_eq!(model.task.description, "User authentication workflow");
    assert_eq!(model.task.operator.as_deref(), Some("sequence"));
    assert!(model.task.children.is_empty());
    assert_eq!(model.task.duration.min, 0);
    assert_eq!(model.task.duration.max, 0);
    assert_eq!(model.task.duration.unit, "s");

    let xml = convert_to_markup(doc);
    let parsed = roxmltree::Document::parse(&xml).unwrap();
    let root = parsed.root_element();
    assert_eq!(root.tag_name().name(), "hamsters");
    assert_eq!(root.tag_name().namespace(), Some(HAMSTERS_NAMESPACE));
    assert_eq!(root.attribute("name"), Some("Login Procedure"));
    assert_eq!(root.attribute("version"), Some("7"));

    for section in [
        "security",
        "parameters",
        "instancevalues",
        "parametersdefinitions",
        "mainproperties",
    ] {
        assert!(
            root.children().any(|n| n.tag_name().name() == section),
            "missing section {section}"
        );
    }

    // A sequence operator without children is a marker only; no operator
    // element is emitted for it.
    assert!(!parsed.descendants().any(|n| n.tag_name().name() == "operator"));
}

#[test]
fn test_generated_ids_are_unique_and_preorder_increasing() {
    let doc = json!({
        "label": "root",
        "children": [
            { "label": "left", "children": [ { "label": "leaf" } ] },
            { "label": "right" }
        ]
    });

    let model = Converter::new().convert(&doc).unwrap();
    let ids: Vec<_> = model.task.iter_preorder().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2", "t3"]);
}

#[test]
fn test_explicit_ids_are_never_reassigned() {
    // "t1" is taken explicitly; the allocator must skip over it.
    let doc = json!({
        "label": "root",
        "children": [
            { "id": "t1", "label": "claimed" },
            { "label": "unnamed" }
        ]
    });

    let model = Converter::new().convert(&doc).unwrap();
    let ids: Vec<_> = model.task.iter_preorder().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2"]);

    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_type_defaults_depend_on_depth() {
    let doc = json!({
        "label": "root",
        "children": [ { "label": "child", "children": [ { "label": "grandchild" } ] } ]
    });

    let model = Converter::new().convert(&doc).unwrap();
    assert_eq!(model.task.task_type, "goal");
    assert_eq!(model.task.children[0].task_type, "abstract");
    assert_eq!(model.task.children[0].children[0].task_type, "abstract");
}

#[test]
fn test_unresolved_data_link_yields_reference_error_and_no_output() {
    let doc = json!({
        "label": "root",
        "datas": [ {
            "description": "orphan",
            "links": [ { "taskId": "t42" } ]
        } ]
    });

    let err = Converter::new()
        .to_markup(&doc, &ReducedMarkupValidator::new())
        .unwrap_err();
    match err {
        ConvertError::Reference { target, .. } => assert_eq!(target, "t42"),
        other => panic!("expected reference error, got {other:?}"),
    }
}

#[test]
fn test_empty_datas_input_emits_empty_element_and_converts() {
    let doc = json!({ "label": "root", "datas": [] });
    let xml = convert_to_markup(doc);
    assert!(xml.contains("<datas/>"));
}

#[test]
fn test_disabled_validator_still_produces_markup() {
    let doc = json!({ "label": "root" });
    let artifact = Converter::new()
        .to_markup(&doc, &DisabledValidator)
        .unwrap();
    assert!(!artifact.report.performed);
    assert!(!artifact.bytes.is_empty());
}

#[test]
fn test_ir_output_materializes_every_field() {
    let doc = json!({ "label": "root" });
    let bytes = Converter::new().to_ir(&doc).unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["id"], "t0");
    assert_eq!(value["type"], "goal");
    assert_eq!(value["operator"], Value::Null);
    assert_eq!(value["duration"]["unit"], "s");
    assert_eq!(value["loop"]["maxIterations"], 0);
    assert_eq!(value["optional"], false);
    assert!(value["datas"].as_array().unwrap().is_empty());
}

#[test]
fn test_ir_round_trip_through_full_pipeline() {
    let doc = json!({
        "label": "root",
        "operator": "concurrency",
        "children": [
            { "label": "a", "loop": { "maxIterations": 2 } },
            { "label": "b", "duration": { "min": 1, "max": 5, "unit": "min" } }
        ],
        "errors": {
            "connectors": [ { "name": "gate", "type": "AND" } ]
        }
    });

    let converter = Converter::new();
    let first = converter.to_ir(&doc).unwrap();
    let reparsed: Value = serde_json::from_slice(&first).unwrap();
    let second = converter.to_ir(&reparsed).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_conversion_produces_identical_markup_across_runs() {
    let doc = json!({
        "label": "root",
        "operator": "order-independent",
        "children": [ { "label": "a" }, { "label": "b" }, { "label": "c" } ],
        "datas": [ { "description": "shared state", "links": [ { "taskId": "t1" } ] } ]
    });

    assert_eq!(convert_to_markup(doc.clone()), convert_to_markup(doc));
}
