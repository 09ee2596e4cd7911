//! HAMSTERS v7 markup emission
//!
//! Serializes the internal tree (tasks plus auxiliary models) into the HAMSTERS v7
//! XML shape: fixed namespaces and root attributes, the `<nodes>` task/operator
//! tree, the `<datas>`/`<errors>` sections, the always-empty fixed sections, and
//! the `<mainproperties>` block. Pure function of the internal tree; no I/O.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;
use crate::model::{
    ConnectorIr, DataObjectIr, ErrorModelIr, GenotypeIr, ModelIr, Nesting, PhenotypeIr, Position,
    TaskIr,
};

/// Namespace of the HAMSTERS v7 dialect.
pub const HAMSTERS_NAMESPACE: &str = "https://www.irit.fr/ICS/HAMSTERS/7.0";

/// Location of the external XSD for the dialect.
pub const XSD_SCHEMA_LOCATION: &str = "https://www.irit.fr/recherches/ICS/xsd/hamsters/v7/v7.xsd";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Horizontal spacing between sibling children in the generated layout.
const CHILD_SPACING_X: i64 = 200;
/// Children are placed one row below their parent.
const CHILD_BASE_Y: i64 = 200;

type EmitResult = std::result::Result<(), quick_xml::Error>;

/// Serialize the converted model as pretty-printed UTF-8 markup bytes.
pub fn emit_markup(model: &ModelIr) -> Result<Vec<u8>> {
    let mut emitter = MarkupEmitter::new();
    emitter.emit(model)?;
    Ok(emitter.into_bytes())
}

struct MarkupEmitter {
    writer: Writer<Vec<u8>>,
}

impl MarkupEmitter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        bytes
    }

    fn emit(&mut self, model: &ModelIr) -> EmitResult {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("hamsters");
        root.push_attribute(("xmlns", HAMSTERS_NAMESPACE));
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        root.push_attribute(("name", model.task.label.as_str()));
        root.push_attribute(("version", "7"));
        root.push_attribute((
            "xsi:schemaLocation",
            format!("{HAMSTERS_NAMESPACE} {XSD_SCHEMA_LOCATION}").as_str(),
        ));
        self.writer.write_event(Event::Start(root))?;

        self.writer
            .write_event(Event::Start(BytesStart::new("nodes")))?;
        self.write_task(&model.task, 0, 0)?;
        self.writer
            .write_event(Event::End(BytesEnd::new("nodes")))?;

        self.write_datas(&model.datas)?;
        self.write_errors(&model.errors)?;

        // Fixed sections, always present regardless of content.
        for section in ["security", "parameters", "instancevalues", "parametersdefinitions"] {
            self.writer
                .write_event(Event::Empty(BytesStart::new(section)))?;
        }

        self.writer
            .write_event(Event::Start(BytesStart::new("mainproperties")))?;
        self.write_property(
            "timemanagement",
            Some("fr.irit.ics.circus.hamsters.api.TimeManagement"),
            "NORMAL",
        )?;
        self.writer
            .write_event(Event::End(BytesEnd::new("mainproperties")))?;

        self.writer
            .write_event(Event::End(BytesEnd::new("hamsters")))?;
        Ok(())
    }

    fn write_task(&mut self, task: &TaskIr, x: i64, y: i64) -> EmitResult {
        let mut elem = BytesStart::new("task");
        elem.push_attribute(("id", task.id.as_str()));
        elem.push_attribute(("type", task.task_type.as_str()));
        elem.push_attribute(("copy", "false"));
        elem.push_attribute(("knowledgeproceduraltype", ""));
        self.writer.write_event(Event::Start(elem))?;

        self.write_graphics(x, y, true)?;

        match task.nesting() {
            Nesting::Leaf => {}
            Nesting::Direct(children) => {
                for (index, child) in children.iter().enumerate() {
                    self.write_task(child, index as i64 * CHILD_SPACING_X, CHILD_BASE_Y)?;
                }
            }
            Nesting::Wrapped {
                kind,
                operator_id,
                children,
            } => self.write_operator(kind, operator_id, children)?,
        }

        // The schema requires the element; fall back to the label when no
        // description was supplied.
        let description = if task.description.is_empty() {
            task.label.as_str()
        } else {
            task.description.as_str()
        };
        self.write_text_element("description", description)?;

        self.writer
            .write_event(Event::Empty(BytesStart::new("xlproperties")))?;
        self.write_coreproperties(task)?;

        self.writer.write_event(Event::End(BytesEnd::new("task")))?;
        Ok(())
    }

    fn write_operator(&mut self, kind: &str, operator_id: &str, children: &[TaskIr]) -> EmitResult {
        let mut elem = BytesStart::new("operator");
        elem.push_attribute(("id", operator_id));
        elem.push_attribute(("type", kind));
        elem.push_attribute(("knowledgeproceduraltype", ""));
        self.writer.write_event(Event::Start(elem))?;

        self.write_graphics(0, 0, false)?;

        for (index, child) in children.iter().enumerate() {
            self.write_task(child, index as i64 * CHILD_SPACING_X, CHILD_BASE_Y)?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new("operator")))?;
        Ok(())
    }

    fn write_coreproperties(&mut self, task: &TaskIr) -> EmitResult {
        self.writer
            .write_event(Event::Start(BytesStart::new("coreproperties")))?;
        self.writer
            .write_event(Event::Start(BytesStart::new("categories")))?;

        // Simulation category carries the resolved duration, loop, and optional
        // values under their fixed property names.
        let mut simulation = BytesStart::new("category");
        simulation.push_attribute(("name", "simulation"));
        self.writer.write_event(Event::Start(simulation))?;
        self.write_property("duration", None, "false")?;
        let iterative = if task.loop_spec.is_active() {
            task.loop_spec.max_iterations.to_string()
        } else {
            "0".to_string()
        };
        self.write_property("iterative", None, &iterative)?;
        self.write_property("optional", None, if task.optional { "true" } else { "false" })?;
        self.write_property("minexectime", None, &task.duration.min.to_string())?;
        self.write_property("maxexectime", None, &task.duration.max.to_string())?;
        self.writer
            .write_event(Event::End(BytesEnd::new("category")))?;

        let mut authority = BytesStart::new("category");
        authority.push_attribute(("name", "authority"));
        self.writer.write_event(Event::Start(authority))?;
        self.write_property("responsibility", Some("java.lang.Boolean"), "false")?;
        self.write_property("authority", Some("java.lang.Boolean"), "false")?;
        self.writer
            .write_event(Event::End(BytesEnd::new("category")))?;

        let mut criticality = BytesStart::new("category");
        criticality.push_attribute(("name", "criticality"));
        self.writer.write_event(Event::Start(criticality))?;
        self.write_property("criticality", Some("java.lang.Integer"), "0")?;
        self.writer
            .write_event(Event::End(BytesEnd::new("category")))?;

        self.writer
            .write_event(Event::End(BytesEnd::new("categories")))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("coreproperties")))?;
        Ok(())
    }

    fn write_datas(&mut self, datas: &[DataObjectIr]) -> EmitResult {
        if datas.is_empty() {
            return self
                .writer
                .write_event(Event::Empty(BytesStart::new("datas")));
        }

        self.writer
            .write_event(Event::Start(BytesStart::new("datas")))?;
        for data in datas {
            let mut elem = BytesStart::new("data");
            elem.push_attribute(("type", data.data_type.as_str()));
            elem.push_attribute(("id", data.id.as_str()));
            self.writer.write_event(Event::Start(elem))?;

            self.write_text_element("description", &data.description)?;
            self.writer
                .write_event(Event::Empty(BytesStart::new("properties")))?;

            for link in &data.links {
                let mut link_elem = BytesStart::new("link");
                link_elem.push_attribute(("feature", "none"));
                link_elem.push_attribute(("sourceid", link.task_id.as_str()));
                link_elem.push_attribute(("type", link.link_type.as_str()));
                link_elem.push_attribute(("value", ""));
                self.writer.write_event(Event::Start(link_elem))?;
                self.writer
                    .write_event(Event::Empty(BytesStart::new("points")))?;
                self.writer
                    .write_event(Event::End(BytesEnd::new("link")))?;
            }

            self.write_position_graphics(data.position)?;
            self.writer.write_event(Event::End(BytesEnd::new("data")))?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new("datas")))?;
        Ok(())
    }

    fn write_errors(&mut self, errors: &ErrorModelIr) -> EmitResult {
        if errors.is_empty() {
            return self
                .writer
                .write_event(Event::Empty(BytesStart::new("errors")));
        }

        self.writer
            .write_event(Event::Start(BytesStart::new("errors")))?;
        for connector in &errors.connectors {
            self.write_connector(connector)?;
        }
        for phenotype in &errors.phenotypes {
            self.write_phenotype(phenotype)?;
        }
        for genotype in &errors.genotypes {
            self.write_genotype(genotype)?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new("errors")))?;
        Ok(())
    }

    fn write_connector(&mut self, connector: &ConnectorIr) -> EmitResult {
        let mut elem = BytesStart::new("connector");
        elem.push_attribute(("name", connector.name.as_str()));
        elem.push_attribute(("type", connector.connector_type.as_str()));
        elem.push_attribute(("id", connector.id.as_str()));
        self.writer.write_event(Event::Start(elem))?;
        self.write_position_graphics(connector.position)?;
        self.writer
            .write_event(Event::End(BytesEnd::new("connector")))?;
        Ok(())
    }

    fn write_phenotype(&mut self, phenotype: &PhenotypeIr) -> EmitResult {
        let mut elem = BytesStart::new("phenotype");
        elem.push_attribute(("name", phenotype.name.as_str()));
        elem.push_attribute(("type", phenotype.phenotype_type.as_str()));
        elem.push_attribute(("id", phenotype.id.as_str()));
        self.writer.write_event(Event::Start(elem))?;

        self.write_position_graphics(phenotype.position)?;
        for connector_id in &phenotype.links {
            let mut link = BytesStart::new("phenotypetoconnector");
            link.push_attribute(("connectorid", connector_id.as_str()));
            self.writer.write_event(Event::Start(link))?;
            self.writer
                .write_event(Event::Empty(BytesStart::new("points")))?;
            self.writer
                .write_event(Event::End(BytesEnd::new("phenotypetoconnector")))?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new("phenotype")))?;
        Ok(())
    }

    fn write_genotype(&mut self, genotype: &GenotypeIr) -> EmitResult {
        let mut elem = BytesStart::new("genotype");
        elem.push_attribute(("gemstype", genotype.gemstype.as_str()));
        elem.push_attribute(("name", genotype.name.as_str()));
        elem.push_attribute(("type", genotype.genotype_type.as_str()));
        elem.push_attribute(("id", genotype.id.as_str()));
        self.writer.write_event(Event::Start(elem))?;

        self.write_position_graphics(genotype.position)?;
        for phenotype_id in &genotype.phenotype_links {
            let mut link = BytesStart::new("genotypetophenotype");
            link.push_attribute(("phenotypeid", phenotype_id.as_str()));
            self.writer.write_event(Event::Start(link))?;
            self.writer
                .write_event(Event::Empty(BytesStart::new("points")))?;
            self.writer
                .write_event(Event::End(BytesEnd::new("genotypetophenotype")))?;
        }
        for task_id in &genotype.task_links {
            let mut link = BytesStart::new("genotypetonode");
            link.push_attribute(("nodeid", task_id.as_str()));
            self.writer.write_event(Event::Start(link))?;
            self.writer
                .write_event(Event::Empty(BytesStart::new("points")))?;
            self.writer
                .write_event(Event::End(BytesEnd::new("genotypetonode")))?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new("genotype")))?;
        Ok(())
    }

    fn write_graphics(&mut self, x: i64, y: i64, folded: bool) -> EmitResult {
        self.writer
            .write_event(Event::Start(BytesStart::new("graphics")))?;
        let mut graphic = BytesStart::new("graphic");
        if folded {
            graphic.push_attribute(("folded", "false"));
        }
        self.writer.write_event(Event::Start(graphic))?;
        let mut position = BytesStart::new("position");
        position.push_attribute(("x", x.to_string().as_str()));
        position.push_attribute(("y", y.to_string().as_str()));
        self.writer.write_event(Event::Empty(position))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("graphic")))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("graphics")))?;
        Ok(())
    }

    fn write_position_graphics(&mut self, position: Position) -> EmitResult {
        self.writer
            .write_event(Event::Start(BytesStart::new("graphics")))?;
        self.writer
            .write_event(Event::Start(BytesStart::new("graphic")))?;
        let mut elem = BytesStart::new("position");
        elem.push_attribute(("x", format_coordinate(position.x).as_str()));
        elem.push_attribute(("y", format_coordinate(position.y).as_str()));
        self.writer.write_event(Event::Empty(elem))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("graphic")))?;
        self.writer
            .write_event(Event::End(BytesEnd::new("graphics")))?;
        Ok(())
    }

    fn write_property(&mut self, name: &str, type_attr: Option<&str>, value: &str) -> EmitResult {
        let mut elem = BytesStart::new("property");
        elem.push_attribute(("name", name));
        if let Some(type_attr) = type_attr {
            elem.push_attribute(("type", type_attr));
        }
        elem.push_attribute(("value", value));
        self.writer.write_event(Event::Empty(elem))
    }

    fn write_text_element(&mut self, name: &str, text: &str) -> EmitResult {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

/// Render a coordinate the way the dialect expects: integral values without a
/// fractional part. Values outside the i64 range keep the float rendering
/// instead of saturating.
fn format_coordinate(value: f64) -> String {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter;
    use serde_json::json;

    fn emit(doc: serde_json::Value) -> String {
        let model = converter::build_model(&doc).unwrap();
        String::from_utf8(emit_markup(&model).unwrap()).unwrap()
    }

    fn parse(xml: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(xml).expect("emitted markup parses")
    }

    #[test]
    fn test_root_attributes_and_fixed_sections() {
        let xml = emit(json!({ "label": "Login Procedure" }));
        let doc = parse(&xml);
        let root = doc.root_element();

        assert_eq!(root.tag_name().name(), "hamsters");
        assert_eq!(root.tag_name().namespace(), Some(HAMSTERS_NAMESPACE));
        assert_eq!(root.attribute("name"), Some("Login Procedure"));
        assert_eq!(root.attribute("version"), Some("7"));
        assert_eq!(
            root.attribute((XSI_NAMESPACE, "schemaLocation")),
            Some(format!("{HAMSTERS_NAMESPACE} {XSD_SCHEMA_LOCATION}").as_str())
        );

        for section in ["security", "parameters", "instancevalues", "parametersdefinitions"] {
            assert!(
                root.children().any(|n| n.tag_name().name() == section),
                "missing fixed section {section}"
            );
        }

        let timemanagement = root
            .descendants()
            .find(|n| n.tag_name().name() == "property" && n.attribute("name") == Some("timemanagement"))
            .expect("timemanagement property");
        assert_eq!(timemanagement.attribute("value"), Some("NORMAL"));
        assert_eq!(
            timemanagement.attribute("type"),
            Some("fr.irit.ics.circus.hamsters.api.TimeManagement")
        );
    }

    #[test]
    fn test_task_element_shape() {
        let xml = emit(json!({ "label": "Login", "description": "Authentication workflow" }));
        let doc = parse(&xml);
        let task = doc
            .descendants()
            .find(|n| n.tag_name().name() == "task")
            .expect("task element");

        assert_eq!(task.attribute("id"), Some("t0"));
        assert_eq!(task.attribute("type"), Some("goal"));
        assert_eq!(task.attribute("copy"), Some("false"));
        assert_eq!(task.attribute("knowledgeproceduraltype"), Some(""));

        let description = task
            .children()
            .find(|n| n.tag_name().name() == "description")
            .expect("description element");
        assert_eq!(description.text(), Some("Authentication workflow"));

        let graphic = task
            .descendants()
            .find(|n| n.tag_name().name() == "graphic")
            .expect("graphic element");
        assert_eq!(graphic.attribute("folded"), Some("false"));
    }

    #[test]
    fn test_description_falls_back_to_label_when_absent() {
        let xml = emit(json!({ "label": "Login" }));
        let doc = parse(&xml);
        let description = doc
            .descendants()
            .find(|n| n.tag_name().name() == "description")
            .expect("description element");
        assert_eq!(description.text(), Some("Login"));
    }

    #[test]
    fn test_sequence_operator_wraps_children_in_source_order() {
        let xml = emit(json!({
            "label": "Login",
            "operator": "sequence",
            "children": [ { "label": "Enter PIN" }, { "label": "Confirm" } ]
        }));
        let doc = parse(&xml);

        let operator = doc
            .descendants()
            .find(|n| n.tag_name().name() == "operator")
            .expect("operator element");
        assert_eq!(operator.attribute("type"), Some("sequence"));
        assert_eq!(operator.attribute("id"), Some("o0"));

        let child_ids: Vec<_> = operator
            .children()
            .filter(|n| n.tag_name().name() == "task")
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(child_ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_operator_children_layout() {
        let xml = emit(json!({
            "label": "Login",
            "operator": "sequence",
            "children": [ { "label": "a" }, { "label": "b" }, { "label": "c" } ]
        }));
        let doc = parse(&xml);

        let xs: Vec<_> = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "task" && n.attribute("id") != Some("t0"))
            .map(|task| {
                let position = task
                    .descendants()
                    .find(|n| n.tag_name().name() == "position")
                    .unwrap();
                (
                    position.attribute("x").unwrap().to_string(),
                    position.attribute("y").unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            xs,
            vec![
                ("0".to_string(), "200".to_string()),
                ("200".to_string(), "200".to_string()),
                ("400".to_string(), "200".to_string())
            ]
        );
    }

    #[test]
    fn test_children_without_operator_are_direct_task_children() {
        let xml = emit(json!({
            "label": "Login",
            "children": [ { "label": "Enter PIN" } ]
        }));
        let doc = parse(&xml);

        assert!(!doc.descendants().any(|n| n.tag_name().name() == "operator"));
        let root_task = doc
            .descendants()
            .find(|n| n.tag_name().name() == "task" && n.attribute("id") == Some("t0"))
            .unwrap();
        assert!(
            root_task
                .children()
                .any(|n| n.tag_name().name() == "task" && n.attribute("id") == Some("t1"))
        );
    }

    #[test]
    fn test_coreproperties_carry_resolved_values() {
        let xml = emit(json!({
            "label": "Login",
            "optional": true,
            "duration": { "min": 2, "max": 30, "unit": "s" },
            "loop": { "minIterations": 1, "maxIterations": 3 }
        }));
        let doc = parse(&xml);

        let property = |name: &str| {
            doc.descendants()
                .find(|n| n.tag_name().name() == "property" && n.attribute("name") == Some(name))
                .unwrap_or_else(|| panic!("missing property {name}"))
        };
        assert_eq!(property("optional").attribute("value"), Some("true"));
        assert_eq!(property("minexectime").attribute("value"), Some("2"));
        assert_eq!(property("maxexectime").attribute("value"), Some("30"));
        assert_eq!(property("iterative").attribute("value"), Some("3"));
        assert_eq!(
            property("responsibility").attribute("type"),
            Some("java.lang.Boolean")
        );
        assert_eq!(
            property("criticality").attribute("type"),
            Some("java.lang.Integer")
        );
    }

    #[test]
    fn test_empty_datas_and_errors_sections_present() {
        let xml = emit(json!({ "label": "Login" }));
        assert!(xml.contains("<datas/>"));
        assert!(xml.contains("<errors/>"));
    }

    #[test]
    fn test_data_element_with_links() {
        let xml = emit(json!({
            "label": "Login",
            "datas": [ {
                "description": "PIN store",
                "type": "informationdod",
                "links": [ { "taskId": "t0", "linkType": "STORE_TYPE" } ],
                "position": { "x": 10, "y": 20 }
            } ]
        }));
        let doc = parse(&xml);

        let data = doc
            .descendants()
            .find(|n| n.tag_name().name() == "data")
            .expect("data element");
        assert_eq!(data.attribute("type"), Some("informationdod"));
        assert_eq!(data.attribute("id"), Some("a0"));

        let link = data
            .children()
            .find(|n| n.tag_name().name() == "link")
            .expect("link element");
        assert_eq!(link.attribute("feature"), Some("none"));
        assert_eq!(link.attribute("sourceid"), Some("t0"));
        assert_eq!(link.attribute("type"), Some("STORE_TYPE"));
        assert!(link.children().any(|n| n.tag_name().name() == "points"));

        let position = data
            .descendants()
            .find(|n| n.tag_name().name() == "position")
            .unwrap();
        assert_eq!(position.attribute("x"), Some("10"));
        assert_eq!(position.attribute("y"), Some("20"));
    }

    #[test]
    fn test_error_model_elements() {
        let xml = emit(json!({
            "label": "Login",
            "errors": {
                "connectors": [ { "name": "gate", "type": "OR" } ],
                "phenotypes": [ { "name": "wrong key", "type": "humanerror", "links": ["e0"] } ],
                "genotypes": [ {
                    "name": "memory lapse", "type": "lapse", "gemstype": "Routine",
                    "phenotypeLinks": ["e1"], "taskLinks": ["t0"]
                } ]
            }
        }));
        let doc = parse(&xml);

        let connector = doc
            .descendants()
            .find(|n| n.tag_name().name() == "connector")
            .expect("connector element");
        assert_eq!(connector.attribute("type"), Some("OR"));
        assert_eq!(connector.attribute("id"), Some("e0"));

        let phenotype = doc
            .descendants()
            .find(|n| n.tag_name().name() == "phenotype")
            .expect("phenotype element");
        assert_eq!(phenotype.attribute("id"), Some("e1"));
        let to_connector = phenotype
            .children()
            .find(|n| n.tag_name().name() == "phenotypetoconnector")
            .expect("phenotypetoconnector");
        assert_eq!(to_connector.attribute("connectorid"), Some("e0"));

        let genotype = doc
            .descendants()
            .find(|n| n.tag_name().name() == "genotype")
            .expect("genotype element");
        assert_eq!(genotype.attribute("gemstype"), Some("Routine"));
        assert!(
            genotype
                .children()
                .any(|n| n.tag_name().name() == "genotypetophenotype"
                    && n.attribute("phenotypeid") == Some("e1"))
        );
        assert!(
            genotype
                .children()
                .any(|n| n.tag_name().name() == "genotypetonode"
                    && n.attribute("nodeid") == Some("t0"))
        );
    }

    #[test]
    fn test_coordinate_formatting() {
        assert_eq!(format_coordinate(0.0), "0");
        assert_eq!(format_coordinate(120.0), "120");
        assert_eq!(format_coordinate(10.5), "10.5");
        // Out-of-range integral values must not saturate to i64::MAX.
        assert_eq!(format_coordinate(1e300), "1e300");
        assert_eq!(format_coordinate(-1e300), "-1e300");
    }

    #[test]
    fn test_label_with_special_characters_is_escaped() {
        let xml = emit(json!({ "label": "Fish & Chips <deluxe>" }));
        assert!(xml.contains("Fish &amp; Chips &lt;deluxe&gt;"));
        // Still well-formed.
        parse(&xml);
    }
}
