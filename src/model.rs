//! Internal representation of a converted task model
//!
//! Every record here is fully defaulted: once the transformer and linker have run,
//! no field is "absent because of a default". Serializing a [`ModelIr`] with serde
//! produces the normalized intermediate JSON representation, whose shape mirrors the
//! input schema with all optional fields materialized.
//!
//! Ownership is strictly tree-shaped for tasks; auxiliary entities reference tasks
//! (and each other) through plain id strings, never through back-pointers.

use serde::Serialize;
use serde_json::{Map, Value};

/// Resolved task duration. Defaults to `(0, 0, s)`.
///
/// The unit default is always `s` and is never inherited from the parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duration {
    pub min: u64,
    pub max: u64,
    pub unit: String,
}

impl Default for Duration {
    fn default() -> Self {
        Self {
            min: 0,
            max: 0,
            unit: "s".to_string(),
        }
    }
}

/// Resolved loop bounds. `(0, 0)` is the materialized "no loop" value: the markup
/// emitter renders no iterative behaviour for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSpec {
    pub min_iterations: u64,
    pub max_iterations: u64,
}

impl LoopSpec {
    /// Whether the task actually loops.
    pub fn is_active(&self) -> bool {
        self.min_iterations > 0 || self.max_iterations > 0
    }
}

/// 2D position of an auxiliary entity in the model diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One fully defaulted task node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskIr {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub description: String,
    /// Temporal operator kind, or `null` when the task has none. Serialized even
    /// when absent so the IR carries every attribute explicitly.
    pub operator: Option<String>,
    /// Allocated wrapper id (`o<n>`), present exactly when the operator nests
    /// children. Internal bookkeeping, not part of the IR mirror of the input.
    #[serde(skip)]
    pub operator_id: Option<String>,
    pub duration: Duration,
    #[serde(rename = "loop")]
    pub loop_spec: LoopSpec,
    pub optional: bool,
    pub metadata: Map<String, Value>,
    pub children: Vec<TaskIr>,
}

/// How a task's children are rendered in markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Nesting<'a> {
    /// No children.
    Leaf,
    /// Children emitted as direct task children.
    Direct(&'a [TaskIr]),
    /// Children wrapped inside an operator element of the given kind and id.
    Wrapped {
        kind: &'a str,
        operator_id: &'a str,
        children: &'a [TaskIr],
    },
}

impl TaskIr {
    /// The nesting shape of this task: operator-wrapped children, direct children,
    /// or none. A lone operator without children is a marker only and produces
    /// [`Nesting::Leaf`].
    pub fn nesting(&self) -> Nesting<'_> {
        if self.children.is_empty() {
            return Nesting::Leaf;
        }
        match (&self.operator, &self.operator_id) {
            (Some(kind), Some(operator_id)) => Nesting::Wrapped {
                kind,
                operator_id,
                children: &self.children,
            },
            _ => Nesting::Direct(&self.children),
        }
    }

    /// Depth-first, pre-order iteration over this task and all descendants.
    pub fn iter_preorder(&self) -> impl Iterator<Item = &TaskIr> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let task = stack.pop()?;
            for child in task.children.iter().rev() {
                stack.push(child);
            }
            Some(task)
        })
    }
}

/// A resolved link from a data object to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLink {
    pub task_id: String,
    pub link_type: String,
}

/// One data object of the DOD sub-model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObjectIr {
    pub id: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub description: String,
    pub links: Vec<DataLink>,
    pub position: Position,
}

/// Logic-gate connector of the error sub-model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorIr {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub connector_type: String,
    pub position: Position,
}

/// Observable failure linked to connectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhenotypeIr {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub phenotype_type: String,
    pub position: Position,
    pub links: Vec<String>,
}

/// Root-cause record linked to phenotypes and tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenotypeIr {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub genotype_type: String,
    pub gemstype: String,
    pub position: Position,
    pub phenotype_links: Vec<String>,
    pub task_links: Vec<String>,
}

/// The three error collections, sharing one `e<n>` id namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorModelIr {
    pub connectors: Vec<ConnectorIr>,
    pub phenotypes: Vec<PhenotypeIr>,
    pub genotypes: Vec<GenotypeIr>,
}

impl ErrorModelIr {
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty() && self.phenotypes.is_empty() && self.genotypes.is_empty()
    }
}

/// The complete converted model: root task plus auxiliary sub-models.
///
/// Serializes to the IR document: the root task's fields at the top level with
/// `datas` and `errors` alongside, mirroring the input schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelIr {
    #[serde(flatten)]
    pub task: TaskIr,
    pub datas: Vec<DataObjectIr>,
    pub errors: ErrorModelIr,
}

impl ModelIr {
    /// Serialize the normalized intermediate representation as pretty JSON bytes.
    pub fn to_ir_json(&self) -> crate::error::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
