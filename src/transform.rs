//! Task tree transformation
//!
//! Depth-first, pre-order walk over the validated input document. Each raw task
//! node becomes a fully defaulted [`TaskIr`]: identifier allocated or taken over,
//! type resolved by depth (root `goal`, everything else `abstract`), duration and
//! loop defaults filled, and the operator/children nesting shape recorded.
//!
//! This component assumes the input already passed the schema validator and does
//! not re-validate field types.

use serde_json::{Map, Value};

use crate::error::{ConvertError, Result, SchemaViolation};
use crate::id_alloc::{IdAllocator, IdClass};
use crate::model::{Duration, LoopSpec, TaskIr};

/// Walk the raw document and reserve every explicit task id, so auto-allocation
/// can never collide with an id that appears later in the tree. A task id that is
/// already reserved was used by an earlier task; that collision is a terminal
/// input violation, never silently emitted twice.
pub fn reserve_explicit_task_ids(raw: &Value, alloc: &mut IdAllocator) -> Result<()> {
    reserve_at(raw, "root", alloc)
}

fn reserve_at(raw: &Value, path: &str, alloc: &mut IdAllocator) -> Result<()> {
    if let Some(id) = raw.get("id").and_then(Value::as_str) {
        if alloc.is_reserved(IdClass::Task, id) {
            return Err(ConvertError::input_violations(vec![SchemaViolation::new(
                format!("{path}/id"),
                format!("duplicate task id '{id}'"),
            )]));
        }
        alloc.reserve(IdClass::Task, id);
    }
    if let Some(children) = raw.get("children").and_then(Value::as_array) {
        for (index, child) in children.iter().enumerate() {
            reserve_at(child, &format!("{path}/children/{index}"), alloc)?;
        }
    }
    Ok(())
}

/// Converts raw task nodes into fully defaulted internal records.
pub struct TaskTreeTransformer<'a> {
    alloc: &'a mut IdAllocator,
}

impl<'a> TaskTreeTransformer<'a> {
    pub fn new(alloc: &'a mut IdAllocator) -> Self {
        Self { alloc }
    }

    /// Transform the document's root task and, recursively, all its children.
    pub fn transform_root(&mut self, raw: &Value) -> Result<TaskIr> {
        reserve_explicit_task_ids(raw, self.alloc)?;
        Ok(self.transform(raw, true))
    }

    fn transform(&mut self, raw: &Value, is_root: bool) -> TaskIr {
        let id = self
            .alloc
            .resolve(IdClass::Task, raw.get("id").and_then(Value::as_str));

        let label = raw
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("Unnamed Task")
            .to_string();

        // Explicit type always wins; otherwise the default depends on depth.
        let task_type = match raw.get("type").and_then(Value::as_str) {
            Some(explicit) => explicit.to_string(),
            None if is_root => "goal".to_string(),
            None => "abstract".to_string(),
        };

        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let operator = raw
            .get("operator")
            .and_then(Value::as_str)
            .map(str::to_string);

        let duration = raw.get("duration").map(parse_duration).unwrap_or_default();
        let loop_spec = raw.get("loop").map(parse_loop).unwrap_or_default();

        let optional = raw
            .get("optional")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let metadata = raw
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new);

        let raw_children = raw
            .get("children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        // The wrapper id is allocated before recursing so that a parent operator
        // always numbers before any operator nested below it.
        let operator_id = match (&operator, raw_children.is_empty()) {
            (Some(_), false) => Some(self.alloc.next_id(IdClass::Operator)),
            _ => None,
        };

        let children = raw_children
            .iter()
            .map(|child| self.transform(child, false))
            .collect();

        TaskIr {
            id,
            label,
            task_type,
            description,
            operator,
            operator_id,
            duration,
            loop_spec,
            optional,
            metadata,
            children,
        }
    }
}

fn parse_duration(raw: &Value) -> Duration {
    Duration {
        min: raw.get("min").and_then(Value::as_u64).unwrap_or(0),
        max: raw.get("max").and_then(Value::as_u64).unwrap_or(0),
        unit: raw
            .get("unit")
            .and_then(Value::as_str)
            .unwrap_or("s")
            .to_string(),
    }
}

fn parse_loop(raw: &Value) -> LoopSpec {
    LoopSpec {
        min_iterations: raw.get("minIterations").and_then(Value::as_u64).unwrap_or(0),
        max_iterations: raw.get("maxIterations").and_then(Value::as_u64).unwrap_or(0),
    }
}
