//! Construction of validated trees from raw JSON values.
//!
//! Construction and post-construction mutation share one code path: a keyed
//! node is built by writing each raw key/value pair through the same
//! validated write used later, so both enforce identical rules.

use serde_json::{Map, Value};

use crate::error::{GraphError, Shape};
use crate::node::{reference, ArrNode, GraphNode, ObjNode};
use crate::path::Path;

/// Build a validated tree for the object named `name` from a raw value.
///
/// In strict mode any invalid key or element aborts construction; in
/// lenient mode offending keys/elements are silently skipped. A raw value
/// whose outermost shape does not match the object kind errors in either
/// mode.
pub fn create(name: &str, value: Value, strict: bool) -> Result<GraphNode, GraphError> {
    create_with_context(name, value, Vec::new(), Path::new(), strict)
}

pub(crate) fn create_with_context(
    name: &str,
    value: Value,
    ancestors: Vec<String>,
    path: Path,
    strict: bool,
) -> Result<GraphNode, GraphError> {
    if reference().array_items(name, &ancestors)?.is_some() {
        arr_with_context(name, value, ancestors, path, strict).map(GraphNode::Arr)
    } else {
        let Value::Object(map) = value else {
            return Err(GraphError::Structural { expected: Shape::Mapping, path });
        };
        obj_with_context(name, map, ancestors, path, strict).map(GraphNode::Obj)
    }
}

/// An empty node of the right kind for `name`, used when a missing child is
/// materialized on first access.
pub(crate) fn empty_with_context(
    name: &str,
    ancestors: Vec<String>,
    path: Path,
) -> Result<GraphNode, GraphError> {
    if reference().array_items(name, &ancestors)?.is_some() {
        ArrNode::with_context(name, ancestors, path).map(GraphNode::Arr)
    } else {
        ObjNode::with_context(name, ancestors, path).map(GraphNode::Obj)
    }
}

pub(crate) fn obj_with_context(
    name: &str,
    map: Map<String, Value>,
    ancestors: Vec<String>,
    path: Path,
    strict: bool,
) -> Result<ObjNode, GraphError> {
    let mut node = ObjNode::with_context(name, ancestors, path)?;
    for (key, value) in map {
        node.set_impl(&key, value, strict)?;
    }
    Ok(node)
}

pub(crate) fn arr_with_context(
    name: &str,
    value: Value,
    ancestors: Vec<String>,
    path: Path,
    strict: bool,
) -> Result<ArrNode, GraphError> {
    let Value::Array(elements) = value else {
        return Err(GraphError::Structural { expected: Shape::Sequence, path });
    };
    let mut node = ArrNode::with_context(name, ancestors, path)?;
    for element in elements {
        let index = node.len();
        if let Some(item) = node.value_to_item(index, element, strict)? {
            node.push_item(item);
        }
    }
    Ok(node)
}

// ── Tests ─────────────────────────────────────────────────────────────────
