//! The figure facade: the root node with its two fixed children.
//!
//! A figure is a keyed node composing `data` (the validated trace sequence)
//! and `layout` (a keyed node that also accepts synthesized subplot keys
//! such as `xaxis2` or `scene3`). The `data` child always exists; `layout`
//! materializes on first access.

use serde_json::Value;

use crate::error::{GraphError, Shape};
use crate::node::{factory, ArrNode, GraphNode, GraphValue, ObjNode};
use crate::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    root: ObjNode,
}

impl Figure {
    /// An empty figure with an empty trace sequence.
    pub fn new() -> Self {
        // `figure` and its `data` child are registered for every schema
        // document, so neither step can fail
        let mut root = ObjNode::with_context("figure", Vec::new(), Path::new())
            .expect("`figure` is always a registered object");
        root.get_or_create_child("data")
            .expect("`data` is always a valid figure child");
        Self { root }
    }

    /// Build a figure from a raw nested value, validating everything.
    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        Self::build(value, true)
    }

    /// Build a figure, silently skipping invalid keys and dropping
    /// unconvertible trace entries.
    pub fn from_value_lenient(value: Value) -> Result<Self, GraphError> {
        Self::build(value, false)
    }

    fn build(value: Value, strict: bool) -> Result<Self, GraphError> {
        let root = match factory::create("figure", value, strict)? {
            GraphNode::Obj(root) => root,
            GraphNode::Arr(_) => {
                return Err(GraphError::Structural { expected: Shape::Mapping, path: Path::new() })
            }
        };
        let mut figure = Self { root };
        figure.root.get_or_create_child("data")?;
        Ok(figure)
    }

    // ── Fixed children ────────────────────────────────────────────────────

    /// The trace sequence.
    pub fn data(&self) -> &ArrNode {
        match self.root.get("data") {
            Some(GraphValue::Arr(node)) => node,
            _ => unreachable!("figure always holds a data sequence"),
        }
    }

    pub fn data_mut(&mut self) -> &mut ArrNode {
        match self.root.get_mut("data") {
            Some(GraphValue::Arr(node)) => node,
            _ => unreachable!("figure always holds a data sequence"),
        }
    }

    /// The layout, if one has been set.
    pub fn layout(&self) -> Option<&ObjNode> {
        self.root.get("layout").and_then(GraphValue::as_obj)
    }

    /// The layout, created empty on first access.
    pub fn layout_mut(&mut self) -> Result<&mut ObjNode, GraphError> {
        match self.root.get_or_create_child("layout")? {
            GraphValue::Obj(node) => Ok(node),
            _ => unreachable!("layout is a keyed object"),
        }
    }

    /// Validate a raw trace and append it to the sequence.
    pub fn add_trace(&mut self, trace: Value) -> Result<(), GraphError> {
        self.data_mut().push(trace)
    }

    // ── Delegating operations ─────────────────────────────────────────────

    /// The plot-determining subset of the trace sequence.
    pub fn get_data(&self, flatten: bool) -> Value {
        self.data().get_data(flatten)
    }

    pub fn update(&mut self, changes: &Value) -> Result<(), GraphError> {
        self.root.update(changes)
    }

    pub fn strip_style(&mut self) {
        self.root.strip_style();
    }

    pub fn force_clean(&mut self) {
        self.root.force_clean();
        // the root keeps its data sequence even when cleaning empties it
        let _ = self.root.get_or_create_child("data");
    }

    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    pub fn to_string_pretty(&self) -> String {
        self.root.to_string_pretty()
    }

    /// The underlying root node.
    pub fn as_node(&self) -> &ObjNode {
        &self.root
    }

    pub fn as_node_mut(&mut self) -> &mut ObjNode {
        &mut self.root
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
