//! Figure tree node types.
//!
//! Two container variants make up every figure tree:
//!
//! | Rust type | Semantics                                             |
//! |-----------|-------------------------------------------------------|
//! | `ObjNode` | Ordered, schema-validated mapping (trace, layout, …)  |
//! | `ArrNode` | Ordered sequence of typed items (trace list, …)       |
//!
//! Every node records its schema name, the object-name chain above it, and
//! the key/index path that reaches it from the root. That context is
//! resolved when the node is attached and rebound if the subtree moves; it
//! is what makes the same attribute name resolve differently depending on
//! its position in the tree.
//!
//! All writes go through validation. After any successful mutation the tree
//! serializes to schema-valid JSON; a failed write leaves the tree
//! unchanged. Mutating a subtree while iterating it is the caller's
//! responsibility to avoid.

use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde_json::{Map, Value};

use graph_reference::{graph_reference, GraphReference, Role};

use crate::error::{GraphError, Shape};
use crate::path::Path;

pub mod data;
pub mod factory;
pub mod print;
pub mod update;

pub(crate) fn reference() -> &'static GraphReference {
    graph_reference()
}

/// Layout attribute roots that accept a synthesized numeric suffix
/// (`xaxis2`, `scene3`) for additional subplots.
const SUBPLOT_ROOTS: &[&str] = &[
    "xaxis",
    "yaxis",
    "zaxis",
    "scene",
    "geo",
    "radialaxis",
    "angularaxis",
    "lataxis",
    "lonaxis",
];

fn digits_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+$").expect("hard-coded pattern"))
}

/// The subplot root of a synthesized key, if it has one. Leading-zero
/// suffixes are not subplot keys.
fn subplot_root(key: &str) -> Option<&str> {
    let m = digits_suffix().find(key)?;
    if key[m.start()..].starts_with('0') {
        return None;
    }
    let root = &key[..m.start()];
    SUBPLOT_ROOTS.contains(&root).then_some(root)
}

// ── GraphValue ────────────────────────────────────────────────────────────

/// A value held by a keyed node: either a plain JSON scalar/array kept
/// verbatim, or a validated child container.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Scalar(Value),
    Obj(ObjNode),
    Arr(ArrNode),
}

impl GraphValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            GraphValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&ObjNode> {
        match self {
            GraphValue::Obj(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_obj_mut(&mut self) -> Option<&mut ObjNode> {
        match self {
            GraphValue::Obj(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_arr(&self) -> Option<&ArrNode> {
        match self {
            GraphValue::Arr(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_arr_mut(&mut self) -> Option<&mut ArrNode> {
        match self {
            GraphValue::Arr(node) => Some(node),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            GraphValue::Scalar(value) => value.clone(),
            GraphValue::Obj(node) => node.to_value(),
            GraphValue::Arr(node) => node.to_value(),
        }
    }
}

/// A freshly constructed tree: the factory's output.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    Obj(ObjNode),
    Arr(ArrNode),
}

impl GraphNode {
    pub fn as_obj(&self) -> Option<&ObjNode> {
        match self {
            GraphNode::Obj(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_arr(&self) -> Option<&ArrNode> {
        match self {
            GraphNode::Arr(node) => Some(node),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            GraphNode::Obj(node) => node.to_value(),
            GraphNode::Arr(node) => node.to_value(),
        }
    }

    pub(crate) fn into_graph_value(self) -> GraphValue {
        match self {
            GraphNode::Obj(node) => GraphValue::Obj(node),
            GraphNode::Arr(node) => GraphValue::Arr(node),
        }
    }
}

// ── ObjNode ───────────────────────────────────────────────────────────────

/// Ordered mapping from attribute name to value, validated against the
/// schema context the node sits in.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjNode {
    name: String,
    ancestors: Vec<String>,
    path: Path,
    entries: IndexMap<String, GraphValue>,
}

impl ObjNode {
    pub(crate) fn with_context(
        name: &str,
        ancestors: Vec<String>,
        path: Path,
    ) -> Result<Self, GraphError> {
        if !reference().contains_object(name) {
            return Err(GraphError::Schema(graph_reference::SchemaError::UnknownObject(
                name.to_string(),
            )));
        }
        let mut node = Self { name: name.to_string(), ancestors, path, entries: IndexMap::new() };
        if reference().is_trace(name) {
            node.entries
                .insert("type".to_string(), GraphValue::Scalar(Value::String(name.to_string())));
        }
        Ok(node)
    }

    /// The schema object name this node was created as.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ancestor object names, root first.
    pub fn get_parents(&self) -> &[String] {
        &self.ancestors
    }

    /// The key/index chain that reaches this node from the root.
    pub fn get_path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, key: &str) -> Option<&GraphValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut GraphValue> {
        self.entries.get_mut(key)
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<GraphValue> {
        self.entries.shift_remove(key)
    }

    // ── Validated write ───────────────────────────────────────────────────

    /// Write `key = value`, validating against this node's schema context.
    /// Fails without touching the node if the key is undeclared or the
    /// value's shape does not fit the key's role.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), GraphError> {
        self.set_impl(key, value, true)
    }

    /// Like [`set`](Self::set) but silently ignores invalid keys/values.
    pub fn set_lenient(&mut self, key: &str, value: Value) {
        let _ = self.set_impl(key, value, false);
    }

    pub(crate) fn set_impl(
        &mut self,
        key: &str,
        value: Value,
        strict: bool,
    ) -> Result<(), GraphError> {
        if self.is_src_key(key) {
            return match resolve_src_id(key, &value) {
                Ok(id) => {
                    self.entries
                        .insert(key.to_string(), GraphValue::Scalar(Value::String(id)));
                    Ok(())
                }
                Err(err) if strict => Err(err),
                Err(_) => Ok(()),
            };
        }

        let Some(schema_key) = self.schema_key(key)? else {
            if strict {
                return Err(GraphError::UnknownAttribute {
                    object: self.name.clone(),
                    key: key.to_string(),
                    path: self.path.clone(),
                });
            }
            return Ok(());
        };

        let role = reference().resolve_role(&self.name, &self.ancestors, &schema_key, Some(&value));
        if role == Some(Role::Object) {
            if let Some(child) = self.build_child(key, &schema_key, value, strict)? {
                self.entries.insert(key.to_string(), child);
            }
        } else {
            self.entries.insert(key.to_string(), GraphValue::Scalar(value));
        }
        Ok(())
    }

    /// Convert a raw value into the child container the schema requires at
    /// `schema_key`, built under this node's context. Returns `Ok(None)`
    /// when lenient mode swallows a failure.
    fn build_child(
        &self,
        key: &str,
        schema_key: &str,
        value: Value,
        strict: bool,
    ) -> Result<Option<GraphValue>, GraphError> {
        let child_ancestors = self.child_ancestors();
        let child_path = self.path.join_key(key);

        let built = if reference().attribute_is_array(schema_key, &self.name) {
            if !value.is_array() {
                if strict {
                    return Err(GraphError::ValueType {
                        key: key.to_string(),
                        expected: Shape::Sequence,
                        path: child_path,
                    });
                }
                return Ok(None);
            }
            factory::arr_with_context(schema_key, value, child_ancestors, child_path, strict)
                .map(GraphValue::Arr)
        } else {
            let Value::Object(map) = value else {
                if strict {
                    return Err(GraphError::ValueType {
                        key: key.to_string(),
                        expected: Shape::Mapping,
                        path: child_path,
                    });
                }
                return Ok(None);
            };
            factory::obj_with_context(schema_key, map, child_ancestors, child_path, strict)
                .map(GraphValue::Obj)
        };

        match built {
            Ok(child) => Ok(Some(child)),
            Err(err) if strict => Err(err),
            Err(_) => Ok(None),
        }
    }

    /// The schema attribute a written key resolves to: the key itself when
    /// declared, or the subplot root for synthesized layout keys.
    fn schema_key(&self, key: &str) -> Result<Option<String>, GraphError> {
        let attrs = self.schema_attributes()?;
        if attrs.contains(key) {
            return Ok(Some(key.to_string()));
        }
        if self.name == "layout" {
            if let Some(root) = subplot_root(key) {
                let is_object = reference()
                    .resolve_role(&self.name, &self.ancestors, root, None)
                    == Some(Role::Object);
                if attrs.contains(root) && is_object {
                    return Ok(Some(root.to_string()));
                }
            }
        }
        Ok(None)
    }

    fn schema_attributes(&self) -> Result<IndexSet<String>, GraphError> {
        Ok(reference().valid_attributes(&self.name, &self.ancestors)?)
    }

    /// True for `<base>src` keys whose base is itself a valid attribute.
    /// These store a reference to a remotely hosted column rather than
    /// inline values.
    fn is_src_key(&self, key: &str) -> bool {
        let Some(base) = key.strip_suffix("src") else { return false };
        self.schema_attributes()
            .map(|attrs| attrs.contains(base))
            .unwrap_or(false)
    }

    // ── Lazy children ─────────────────────────────────────────────────────

    /// The child at `key`, creating an empty node of the declared type if
    /// the key is a valid object-role attribute that is not set yet. Reads
    /// of non-object attributes never create anything.
    pub fn get_or_create_child(&mut self, key: &str) -> Result<&mut GraphValue, GraphError> {
        if !self.entries.contains_key(key) {
            let schema_key = self.schema_key(key)?.ok_or_else(|| GraphError::UnknownAttribute {
                object: self.name.clone(),
                key: key.to_string(),
                path: self.path.clone(),
            })?;
            let role = reference().resolve_role(&self.name, &self.ancestors, &schema_key, None);
            if role != Some(Role::Object) {
                return Err(GraphError::ValueType {
                    key: key.to_string(),
                    expected: Shape::Mapping,
                    path: self.path.join_key(key),
                });
            }
            let child = factory::empty_with_context(
                &schema_key,
                self.child_ancestors(),
                self.path.join_key(key),
            )?;
            self.entries.insert(key.to_string(), child.into_graph_value());
        }
        self.entries.get_mut(key).ok_or_else(|| GraphError::UnknownAttribute {
            object: String::new(),
            key: key.to_string(),
            path: Path::new(),
        })
    }

    /// [`get_or_create_child`](Self::get_or_create_child), narrowed to a
    /// keyed child.
    pub fn child_obj(&mut self, key: &str) -> Result<&mut ObjNode, GraphError> {
        let err_path = self.path.join_key(key);
        match self.get_or_create_child(key)? {
            GraphValue::Obj(node) => Ok(node),
            _ => Err(GraphError::ValueType {
                key: key.to_string(),
                expected: Shape::Mapping,
                path: err_path,
            }),
        }
    }

    /// [`get_or_create_child`](Self::get_or_create_child), narrowed to an
    /// indexed child.
    pub fn child_arr(&mut self, key: &str) -> Result<&mut ArrNode, GraphError> {
        let err_path = self.path.join_key(key);
        match self.get_or_create_child(key)? {
            GraphValue::Arr(node) => Ok(node),
            _ => Err(GraphError::ValueType {
                key: key.to_string(),
                expected: Shape::Sequence,
                path: err_path,
            }),
        }
    }

    // ── Context plumbing ──────────────────────────────────────────────────

    pub(crate) fn child_ancestors(&self) -> Vec<String> {
        let mut chain = self.ancestors.clone();
        chain.push(self.name.clone());
        chain
    }

    /// Re-anchor this subtree at a new position, recursively rebinding every
    /// descendant's recorded context.
    pub(crate) fn rebind(&mut self, ancestors: Vec<String>, path: Path) {
        self.ancestors = ancestors;
        self.path = path;
        let child_ancestors = self.child_ancestors();
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        for key in keys {
            let child_path = self.path.join_key(&key);
            match self.entries.get_mut(&key) {
                Some(GraphValue::Obj(node)) => node.rebind(child_ancestors.clone(), child_path),
                Some(GraphValue::Arr(node)) => node.rebind(child_ancestors.clone(), child_path),
                _ => {}
            }
        }
    }

    // ── Serialization ─────────────────────────────────────────────────────

    /// Plain JSON view, preserving insertion order.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.entries {
            map.insert(key.clone(), value.to_value());
        }
        Value::Object(map)
    }
}

/// Resolve the value written to a src key into a plain column id: a string
/// is taken verbatim, a mapping must expose a non-empty string `id`.
fn resolve_src_id(key: &str, value: &Value) -> Result<String, GraphError> {
    let id = match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                return Err(GraphError::SrcResolution {
                    key: key.to_string(),
                    reason: "expected a string id or a column reference exposing `id`".to_string(),
                })
            }
        },
        _ => {
            return Err(GraphError::SrcResolution {
                key: key.to_string(),
                reason: "expected a string id or a column reference exposing `id`".to_string(),
            })
        }
    };
    if id.is_empty() {
        let column = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>");
        return Err(GraphError::SrcResolution {
            key: key.to_string(),
            reason: format!("column `{column}` has no id assigned yet"),
        });
    }
    Ok(id)
}

// ── ArrNode ───────────────────────────────────────────────────────────────

/// Ordered sequence of keyed nodes, each conforming to one of a declared
/// set of item types. Insertion validates and converts at the moment of the
/// write, never lazily.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrNode {
    name: String,
    ancestors: Vec<String>,
    path: Path,
    permitted: Vec<String>,
    items: Vec<ObjNode>,
}

impl ArrNode {
    pub(crate) fn with_context(
        name: &str,
        ancestors: Vec<String>,
        path: Path,
    ) -> Result<Self, GraphError> {
        let permitted = reference()
            .array_items(name, &ancestors)?
            .ok_or_else(|| {
                GraphError::Schema(graph_reference::SchemaError::UnknownObject(name.to_string()))
            })?;
        Ok(Self { name: name.to_string(), ancestors, path, permitted, items: Vec::new() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_parents(&self) -> &[String] {
        &self.ancestors
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }

    /// The item-type names this container accepts.
    pub fn permitted_items(&self) -> &[String] {
        &self.permitted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ObjNode> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ObjNode> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjNode> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ObjNode> {
        self.items.iter_mut()
    }

    // ── Validated insertion ───────────────────────────────────────────────

    /// Validate a raw element and append it.
    pub fn push(&mut self, value: Value) -> Result<(), GraphError> {
        let index = self.items.len();
        if let Some(item) = self.value_to_item(index, value, true)? {
            self.items.push(item);
        }
        Ok(())
    }

    /// Append, silently dropping an element no permitted item type accepts.
    pub fn push_lenient(&mut self, value: Value) {
        let index = self.items.len();
        if let Ok(Some(item)) = self.value_to_item(index, value, false) {
            self.items.push(item);
        }
    }

    /// Validate and append every element of `values`.
    pub fn extend(&mut self, values: Vec<Value>) -> Result<(), GraphError> {
        for value in values {
            self.push(value)?;
        }
        Ok(())
    }

    /// Validate a raw element and splice it in at `index`.
    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), GraphError> {
        if index > self.items.len() {
            return Err(GraphError::OutOfBounds {
                index,
                len: self.items.len(),
                path: self.path.clone(),
            });
        }
        if let Some(item) = self.value_to_item(index, value, true)? {
            self.items.insert(index, item);
            self.rebind_tail(index + 1);
        }
        Ok(())
    }

    /// Validate a raw element and replace the one at `index`.
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), GraphError> {
        if index >= self.items.len() {
            return Err(GraphError::OutOfBounds {
                index,
                len: self.items.len(),
                path: self.path.clone(),
            });
        }
        if let Some(item) = self.value_to_item(index, value, true)? {
            self.items[index] = item;
        }
        Ok(())
    }

    /// Remove and return the item at `index`, detaching its subtree.
    pub fn remove(&mut self, index: usize) -> Result<ObjNode, GraphError> {
        if index >= self.items.len() {
            return Err(GraphError::OutOfBounds {
                index,
                len: self.items.len(),
                path: self.path.clone(),
            });
        }
        let item = self.items.remove(index);
        self.rebind_tail(index);
        Ok(item)
    }

    /// Convert a raw element into an item node. Trace containers dispatch on
    /// the element's `type` field (default `scatter`); other containers have
    /// a single permitted item type. Returns `Ok(None)` when lenient mode
    /// drops the element.
    pub(crate) fn value_to_item(
        &self,
        index: usize,
        value: Value,
        strict: bool,
    ) -> Result<Option<ObjNode>, GraphError> {
        let item_path = self.path.join_index(index);
        let Value::Object(map) = value else {
            if strict {
                return Err(GraphError::Structural { expected: Shape::Mapping, path: item_path });
            }
            return Ok(None);
        };

        let item_type = if self.name == "data" {
            let tag = map
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("scatter")
                .to_string();
            if !self.permitted.contains(&tag) {
                if strict {
                    return Err(GraphError::InvalidTypeTag {
                        index,
                        tag,
                        permitted: self.permitted.clone(),
                        path: self.path.clone(),
                    });
                }
                return Ok(None);
            }
            tag
        } else {
            match self.permitted.first() {
                Some(item_type) => item_type.clone(),
                None => {
                    if strict {
                        return Err(GraphError::Structural {
                            expected: Shape::Mapping,
                            path: item_path,
                        });
                    }
                    return Ok(None);
                }
            }
        };

        let built =
            factory::obj_with_context(&item_type, map, self.child_ancestors(), item_path, strict);
        match built {
            Ok(item) => Ok(Some(item)),
            Err(err) if strict => Err(err),
            Err(_) => Ok(None),
        }
    }

    pub(crate) fn push_item(&mut self, item: ObjNode) {
        self.items.push(item);
    }

    // ── Context plumbing ──────────────────────────────────────────────────

    pub(crate) fn child_ancestors(&self) -> Vec<String> {
        let mut chain = self.ancestors.clone();
        chain.push(self.name.clone());
        chain
    }

    pub(crate) fn rebind(&mut self, ancestors: Vec<String>, path: Path) {
        self.ancestors = ancestors;
        self.path = path;
        self.rebind_tail(0);
    }

    fn rebind_tail(&mut self, from: usize) {
        let child_ancestors = self.child_ancestors();
        for i in from..self.items.len() {
            let child_path = self.path.join_index(i);
            self.items[i].rebind(child_ancestors.clone(), child_path);
        }
    }

    // ── Serialization ─────────────────────────────────────────────────────

    pub fn to_value(&self) -> Value {
        Value::Array(self.items.iter().map(ObjNode::to_value).collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
