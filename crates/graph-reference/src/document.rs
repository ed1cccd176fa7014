//! Loading and indexing of the schema document.
//!
//! The document is consumed as an opaque versioned JSON value. Loading walks
//! it once, recording the path of every object-role attribute, the set of
//! trace names, and the display-name registry. The loaded document is
//! immutable for the rest of the process lifetime.

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::names::{class_name_aliases, string_to_class_name};

/// A path into the schema document (a chain of mapping keys).
pub type SchemaPath = Vec<String>;

/// Keys that describe an attribute rather than being one, used when the
/// document carries no `defs.metaKeys` list of its own.
const DEFAULT_META_KEYS: &[&str] = &["_isLinkedToArray", "_isSubplotObj", "description", "role"];

const DEFAULT_SCHEMA: &str = include_str!("../assets/plot-schema.json");

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("schema document must be a JSON mapping")]
    NotAMapping,
    #[error("schema document has no `traces` table")]
    MissingTraces,
    #[error("schema document has no `layout.layoutAttributes` table")]
    MissingLayout,
    #[error("`{0}` is not a known graph object")]
    UnknownObject(String),
    #[error("schema store is already initialized")]
    AlreadyInitialized,
}

// ── GraphReference ────────────────────────────────────────────────────────

/// The loaded schema document plus the indexes derived from it.
#[derive(Debug)]
pub struct GraphReference {
    raw: Value,
    meta_keys: Vec<String>,
    trace_names: Vec<String>,
    /// Object name → every schema path where that object is declared.
    /// Pseudo-objects (`figure`, `data`, `layout`) and trace names carry an
    /// empty path list and are resolved by name instead.
    objects: IndexMap<String, Vec<SchemaPath>>,
    /// Display class name → object name, including legacy aliases.
    class_names: IndexMap<String, String>,
}

impl GraphReference {
    /// Validate and index a schema document.
    pub fn from_value(raw: Value) -> Result<Self, SchemaError> {
        let top = raw.as_object().ok_or(SchemaError::NotAMapping)?;

        let traces = top
            .get("traces")
            .and_then(Value::as_object)
            .ok_or(SchemaError::MissingTraces)?;
        let trace_names: Vec<String> = traces.keys().cloned().collect();

        raw.pointer("/layout/layoutAttributes")
            .and_then(Value::as_object)
            .ok_or(SchemaError::MissingLayout)?;

        let meta_keys = match raw.pointer("/defs/metaKeys").and_then(Value::as_array) {
            Some(keys) => keys
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => DEFAULT_META_KEYS.iter().map(|k| k.to_string()).collect(),
        };

        let mut object_paths = Vec::new();
        collect_object_paths(&raw, &mut Vec::new(), &mut object_paths);

        let mut objects: IndexMap<String, Vec<SchemaPath>> = IndexMap::new();
        for path in object_paths {
            let name = match path.last().map(String::as_str) {
                Some("_isLinkedToArray") => item_name(&path[path.len() - 2]),
                Some(last) => last.to_string(),
                None => continue,
            };
            objects.entry(name).or_default().push(path);
        }
        for trace in &trace_names {
            objects.insert(trace.clone(), Vec::new());
        }
        for pseudo in ["figure", "data", "layout"] {
            objects.insert(pseudo.to_string(), Vec::new());
        }

        let mut class_names = IndexMap::new();
        for name in objects.keys() {
            class_names.insert(string_to_class_name(name), name.clone());
        }
        for (class, object) in class_name_aliases() {
            class_names.insert(class.to_string(), object.to_string());
        }

        Ok(Self { raw, meta_keys, trace_names, objects, class_names })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn meta_keys(&self) -> &[String] {
        &self.meta_keys
    }

    pub fn is_meta_key(&self, key: &str) -> bool {
        self.meta_keys.iter().any(|k| k == key)
    }

    /// Trace names in schema order.
    pub fn trace_names(&self) -> &[String] {
        &self.trace_names
    }

    pub fn is_trace(&self, name: &str) -> bool {
        self.trace_names.iter().any(|t| t == name)
    }

    pub fn contains_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub(crate) fn object_paths(&self, name: &str) -> Option<&[SchemaPath]> {
        self.objects.get(name).map(Vec::as_slice)
    }

    /// Resolve a display class name (`ErrorY`, `XAxis`, …) back to the schema
    /// object name it stands for.
    pub fn class_name_to_object_name(&self, class_name: &str) -> Option<&str> {
        self.class_names.get(class_name).map(String::as_str)
    }

    /// The display class name for a schema object name.
    pub fn display_name(&self, object_name: &str) -> String {
        string_to_class_name(object_name)
    }

    pub(crate) fn get_by_path(&self, path: &[String]) -> Option<&Value> {
        let mut node = &self.raw;
        for key in path {
            node = node.as_object()?.get(key)?;
        }
        Some(node)
    }

    /// The object-name chain a schema path passes through, ending with the
    /// object the path denotes. Array containers contribute both the
    /// container and its item type, so the chain lines up with the ancestor
    /// chain a live node records.
    pub(crate) fn occurrence_chain(&self, path: &[String]) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        for (i, seg) in path.iter().enumerate() {
            match seg.as_str() {
                "traces" if i == 0 => {}
                "attributes" | "layoutAttributes" => {}
                "_isLinkedToArray" => {
                    if let Some(container) = chain.last().cloned() {
                        chain.push(item_name(&container));
                    }
                }
                "layout" if i == 0 => chain.push("layout".to_string()),
                _ if i == 1 && path[0] == "traces" => chain.push(seg.clone()),
                _ => {
                    chain.push(seg.clone());
                    let continues = i + 1 < path.len() && path[i + 1] != "_isLinkedToArray";
                    if continues {
                        if let Some(node) = self.get_by_path(&path[..=i]) {
                            if node.get("_isLinkedToArray").is_some() {
                                chain.push(item_name(seg));
                            }
                        }
                    }
                }
            }
        }
        chain
    }
}

/// The item-type name of an array container: the container name with its
/// final character removed (`annotations` → `annotation`).
pub(crate) fn item_name(container: &str) -> String {
    let mut name = container.to_string();
    name.pop();
    name
}

/// Walk every mapping in the document, recording the paths whose node
/// declares `"role": "object"`.
fn collect_object_paths(node: &Value, path: &mut SchemaPath, out: &mut Vec<SchemaPath>) {
    let Some(map) = node.as_object() else { return };
    if map.get("role").and_then(Value::as_str) == Some("object") && !path.is_empty() {
        out.push(path.clone());
    }
    for (key, child) in map {
        path.push(key.clone());
        collect_object_paths(child, path, out);
        path.pop();
    }
}

// ── Process-wide store ────────────────────────────────────────────────────

static STORE: OnceLock<GraphReference> = OnceLock::new();

/// Inject a custom schema document. Must be called before the first use of
/// [`graph_reference`]; afterwards the store is frozen.
pub fn init(raw: Value) -> Result<(), SchemaError> {
    let reference = GraphReference::from_value(raw)?;
    STORE.set(reference).map_err(|_| SchemaError::AlreadyInitialized)
}

/// The process-wide schema store. The first call parses the embedded default
/// document; every later call returns the same reference.
pub fn graph_reference() -> &'static GraphReference {
    STORE.get_or_init(|| {
        let raw: Value = serde_json::from_str(DEFAULT_SCHEMA)
            .expect("embedded plot schema is valid JSON");
        GraphReference::from_value(raw).expect("embedded plot schema has the required shape")
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_document() {
        let reference = graph_reference();
        assert!(reference.is_trace("scatter"));
        assert!(reference.is_trace("bar"));
        assert!(!reference.is_trace("layout"));
    }

    #[test]
    fn pseudo_objects_registered_by_name() {
        let reference = graph_reference();
        for name in ["figure", "data", "layout", "scatter"] {
            assert!(reference.contains_object(name), "missing {name}");
            assert!(reference.object_paths(name).is_some_and(|p| p.is_empty()));
        }
    }

    #[test]
    fn nested_objects_collected_with_paths() {
        let reference = graph_reference();
        let marker = reference.object_paths("marker").expect("marker paths");
        assert!(marker.len() > 1, "marker appears under several traces");
        assert!(marker.iter().any(|p| p.contains(&"scatter".to_string())));
    }

    #[test]
    fn array_items_registered_under_singular_name() {
        let reference = graph_reference();
        let paths = reference.object_paths("annotation").expect("annotation paths");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].last().map(String::as_str), Some("_isLinkedToArray"));
    }

    #[test]
    fn occurrence_chain_spans_array_containers() {
        let reference = graph_reference();
        let path: SchemaPath = ["layout", "layoutAttributes", "annotations", "font"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            reference.occurrence_chain(&path),
            vec!["layout", "annotations", "annotation", "font"]
        );
    }

    #[test]
    fn rejects_documents_without_traces() {
        let raw = serde_json::json!({"layout": {"layoutAttributes": {}}});
        assert_eq!(GraphReference::from_value(raw).unwrap_err(), SchemaError::MissingTraces);
    }
}
