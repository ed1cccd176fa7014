//! The derived, per-object view of the schema document.
//!
//! An [`ObjectInfo`] answers, for one `(object name, position)` pair: is it
//! an array container or a keyed object, what is its parent, and either its
//! attribute descriptors or its permitted item types. Infos are computed on
//! demand; nothing is cached between calls.

use indexmap::IndexMap;
use serde_json::Value;

use crate::document::{item_name, GraphReference, SchemaError, SchemaPath};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: String,
    /// Immediate parent object name; empty for the figure root.
    pub parent: String,
    pub is_array: bool,
    pub description: String,
    /// Attribute name → descriptor, for keyed objects.
    pub attributes: Option<IndexMap<String, Value>>,
    /// Permitted item-type names, for array containers.
    pub items: Option<Vec<String>>,
}

impl GraphReference {
    /// Object info for an exact path into the schema document. Used when the
    /// caller knows its schema coordinates precisely.
    pub fn object_info_by_path(&self, path: &[String]) -> Result<ObjectInfo, SchemaError> {
        let last = path
            .last()
            .ok_or_else(|| SchemaError::UnknownObject(String::new()))?;

        if last == "_isLinkedToArray" {
            let container_path = &path[..path.len() - 1];
            let container = self
                .get_by_path(container_path)
                .ok_or_else(|| SchemaError::UnknownObject(path.join(".")))?;
            let parent = path[path.len() - 2].clone();
            return Ok(ObjectInfo {
                name: item_name(&parent),
                description: description_of(container),
                attributes: Some(self.non_meta_attributes(container)),
                items: None,
                is_array: false,
                parent,
            });
        }

        let node = self
            .get_by_path(path)
            .ok_or_else(|| SchemaError::UnknownObject(path.join(".")))?;
        let name = last.clone();
        let parent = match path.get(path.len().wrapping_sub(2)).map(String::as_str) {
            Some("attributes") => path[path.len() - 3].clone(),
            Some("layoutAttributes") => "layout".to_string(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        if node.get("_isLinkedToArray").is_some() {
            Ok(ObjectInfo {
                items: Some(vec![item_name(&name)]),
                attributes: None,
                is_array: true,
                description: String::new(),
                name,
                parent,
            })
        } else {
            Ok(ObjectInfo {
                description: description_of(node),
                attributes: Some(self.non_meta_attributes(node)),
                items: None,
                is_array: false,
                name,
                parent,
            })
        }
    }

    /// Object info for a bare name. Only the root pseudo-objects and trace
    /// types resolve this way; everything else is located by path.
    pub fn object_info_by_name(&self, name: &str) -> Result<ObjectInfo, SchemaError> {
        if self.is_trace(name) {
            return self.trace_info(name);
        }
        match name {
            "data" => Ok(ObjectInfo {
                name: "data".to_string(),
                parent: "figure".to_string(),
                is_array: true,
                description: "Array container for trace objects.".to_string(),
                attributes: None,
                items: Some(self.trace_names().to_vec()),
            }),
            "layout" => self.layout_info(),
            "figure" => {
                let mut attributes = IndexMap::new();
                attributes.insert("data".to_string(), serde_json::json!({"role": "object"}));
                attributes.insert("layout".to_string(), serde_json::json!({"role": "object"}));
                Ok(ObjectInfo {
                    name: "figure".to_string(),
                    parent: String::new(),
                    is_array: false,
                    description: "Top level of a figure object.".to_string(),
                    attributes: Some(attributes),
                    items: None,
                })
            }
            other => Err(SchemaError::UnknownObject(other.to_string())),
        }
    }

    fn trace_info(&self, name: &str) -> Result<ObjectInfo, SchemaError> {
        let path: SchemaPath = vec!["traces".to_string(), name.to_string(), "attributes".to_string()];
        let attrs = self
            .get_by_path(&path)
            .ok_or_else(|| SchemaError::UnknownObject(name.to_string()))?;
        let mut attributes = self.non_meta_attributes(attrs);
        // every trace carries its own type discriminator
        attributes.insert("type".to_string(), serde_json::json!({"role": "info"}));
        Ok(ObjectInfo {
            name: name.to_string(),
            parent: "data".to_string(),
            is_array: false,
            description: format!("A {name} trace"),
            attributes: Some(attributes),
            items: None,
        })
    }

    /// Layout merges its own attribute table with every trace's layout-level
    /// contributions (traces can inject layout options, e.g. bar gap
    /// settings). Trace contributions come first, in schema order; layout's
    /// own table is applied last.
    fn layout_info(&self) -> Result<ObjectInfo, SchemaError> {
        let mut attributes = IndexMap::new();
        for trace in self.trace_names() {
            let path: SchemaPath = vec![
                "traces".to_string(),
                trace.clone(),
                "layoutAttributes".to_string(),
            ];
            if let Some(contributed) = self.get_by_path(&path) {
                attributes.extend(self.non_meta_attributes(contributed));
            }
        }
        let own: SchemaPath = vec!["layout".to_string(), "layoutAttributes".to_string()];
        let own = self
            .get_by_path(&own)
            .ok_or(SchemaError::MissingLayout)?;
        attributes.extend(self.non_meta_attributes(own));
        Ok(ObjectInfo {
            name: "layout".to_string(),
            parent: "figure".to_string(),
            is_array: false,
            description: "Plot layout object container.".to_string(),
            attributes: Some(attributes),
            items: None,
        })
    }

    /// Every object info for `name` compatible with the caller's ancestor
    /// chain. Occurrences are ranked by how long a suffix of the chain they
    /// share; the best-matching ones win. The same attribute name can mean
    /// different things under different parents, so callers must pass the
    /// chain they actually sit under (an empty chain selects every
    /// occurrence).
    pub fn object_infos(
        &self,
        name: &str,
        ancestors: &[String],
    ) -> Result<Vec<ObjectInfo>, SchemaError> {
        let paths = self
            .object_paths(name)
            .ok_or_else(|| SchemaError::UnknownObject(name.to_string()))?;
        if paths.is_empty() {
            return Ok(vec![self.object_info_by_name(name)?]);
        }

        let mut target: Vec<String> = ancestors.to_vec();
        target.push(name.to_string());
        let scored: Vec<(usize, &SchemaPath)> = paths
            .iter()
            .map(|p| (suffix_overlap(&self.occurrence_chain(p), &target), p))
            .collect();
        let best = scored.iter().map(|(s, _)| *s).max().unwrap_or(0);
        scored
            .into_iter()
            .filter(|(s, _)| *s == best)
            .map(|(_, p)| self.object_info_by_path(p))
            .collect()
    }

    fn non_meta_attributes(&self, node: &Value) -> IndexMap<String, Value> {
        match node.as_object() {
            Some(map) => map
                .iter()
                .filter(|(k, _)| !self.is_meta_key(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => IndexMap::new(),
        }
    }
}

fn description_of(node: &Value) -> String {
    node.get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Length of the longest common suffix of two chains.
fn suffix_overlap(a: &[String], b: &[String]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}
