//! Data extraction and cleanup passes over a tree.
//!
//! `strip_style` removes cosmetic keys, `get_data` collects the
//! plot-determining subset, and `force_clean` prunes nulls and empty
//! containers bottom-up before a tree is handed to a renderer.

use serde_json::{Map, Value};

use graph_reference::Role;

use crate::node::{reference, ArrNode, GraphValue, ObjNode};

impl ObjNode {
    /// Recursively remove every key whose resolved role is `style`.
    ///
    /// Containers always survive, possibly left empty. The layout's
    /// `autosize` key is removed regardless of its declared role.
    pub fn strip_style(&mut self) {
        let keys: Vec<String> = self.keys().map(str::to_string).collect();
        for key in keys {
            let mut remove = match self.entries.get_mut(&key) {
                Some(GraphValue::Obj(node)) => {
                    node.strip_style();
                    false
                }
                Some(GraphValue::Arr(node)) => {
                    node.strip_style();
                    false
                }
                Some(GraphValue::Scalar(value)) => {
                    reference().resolve_role(&self.name, &self.ancestors, &key, Some(value))
                        == Some(Role::Style)
                }
                None => false,
            };
            if self.name == "layout" && key == "autosize" {
                remove = true;
            }
            if remove {
                self.entries.shift_remove(&key);
            }
        }
    }

    /// The plot-determining subset of this node as plain JSON.
    ///
    /// Keeps role-`data` scalars (arrays included), recurses into child
    /// nodes, and drops nested containers that end up empty. Traces also
    /// keep their `name` key. With `flatten`, nested keys are dot-joined
    /// into a single-level mapping.
    pub fn get_data(&self, flatten: bool) -> Value {
        let mut out = Map::new();
        for (key, value) in self.iter() {
            match value {
                GraphValue::Obj(node) => merge_child(&mut out, key, node.get_data(flatten), flatten),
                GraphValue::Arr(node) => merge_child(&mut out, key, node.get_data(flatten), flatten),
                GraphValue::Scalar(scalar) => {
                    let role =
                        reference().resolve_role(self.name(), self.get_parents(), key, Some(scalar));
                    let keep = role == Some(Role::Data)
                        || (key == "name" && reference().is_trace(self.name()));
                    if keep {
                        out.insert(key.to_string(), scalar.clone());
                    }
                }
            }
        }
        drop_empty(&mut out);
        Value::Object(out)
    }

    /// Best-effort cleanup before transmission: recursively delete keys
    /// whose value is null and keys holding an empty container. Never
    /// errors; malformed leaves are simply dropped.
    pub fn force_clean(&mut self) {
        let keys: Vec<String> = self.keys().map(str::to_string).collect();
        for key in keys {
            match self.get_mut(&key) {
                Some(GraphValue::Obj(node)) => node.force_clean(),
                Some(GraphValue::Arr(node)) => node.force_clean(),
                _ => {}
            }
            let remove = match self.get(&key) {
                Some(GraphValue::Scalar(Value::Null)) => true,
                Some(GraphValue::Scalar(Value::Array(items))) => items.is_empty(),
                Some(GraphValue::Scalar(Value::Object(map))) => map.is_empty(),
                Some(GraphValue::Obj(node)) => node.is_empty(),
                Some(GraphValue::Arr(node)) => node.is_empty(),
                _ => false,
            };
            if remove {
                self.remove(&key);
            }
        }
    }
}

impl ArrNode {
    /// See [`ObjNode::strip_style`].
    pub fn strip_style(&mut self) {
        for item in self.iter_mut() {
            item.strip_style();
        }
    }

    /// See [`ObjNode::get_data`]. Without `flatten` the result is a
    /// sequence with emptied items removed. With `flatten`, the trace
    /// container assigns each trace a readable, de-duplicated name
    /// (`trace_<i>` by default) used as the key prefix; other containers
    /// prefix with the numeric index.
    pub fn get_data(&self, flatten: bool) -> Value {
        if !flatten {
            let items: Vec<Value> = self
                .iter()
                .map(|item| item.get_data(false))
                .filter(|v| v.as_object().is_some_and(|m| !m.is_empty()))
                .collect();
            return Value::Array(items);
        }

        let mut out = Map::new();
        if self.name() == "data" {
            let mut taken: Vec<String> = Vec::new();
            for (index, item) in self.iter().enumerate() {
                let Value::Object(mut map) = item.get_data(true) else { continue };
                let base = match map.shift_remove("name") {
                    Some(Value::String(name)) if !name.is_empty() => name,
                    _ => format!("trace_{index}"),
                };
                let unique = dedup_name(&taken, base);
                for (key, value) in map {
                    out.insert(format!("{unique}.{key}"), value);
                }
                taken.push(unique);
            }
        } else {
            for (index, item) in self.iter().enumerate() {
                let Value::Object(map) = item.get_data(true) else { continue };
                for (key, value) in map {
                    out.insert(format!("{index}.{key}"), value);
                }
            }
        }
        Value::Object(out)
    }

    /// See [`ObjNode::force_clean`]. Items that end up empty are removed
    /// from the sequence.
    pub fn force_clean(&mut self) {
        for item in self.iter_mut() {
            item.force_clean();
        }
        let before = self.len();
        self.items.retain(|item| !item.is_empty());
        if self.len() != before {
            // surviving items may have shifted index
            self.rebind_tail(0);
        }
    }
}

fn merge_child(out: &mut Map<String, Value>, key: &str, sub: Value, flatten: bool) {
    if flatten {
        if let Value::Object(map) = sub {
            for (sub_key, sub_value) in map {
                out.insert(format!("{key}.{sub_key}"), sub_value);
            }
        }
    } else {
        out.insert(key.to_string(), sub);
    }
}

fn drop_empty(out: &mut Map<String, Value>) {
    out.retain(|_, value| match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    });
}

/// `base`, or `base_1`, `base_2`, … if `base` is already taken.
fn dedup_name(taken: &[String], base: String) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{base}_{suffix}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
