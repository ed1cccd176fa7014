//! Deep update of existing trees from raw values.
//!
//! Keyed nodes merge recursively: a key whose current value is itself a
//! node is updated in place rather than replaced, so callers can patch
//! large nested structures with sparse mappings. Indexed nodes apply a list
//! of updates positionally, cycling when the list is shorter than the
//! target sequence.

use serde_json::Value;

use crate::error::{GraphError, Shape};
use crate::node::{ArrNode, GraphValue, ObjNode};

enum Plan {
    MergeObj,
    MergeArr,
    Set,
}

impl ObjNode {
    /// Merge a raw mapping into this node. Scalar keys overwrite through
    /// the validated write; node-valued keys recurse.
    pub fn update(&mut self, changes: &Value) -> Result<(), GraphError> {
        let Some(map) = changes.as_object() else {
            return Err(GraphError::Structural {
                expected: Shape::Mapping,
                path: self.get_path().clone(),
            });
        };
        for (key, value) in map {
            let plan = match self.get(key) {
                Some(GraphValue::Obj(_)) if value.is_object() => Plan::MergeObj,
                Some(GraphValue::Arr(_)) if value.is_object() || value.is_array() => Plan::MergeArr,
                _ => Plan::Set,
            };
            match plan {
                Plan::MergeObj => {
                    if let Some(GraphValue::Obj(node)) = self.get_mut(key) {
                        node.update(value)?;
                    }
                }
                Plan::MergeArr => {
                    if let Some(GraphValue::Arr(node)) = self.get_mut(key) {
                        node.update(value)?;
                    }
                }
                Plan::Set => self.set(key, value.clone())?,
            }
        }
        Ok(())
    }
}

impl ArrNode {
    /// Apply updates positionally. `changes` is either a single mapping,
    /// broadcast to every item, or a sequence of mappings where item `i`
    /// receives element `i mod len(changes)`. An empty update sequence is a
    /// no-op.
    ///
    /// Every applied element is an independent deep copy of the update
    /// payload, so broadcasting one mapping across many items never makes
    /// them share nested structure.
    pub fn update(&mut self, changes: &Value) -> Result<(), GraphError> {
        let list: Vec<&Value> = match changes {
            Value::Object(_) => vec![changes],
            Value::Array(elements) => elements.iter().collect(),
            _ => {
                return Err(GraphError::Structural {
                    expected: Shape::Mapping,
                    path: self.get_path().clone(),
                })
            }
        };
        if list.is_empty() {
            return Ok(());
        }
        for index in 0..self.len() {
            let change = list[index % list.len()];
            if let Some(item) = self.get_mut(index) {
                item.update(change)?;
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::factory;
    use serde_json::json;

    fn layout_with(value: Value) -> ObjNode {
        match factory::create("layout", value, true).unwrap() {
            crate::node::GraphNode::Obj(node) => node,
            other => panic!("expected a keyed node, got {other:?}"),
        }
    }

    #[test]
    fn nested_nodes_merge_instead_of_being_replaced() {
        let mut layout = layout_with(json!({
            "title": "old",
            "xaxis": {"range": [0, 1], "domain": [0, 1]}
        }));
        layout
            .update(&json!({"title": "new", "xaxis": {"domain": [0, 0.8]}}))
            .unwrap();
        let value = layout.to_value();
        assert_eq!(value["title"], json!("new"));
        assert_eq!(value["xaxis"]["domain"], json!([0, 0.8]));
        assert_eq!(value["xaxis"]["range"], json!([0, 1]), "untouched keys survive");
    }

    #[test]
    fn updates_create_missing_keys() {
        let mut layout = layout_with(json!({}));
        layout.update(&json!({"legend": {"bgcolor": "white"}})).unwrap();
        assert!(layout.get("legend").and_then(GraphValue::as_obj).is_some());
    }

    #[test]
    fn updates_still_validate() {
        let mut layout = layout_with(json!({}));
        let err = layout.update(&json!({"bogus": 1})).unwrap_err();
        assert!(matches!(err, GraphError::UnknownAttribute { .. }));
    }

    #[test]
    fn short_update_lists_cycle_over_the_items() {
        let mut data = factory::create(
            "data",
            json!([
                {"x": [0]}, {"x": [1]}, {"x": [2]}, {"x": [3]}
            ]),
            true,
        )
        .unwrap();
        let crate::node::GraphNode::Arr(ref mut data) = data else { panic!("expected array") };
        data.update(&json!([{"name": "even"}, {"name": "odd"}])).unwrap();
        let names: Vec<Value> = (0..4).map(|i| data.get(i).unwrap().to_value()["name"].clone()).collect();
        assert_eq!(names, vec![json!("even"), json!("odd"), json!("even"), json!("odd")]);
    }

    #[test]
    fn a_single_mapping_broadcasts_to_every_item() {
        let mut data = match factory::create("data", json!([{"x": [0]}, {"x": [1]}]), true).unwrap()
        {
            crate::node::GraphNode::Arr(node) => node,
            other => panic!("expected array, got {other:?}"),
        };
        data.update(&json!({"marker": {"color": "blue"}})).unwrap();
        for i in 0..2 {
            assert_eq!(data.get(i).unwrap().to_value()["marker"]["color"], json!("blue"));
        }
    }

    #[test]
    fn empty_update_lists_are_a_no_op() {
        let mut data = match factory::create("data", json!([{"x": [0]}]), true).unwrap() {
            crate::node::GraphNode::Arr(node) => node,
            other => panic!("expected array, got {other:?}"),
        };
        data.update(&json!([])).unwrap();
        assert_eq!(data.len(), 1);
    }
}
