//! graph-objs — schema-validated figure trees.
//!
//! A figure is a nested description of data traces plus layout, validated
//! attribute by attribute against the graph reference (see the
//! `graph-reference` crate) and serialized as plain JSON for an external
//! rendering runtime.
//!
//! The tree is built from two container types: [`ObjNode`] (an ordered,
//! validated mapping) and [`ArrNode`] (an ordered sequence of typed items).
//! Every mutation validates synchronously: either the write succeeds and
//! the tree remains schema-valid JSON, or it fails and the tree is
//! unchanged. [`Figure`] is the root facade composing the trace sequence
//! and the layout.
//!
//! ```
//! use graph_objs::Figure;
//! use serde_json::json;
//!
//! let mut figure = Figure::new();
//! figure.add_trace(json!({"x": [1, 2, 3], "y": [3, 1, 2]})).unwrap();
//! figure.layout_mut().unwrap().set("title", json!("hello")).unwrap();
//! assert_eq!(figure.get_data(false), json!([{"x": [1, 2, 3], "y": [3, 1, 2]}]));
//! ```

pub mod error;
pub mod figure;
pub mod node;
pub mod path;

pub use error::{GraphError, Shape};
pub use figure::Figure;
pub use node::factory::create;
pub use node::{ArrNode, GraphNode, GraphValue, ObjNode};
pub use path::{Path, PathStep};
