//! graph-reference — the machine-readable figure schema and its query layer.
//!
//! A figure description is validated against a single schema document (the
//! "graph reference"): a nested mapping that declares every object type, its
//! attributes, their roles (`data`, `style`, `info`, `object`), and which
//! attributes are array containers of a named item type.
//!
//! This crate loads that document into a process-wide, read-only store and
//! answers the questions every tree node needs at write time:
//!
//! - what are the valid attributes of object X under ancestor chain P?
//! - is attribute A an array-typed sub-object under parent X?
//! - what is the role of attribute A on object X, given the value assigned?
//!
//! All queries are pure: repeated calls are idempotent and side-effect free.

pub mod document;
pub mod names;
pub mod object_info;
pub mod query;

pub use document::{graph_reference, init, GraphReference, SchemaError, SchemaPath};
pub use names::{class_name_aliases, string_to_class_name};
pub use object_info::ObjectInfo;
pub use query::Role;
