//! Error taxonomy for figure-tree construction and mutation.
//!
//! Every error surfaces synchronously at the write or construction call
//! that triggered it, and carries the dotted path of the offending location
//! recorded at the point the node was being built.

use thiserror::Error;

pub use graph_reference::SchemaError;

use crate::path::Path;

/// The container kind a value was required to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Mapping,
    Sequence,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Mapping => write!(f, "mapping"),
            Shape::Sequence => write!(f, "sequence"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    /// Raw input at `path` does not have the container shape the schema
    /// requires there.
    #[error("invalid value at `{path}`: expected a {expected}")]
    Structural { expected: Shape, path: Path },

    /// The key is not declared valid for the object's schema context.
    #[error("`{key}` is not an attribute of `{object}` (at `{path}`)")]
    UnknownAttribute { object: String, key: String, path: Path },

    /// An array element's `type` discriminator matches none of the
    /// permitted item types.
    #[error("entry {index} at `{path}`: `{tag}` is not one of the permitted types {permitted:?}")]
    InvalidTypeTag { index: usize, tag: String, permitted: Vec<String>, path: Path },

    /// A `…src` key's value could not be resolved to a non-empty column id.
    #[error("src key `{key}` could not be resolved: {reason}")]
    SrcResolution { key: String, reason: String },

    /// A value's shape does not match the container kind its role requires.
    #[error("`{key}` at `{path}` must be given as a {expected}")]
    ValueType { key: String, expected: Shape, path: Path },

    /// A sequence index outside the container.
    #[error("index {index} is out of bounds for `{path}` (len {len})")]
    OutOfBounds { index: usize, len: usize, path: Path },

    /// A failure reported by the schema layer (e.g. an unknown object name).
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl GraphError {
    /// The tree location the error refers to, when one was recorded.
    pub fn path(&self) -> Option<&Path> {
        match self {
            GraphError::Structural { path, .. }
            | GraphError::UnknownAttribute { path, .. }
            | GraphError::InvalidTypeTag { path, .. }
            | GraphError::ValueType { path, .. }
            | GraphError::OutOfBounds { path, .. } => Some(path),
            GraphError::SrcResolution { .. } | GraphError::Schema(_) => None,
        }
    }
}
