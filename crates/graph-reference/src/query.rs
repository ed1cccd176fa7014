//! Pure queries over the loaded schema: attribute validity, roles, and array
//! detection. Tree nodes call these on every validated write.

use indexmap::IndexSet;
use serde_json::Value;

use crate::document::{GraphReference, SchemaError};

// ── Role ──────────────────────────────────────────────────────────────────

/// Classification of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Plot-determining values.
    Data,
    /// Cosmetic settings.
    Style,
    /// Metadata.
    Info,
    /// A nested container.
    Object,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Data => "data",
            Role::Style => "style",
            Role::Info => "info",
            Role::Object => "object",
        }
    }

    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "data" => Some(Role::Data),
            "style" => Some(Role::Style),
            "info" => Some(Role::Info),
            "object" => Some(Role::Object),
            _ => None,
        }
    }
}

impl GraphReference {
    // ── Attribute validity ────────────────────────────────────────────────

    /// The union of valid attribute names for `name` under `ancestors`.
    pub fn valid_attributes(
        &self,
        name: &str,
        ancestors: &[String],
    ) -> Result<IndexSet<String>, SchemaError> {
        let mut out = IndexSet::new();
        for info in self.object_infos(name, ancestors)? {
            if let Some(attributes) = info.attributes {
                out.extend(attributes.into_keys());
            }
        }
        Ok(out)
    }

    /// True iff some schema occurrence of `attribute` sits under
    /// `parent_name` and is array-typed. Every occurrence is checked: the
    /// same attribute name can appear under several parents with different
    /// shapes.
    pub fn attribute_is_array(&self, attribute: &str, parent_name: &str) -> bool {
        let Some(paths) = self.object_paths(attribute) else { return false };
        if paths.is_empty() {
            return self
                .object_info_by_name(attribute)
                .map(|info| info.is_array && info.parent == parent_name)
                .unwrap_or(false);
        }
        paths.iter().any(|path| {
            self.object_info_by_path(path)
                .map(|info| info.is_array && info.parent == parent_name)
                .unwrap_or(false)
        })
    }

    /// Whether `name` denotes an array container in the given context, and if
    /// so which item types it permits.
    pub fn array_items(
        &self,
        name: &str,
        ancestors: &[String],
    ) -> Result<Option<Vec<String>>, SchemaError> {
        for info in self.object_infos(name, ancestors)? {
            if info.is_array {
                return Ok(info.items);
            }
        }
        Ok(None)
    }

    // ── Role resolution ───────────────────────────────────────────────────

    /// Resolve the role of `key` on an object named `name` under `ancestors`.
    ///
    /// Scans every matching schema occurrence; the first occurrence that
    /// reports `data` is final. When `value` is supplied and the descriptor
    /// is marked `arrayOk`, a sequence value is upgraded to `data` no matter
    /// what the declared role says: arrays of values are always plot data.
    pub fn resolve_role(
        &self,
        name: &str,
        ancestors: &[String],
        key: &str,
        value: Option<&Value>,
    ) -> Option<Role> {
        let infos = self.object_infos(name, ancestors).ok()?;
        let mut found = None;
        for info in infos {
            let Some(attributes) = info.attributes else { continue };
            let Some(descriptor) = attributes.get(key) else { continue };
            let declared = descriptor
                .get("role")
                .and_then(Value::as_str)
                .and_then(Role::from_str);
            let array_ok = descriptor.get("arrayOk").and_then(Value::as_bool) == Some(true);
            if array_ok && matches!(value, Some(Value::Array(_))) {
                return Some(Role::Data);
            }
            match declared {
                Some(Role::Data) => return Some(Role::Data),
                Some(role) if found.is_none() => found = Some(role),
                _ => {}
            }
        }
        found
    }

    // ── Help listing ──────────────────────────────────────────────────────

    /// A printable listing of what `name` accepts in the given context:
    /// item types for array containers, attribute names otherwise.
    pub fn describe(&self, name: &str, ancestors: &[String]) -> Result<String, SchemaError> {
        let infos = self.object_infos(name, ancestors)?;
        if let Some(array) = infos.iter().find(|i| i.is_array) {
            let items = array.items.clone().unwrap_or_default();
            return Ok(format!("Valid item types for '{name}': {}", items.join(", ")));
        }
        let mut attrs: Vec<String> = Vec::new();
        for info in infos {
            if let Some(attributes) = info.attributes {
                attrs.extend(attributes.into_keys());
            }
        }
        attrs.sort();
        attrs.dedup();
        Ok(format!("Valid attributes for '{name}': {}", attrs.join(", ")))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
