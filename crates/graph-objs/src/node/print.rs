//! Constructor-style pretty printing.
//!
//! Renders a tree the way it would be written in code: display class names
//! with keyword arguments, one per line. Key order is deterministic: the
//! short coordinate names `r`, `t`, `x`, `y`, `z` come first, the rest
//! alphabetically. Long scalar values are curtailed with `..` to keep lines
//! within a character budget.

use serde_json::Value;

use crate::node::{reference, ArrNode, GraphValue, ObjNode};

const INDENT: usize = 4;
const MAX_CHARS: usize = 80;

/// Coordinate-style keys that sort before everything else.
fn is_special_key(key: &str) -> bool {
    matches!(key, "r" | "t" | "x" | "y" | "z")
}

fn sort_key(key: &str) -> (bool, String) {
    (!is_special_key(key), key.to_string())
}

/// Shorten a rendered value to at most `budget` characters, marking the cut
/// with `..`.
fn curtail(repr: &str, budget: usize) -> String {
    if repr.chars().count() <= budget {
        return repr.to_string();
    }
    if budget <= 2 {
        return "..".to_string();
    }
    let kept: String = repr.chars().take(budget - 2).collect();
    format!("{kept}..")
}

fn render_scalar(value: &Value, budget: usize, pretty: bool) -> String {
    let repr = serde_json::to_string(value).unwrap_or_default();
    if pretty {
        curtail(&repr, budget)
    } else {
        repr
    }
}

impl ObjNode {
    /// Render as a constructor call, e.g.
    /// `Scatter(\n    x=[1, 2],\n    marker=Marker(...)\n)`.
    pub fn to_string_pretty(&self) -> String {
        self.render(0, true)
    }

    pub(crate) fn render(&self, level: usize, pretty: bool) -> String {
        let class = reference().display_name(self.name());
        let mut keys: Vec<&str> = self.keys().collect();
        if reference().is_trace(self.name()) {
            keys.retain(|key| *key != "type");
        }
        if keys.is_empty() {
            return format!("{class}()");
        }
        keys.sort_by_key(|key| sort_key(key));

        let pad = " ".repeat(INDENT * (level + 1));
        let close_pad = " ".repeat(INDENT * level);
        let mut out = format!("{class}(");
        let count = keys.len();
        for (i, key) in keys.iter().enumerate() {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(key);
            out.push('=');
            match self.get(key) {
                Some(GraphValue::Obj(node)) => out.push_str(&node.render(level + 1, pretty)),
                Some(GraphValue::Arr(node)) => out.push_str(&node.render(level + 1, pretty)),
                Some(GraphValue::Scalar(value)) => {
                    let used = pad.len() + key.len() + 1;
                    let budget = MAX_CHARS.saturating_sub(used);
                    out.push_str(&render_scalar(value, budget, pretty));
                }
                None => {}
            }
            if i + 1 < count {
                out.push(',');
            }
        }
        out.push('\n');
        out.push_str(&close_pad);
        out.push(')');
        out
    }
}

impl ArrNode {
    /// Render as a constructor call around the item list, e.g.
    /// `Data([\n    Scatter(...)\n])`.
    pub fn to_string_pretty(&self) -> String {
        self.render(0, true)
    }

    pub(crate) fn render(&self, level: usize, pretty: bool) -> String {
        let class = reference().display_name(self.name());
        if self.is_empty() {
            return format!("{class}()");
        }
        let pad = " ".repeat(INDENT * (level + 1));
        let close_pad = " ".repeat(INDENT * level);
        let mut out = format!("{class}([");
        let count = self.len();
        for (i, item) in self.iter().enumerate() {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(&item.render(level + 1, pretty));
            if i + 1 < count {
                out.push(',');
            }
        }
        out.push('\n');
        out.push_str(&close_pad);
        out.push_str("])");
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
