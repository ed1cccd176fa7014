//! Schema-name ↔ display-name conversion.
//!
//! Schema object names are lowercase with optional underscores (`error_y`);
//! display names are the CamelCase form (`ErrorY`). The forward mapping is
//! deterministic; the inverse goes through the registry built at load time,
//! which also carries the legacy alias table.

/// Legacy display names kept for compatibility with older figure code.
const CLASS_NAME_ALIASES: &[(&str, &str)] = &[
    ("AngularAxis", "angularaxis"),
    ("ColorBar", "colorbar"),
    ("Area", "scatter"),
    ("Font", "textfont"),
    ("Histogram2dContour", "histogram2dcontour"),
    ("RadialAxis", "radialaxis"),
    ("XAxis", "xaxis"),
    ("XBins", "xbins"),
    ("YAxis", "yaxis"),
    ("YBins", "ybins"),
    ("ZAxis", "zaxis"),
];

/// The (display name, object name) alias pairs.
pub fn class_name_aliases() -> impl Iterator<Item = (&'static str, &'static str)> {
    CLASS_NAME_ALIASES.iter().copied()
}

/// Turn a schema object name into its display class name.
///
/// The first letter of every underscore-separated segment is uppercased and
/// the underscores are dropped: `error_y` → `ErrorY`, `scatter3d` →
/// `Scatter3d`.
pub fn string_to_class_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if upper_next && ch.is_ascii_alphabetic() {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
