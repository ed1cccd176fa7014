//! End-to-end workflows over whole figures: construction from raw JSON,
//! validated mutation, data extraction, and cleanup.

use graph_objs::{create, Figure, GraphError, GraphNode, GraphValue};
use graph_reference::{graph_reference, string_to_class_name, Role};
use serde_json::{json, Value};

fn figure_fixture() -> Value {
    json!({
        "data": [
            {
                "x": [1, 2, 3],
                "y": [4, 5, 6],
                "name": "first",
                "mode": "lines",
                "opacity": 0.6,
                "marker": {"color": "red", "size": 9},
                "error_y": {"array": [0.1, 0.2, 0.3], "color": "gray"}
            },
            {"x": ["a", "b"], "y": [7, 8], "type": "bar", "opacity": 0.4}
        ],
        "layout": {
            "title": "fixture",
            "width": 800,
            "showlegend": true,
            "paper_bgcolor": "white",
            "xaxis": {"range": [0, 10], "showgrid": false}
        }
    })
}

// ── Round-trip: the data subset survives, everything else is stripped ─────

#[test]
fn round_trip_reproduces_the_data_subset() {
    let figure = Figure::from_value(figure_fixture()).unwrap();
    let data = figure.get_data(false);
    assert_eq!(
        data,
        json!([
            {
                "x": [1, 2, 3],
                "y": [4, 5, 6],
                "name": "first",
                "error_y": {"array": [0.1, 0.2, 0.3]}
            },
            {"x": ["a", "b"], "y": [7, 8]}
        ])
    );
}

#[test]
fn serialization_preserves_the_full_tree() {
    let figure = Figure::from_value(figure_fixture()).unwrap();
    let value = figure.to_value();
    assert_eq!(value["layout"]["xaxis"]["range"], json!([0, 10]));
    assert_eq!(value["data"][0]["marker"]["size"], json!(9));
    assert_eq!(value["data"][1]["type"], json!("bar"));
}

// ── strip_style ───────────────────────────────────────────────────────────

#[test]
fn strip_style_removes_cosmetics_and_is_idempotent() {
    let mut figure = Figure::from_value(figure_fixture()).unwrap();
    figure.strip_style();
    let once = figure.to_value();

    assert!(once["data"][0].get("opacity").is_none());
    assert!(once["data"][0]["marker"].get("color").is_none());
    assert!(once["layout"].get("paper_bgcolor").is_none());
    assert_eq!(once["layout"]["title"], json!("fixture"), "info keys survive");
    assert_eq!(once["layout"]["xaxis"]["range"], json!([0, 10]));

    figure.strip_style();
    assert_eq!(figure.to_value(), once);
}

#[test]
fn array_ok_values_strip_as_style_but_survive_as_data() {
    let mut scalar = Figure::from_value(json!({
        "data": [{"x": [1], "marker": {"size": 5}}]
    }))
    .unwrap();
    scalar.strip_style();
    assert!(scalar.to_value()["data"][0]["marker"].get("size").is_none());

    let mut sized = Figure::from_value(json!({
        "data": [{"x": [1], "marker": {"size": [5, 10, 15]}}]
    }))
    .unwrap();
    sized.strip_style();
    assert_eq!(sized.to_value()["data"][0]["marker"]["size"], json!([5, 10, 15]));
}

// ── Validated writes ──────────────────────────────────────────────────────

#[test]
fn undeclared_keys_fail_strict_and_noop_lenient() {
    let node = create("scatter", json!({"x": [1]}), true).unwrap();
    let GraphNode::Obj(mut trace) = node else { panic!("expected keyed node") };

    let err = trace.set("bogus_key", json!(1)).unwrap_err();
    assert!(matches!(err, GraphError::UnknownAttribute { ref key, .. } if key == "bogus_key"));
    assert_eq!(trace.to_value(), json!({"type": "scatter", "x": [1]}));

    trace.set_lenient("bogus_key", json!(1));
    assert_eq!(trace.to_value(), json!({"type": "scatter", "x": [1]}));
}

#[test]
fn layout_accepts_trace_contributed_attributes() {
    let mut figure = Figure::new();
    let layout = figure.layout_mut().unwrap();
    layout.set("barmode", json!("stack")).unwrap();
    layout.set("bargap", json!(0.1)).unwrap();
    assert_eq!(layout.to_value(), json!({"barmode": "stack", "bargap": 0.1}));
}

// ── Subplot inference ─────────────────────────────────────────────────────

#[test]
fn numbered_subplot_keys_use_the_root_schema() {
    let mut figure = Figure::new();
    let layout = figure.layout_mut().unwrap();
    layout
        .set("yaxis3", json!({"range": [0, 1], "showgrid": false}))
        .unwrap();
    layout.set("scene2", json!({"bgcolor": "black"})).unwrap();

    let axis = layout.get("yaxis3").and_then(GraphValue::as_obj).unwrap();
    assert_eq!(axis.name(), "yaxis");
    let scene = layout.get("scene2").and_then(GraphValue::as_obj).unwrap();
    assert_eq!(scene.name(), "scene");

    // leading zeros are not subplot suffixes
    let err = layout.set("yaxis01", json!({})).unwrap_err();
    assert!(matches!(err, GraphError::UnknownAttribute { .. }));
    // and numbered keys still validate against the root's attributes
    let err = layout.set("yaxis4", json!({"bogus": 1})).unwrap_err();
    assert!(matches!(err, GraphError::UnknownAttribute { ref object, .. } if object == "yaxis"));
}

// ── Trace-type dispatch ───────────────────────────────────────────────────

#[test]
fn trace_entries_dispatch_on_their_type_tag() {
    let data = create(
        "data",
        json!([
            {"x": [1, 2], "y": [3, 4], "type": "bar"},
            {"x": [1], "y": [2]},
            {"z": [[1, 2], [3, 4]], "type": "heatmap"}
        ]),
        true,
    )
    .unwrap();
    let GraphNode::Arr(data) = data else { panic!("expected array") };
    assert_eq!(data.get(0).unwrap().name(), "bar");
    assert_eq!(data.get(1).unwrap().name(), "scatter");
    assert_eq!(data.get(2).unwrap().name(), "heatmap");

    let err = create("data", json!([{"type": "not_a_real_type"}]), true).unwrap_err();
    assert!(matches!(err, GraphError::InvalidTypeTag { index: 0, .. }));
}

// ── Deep update ───────────────────────────────────────────────────────────

#[test]
fn update_lists_cycle_over_longer_targets() {
    let mut figure = Figure::from_value(json!({
        "data": [{"x": [0]}, {"x": [1]}, {"x": [2]}, {"x": [3]}]
    }))
    .unwrap();
    figure
        .data_mut()
        .update(&json!([{"name": "even"}, {"name": "odd"}]))
        .unwrap();
    let value = figure.to_value();
    let names: Vec<&Value> = (0..4).map(|i| &value["data"][i]["name"]).collect();
    assert_eq!(names, vec!["even", "odd", "even", "odd"]);
}

#[test]
fn deep_update_merges_nested_nodes() {
    let mut figure = Figure::from_value(json!({
        "layout": {"xaxis": {"range": [0, 1], "domain": [0, 1]}, "title": "old"}
    }))
    .unwrap();
    figure
        .update(&json!({"layout": {"title": "new", "xaxis": {"domain": [0, 0.8]}}}))
        .unwrap();
    let layout = figure.to_value()["layout"].clone();
    assert_eq!(layout["title"], json!("new"));
    assert_eq!(layout["xaxis"]["domain"], json!([0, 0.8]));
    assert_eq!(layout["xaxis"]["range"], json!([0, 1]));
}

// ── force_clean ───────────────────────────────────────────────────────────

#[test]
fn force_clean_drops_nulls_and_empty_containers() {
    let mut figure = Figure::from_value(json!({
        "data": [{"x": [1]}],
        "layout": {"xaxis": {}, "title": null, "width": 700}
    }))
    .unwrap();
    figure.force_clean();
    assert_eq!(
        figure.to_value(),
        json!({"data": [{"type": "scatter", "x": [1]}], "layout": {"width": 700}})
    );
}

// ── Flatten ───────────────────────────────────────────────────────────────

#[test]
fn flattened_data_uses_deduplicated_trace_names() {
    let figure = Figure::from_value(json!({
        "data": [
            {"x": [1], "name": "prices"},
            {"x": [2], "name": "prices"},
            {"x": [3]}
        ]
    }))
    .unwrap();
    assert_eq!(
        figure.get_data(true),
        json!({
            "prices.x": [1],
            "prices_1.x": [2],
            "trace_2.x": [3]
        })
    );
}

#[test]
fn flatten_dot_joins_nested_keys() {
    let figure = Figure::from_value(json!({
        "data": [{"x": [1], "error_y": {"array": [0.5]}}]
    }))
    .unwrap();
    assert_eq!(
        figure.get_data(true),
        json!({"trace_0.x": [1], "trace_0.error_y.array": [0.5]})
    );
}

// ── src keys ──────────────────────────────────────────────────────────────

#[test]
fn src_keys_resolve_strings_and_column_references() {
    let node = create("scatter", json!({"xsrc": "alice:17"}), true).unwrap();
    assert_eq!(node.to_value()["xsrc"], json!("alice:17"));

    let node = create("scatter", json!({"xsrc": {"id": "col-3", "name": "prices"}}), true).unwrap();
    assert_eq!(node.to_value()["xsrc"], json!("col-3"));

    let err = create("scatter", json!({"xsrc": {"id": "", "name": "prices"}}), true).unwrap_err();
    assert!(matches!(err, GraphError::SrcResolution { ref key, .. } if key == "xsrc"));
}

// ── Schema-facing helpers ─────────────────────────────────────────────────

#[test]
fn class_name_registry_is_invertible() {
    let reference = graph_reference();
    for name in ["scatter", "error_y", "marker", "layout", "annotation"] {
        let class = string_to_class_name(name);
        assert_eq!(reference.class_name_to_object_name(&class), Some(name));
    }
    assert_eq!(reference.class_name_to_object_name("XAxis"), Some("xaxis"));
}

#[test]
fn describe_lists_valid_attributes() {
    let reference = graph_reference();
    let listing = reference
        .describe("marker", &["figure".into(), "data".into(), "scatter".into()])
        .unwrap();
    assert!(listing.contains("size"));
    assert!(listing.contains("color"));
}

#[test]
fn roles_resolve_contextually() {
    let reference = graph_reference();
    assert_eq!(
        reference.resolve_role("layout", &["figure".into()], "xaxis", None),
        Some(Role::Object)
    );
    assert_eq!(
        reference.resolve_role("scatter", &["figure".into(), "data".into()], "xaxis", None),
        Some(Role::Info)
    );
}

// ── Pretty printing ───────────────────────────────────────────────────────

#[test]
fn pretty_printing_orders_coordinates_first() {
    let figure = Figure::from_value(json!({
        "data": [{"mode": "lines", "y": [2], "x": [1]}]
    }))
    .unwrap();
    let rendered = figure.data().to_string_pretty();
    let x_at = rendered.find("x=").unwrap();
    let y_at = rendered.find("y=").unwrap();
    let mode_at = rendered.find("mode=").unwrap();
    assert!(x_at < y_at && y_at < mode_at);
    assert!(rendered.starts_with("Data(["));
}
