//! Property: stripping style twice is the same as stripping once, for
//! arbitrary small figures.

use graph_objs::Figure;
use proptest::prelude::*;
use serde_json::{json, Value};

fn trace_strategy() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(-1000i64..1000, 0..5),
        prop::collection::vec(-1000i64..1000, 0..5),
        prop::option::of(0.0f64..1.0),
        prop::option::of(prop::collection::vec(1u64..20, 1..4)),
    )
        .prop_map(|(x, y, opacity, marker_sizes)| {
            let mut trace = json!({"x": x, "y": y});
            if let Some(opacity) = opacity {
                trace["opacity"] = json!(opacity);
            }
            if let Some(sizes) = marker_sizes {
                trace["marker"] = json!({"size": sizes});
            }
            trace
        })
}

proptest! {
    #[test]
    fn strip_style_is_idempotent(traces in prop::collection::vec(trace_strategy(), 0..4)) {
        let mut figure = Figure::from_value(json!({"data": traces})).unwrap();
        figure.strip_style();
        let once = figure.to_value();
        figure.strip_style();
        prop_assert_eq!(figure.to_value(), once);
    }

    #[test]
    fn get_data_only_ever_shrinks(traces in prop::collection::vec(trace_strategy(), 0..4)) {
        let figure = Figure::from_value(json!({"data": traces})).unwrap();
        let data = figure.get_data(false);
        let full = figure.to_value();
        // every extracted trace entry is present verbatim in the full tree
        let Value::Array(extracted) = data else { panic!("expected a sequence") };
        for entry in &extracted {
            let Value::Object(map) = entry else { panic!("expected mappings") };
            let found = full["data"].as_array().unwrap().iter().any(|trace| {
                map.iter().all(|(k, v)| trace.get(k) == Some(v))
            });
            prop_assert!(found);
        }
    }
}
