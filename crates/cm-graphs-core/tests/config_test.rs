use cm_graphs_core::config::{
    ClusterPosition, GraphConfig, GroupedType, LegendPosition, NodeShape, Orientation,
    deep_merge_value,
};
use cm_graphs_core::{ChartKind, Error, normalize_config};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn arrays_merge_by_position_and_drop_default_extras() {
    let mut base = json!({"groups": [{"color": "a", "label": "A"}, {"color": "b", "label": "B"}]});
    deep_merge_value(&mut base, &json!({"groups": [{"color": "x"}]}));
    assert_eq!(base, json!({"groups": [{"color": "x", "label": "A"}]}));

    let mut base = json!({"list": [1, 2]});
    deep_merge_value(&mut base, &json!({"list": [9, 8, 7]}));
    assert_eq!(base, json!({"list": [9, 8, 7]}));
}

#[test]
fn user_values_win_and_unknown_keys_are_kept() {
    let mut base = json!({"a": {"b": 1, "c": 2}, "d": true});
    deep_merge_value(&mut base, &json!({"a": {"b": 5}, "e": "new"}));
    assert_eq!(base, json!({"a": {"b": 5, "c": 2}, "d": true, "e": "new"}));
}

proptest! {
    #[test]
    fn merging_the_same_user_config_twice_changes_nothing(
        defaults in prop::collection::btree_map("[a-d]", 0i64..100, 0..4),
        user in prop::collection::btree_map("[a-f]", 0i64..100, 0..4),
    ) {
        let user = json!({"m": user, "n": [1, 2]});
        let mut once = json!({"m": defaults, "n": [5, 6, 7]});
        deep_merge_value(&mut once, &user);
        let mut twice = once.clone();
        deep_merge_value(&mut twice, &user);
        prop_assert_eq!(&once, &twice);
        for (k, v) in user["m"].as_object().unwrap() {
            prop_assert_eq!(&once["m"][k], v);
        }
        prop_assert_eq!(&once["n"], &json!([1, 2]));
    }
}

#[test]
fn histogram_defaults_follow_series_count() {
    let data = json!([
        {"label": "a", "values": [1, 2]},
        {"label": "b", "values": [1, 2, 3]}
    ]);
    let cfg = normalize_config(&json!({"type": "histogram"}), Some(&data)).expect("config");
    let GraphConfig::Histogram(h) = cfg else {
        panic!("expected histogram config");
    };
    assert_eq!(h.groups.len(), 3);
    assert_eq!(h.groups[2].label, "Group-3");
    assert_eq!(h.groups[0].color, "#1980B6");
    assert_eq!(h.orientation, Orientation::Vertical);
    assert_eq!(h.grouped_type, GroupedType::Inline);
    assert_eq!(h.legend.position, LegendPosition::Right);
    assert!(!h.legend.enabled);
    assert_eq!(h.base.margin.left, 10.0);
    assert!(h.axis.show_axis_x && h.axis.show_axis_y);
}

#[test]
fn line_defaults_use_line_labels_and_area() {
    let data = json!([{"label": "a", "values": [1, 2]}]);
    let cfg = normalize_config(&json!({"type": "line"}), Some(&data)).expect("config");
    let GraphConfig::Line(l) = cfg else {
        panic!("expected line config");
    };
    assert_eq!(l.groups[1].label, "Line-2");
    assert!(l.has_area);
}

#[test]
fn tree_and_flow_defaults_are_data_independent() {
    let cfg = normalize_config(&json!({"type": "tree", "nodes": {"shape": "rect"}}), None)
        .expect("config");
    let GraphConfig::Tree(t) = cfg else {
        panic!("expected tree config");
    };
    assert_eq!(t.nodes.shape, NodeShape::Rect);
    assert_eq!(t.nodes.circle_radius, 10.0);
    assert_eq!(t.nodes.rectangle_dimensions.width, 150.0);
    assert_eq!(t.nodes.max_initial_expanded_level, 2);
    assert_eq!(t.label.padding.left, 10.0);
    assert!(t.zoom.is_none());

    let cfg = normalize_config(
        &json!({"type": "flow-chart", "clusters": {"position": "full-space"}}),
        None,
    )
    .expect("config");
    let GraphConfig::FlowChart(f) = cfg else {
        panic!("expected flow config");
    };
    assert_eq!(f.clusters.position, ClusterPosition::FullSpace);
    assert_eq!(f.clusters.label.font_size, 25.0);
}

#[test]
fn range_slider_axis_follows_orientation() {
    let cfg = normalize_config(&json!({"type": "range-slider", "orientation": "vertical"}), None)
        .expect("config");
    let GraphConfig::RangeSlider(s) = cfg else {
        panic!("expected slider config");
    };
    assert!(!s.axis.show_axis_x);
    assert!(s.axis.show_axis_y);

    let cfg = normalize_config(&json!({"type": "range-slider"}), None).expect("config");
    let GraphConfig::RangeSlider(s) = cfg else {
        panic!("expected slider config");
    };
    assert!(s.axis.show_axis_x);
}

#[test]
fn normalization_is_idempotent() {
    let data = json!([{"label": "a", "values": [1, -2, 3]}]);
    let user = json!({
        "type": "histogram",
        "groupedType": "stacked",
        "groups": [{"color": "red"}],
        "margin": {"left": 40},
        "maxDisplayedNumber": 4
    });
    let once = normalize_config(&user, Some(&data)).expect("once");
    let again = normalize_config(&once.to_value().expect("value"), Some(&data)).expect("twice");
    assert_eq!(once, again);

    for kind in ChartKind::ALL {
        let user = json!({"type": kind.as_str()});
        let once = normalize_config(&user, None).expect("once");
        let again = normalize_config(&once.to_value().expect("value"), None).expect("twice");
        assert_eq!(once, again, "{kind}");
    }
}

#[test]
fn unknown_enum_values_are_configuration_errors() {
    let err = normalize_config(&json!({"type": "tree", "nodes": {"shape": "hexagon"}}), None)
        .expect_err("hexagon is not a shape");
    assert!(matches!(err, Error::InvalidConfig { ref chart, .. } if chart == "tree"));

    let err = normalize_config(&json!({"type": "histogram", "orientation": "diagonal"}), None)
        .expect_err("bad orientation");
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn unknown_chart_type_is_rejected() {
    let err = normalize_config(&json!({"type": "radar"}), None).expect_err("unsupported");
    assert!(matches!(err, Error::UnsupportedChart { ref chart_type } if chart_type == "radar"));
    assert!(normalize_config(&json!({}), None).is_err());
}

#[test]
fn zoom_bounds_are_validated() {
    let err = normalize_config(
        &json!({"type": "bubble-chart", "zoom": {"minZoom": 4, "maxZoom": 1}}),
        None,
    )
    .expect_err("inverted zoom");
    assert!(matches!(err, Error::InvalidConfig { .. }));
}
