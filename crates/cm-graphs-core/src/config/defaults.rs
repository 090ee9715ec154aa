//! Per chart default configuration trees.

use super::model::ChartKind;
use serde_json::{Value, json};

pub const DEFAULT_GROUP_COLOR: &str = "#1980B6";

pub const DEFAULT_SLICE_COLORS: [&str; 10] = [
    "#e61400", "#ff0f64", "#0555fa", "#008c5a", "#ff5a0f", "#ff4687", "#41b9e6", "#55be5a",
    "#c6c6c6", "#000000",
];

/// Builds the default configuration for `kind`.
///
/// Only the axis charts depend on data: they get one `groups` entry per series, where the
/// series count is the longest `values` array.
pub fn defaults_for(kind: ChartKind, data: Option<&Value>) -> Value {
    let mut out = base_defaults();
    let specific = match kind {
        ChartKind::Histogram => axis_chart_defaults("Group", series_count(data), true),
        ChartKind::Line => axis_chart_defaults("Line", series_count(data), false),
        ChartKind::Pie | ChartKind::Donut => pie_defaults(),
        ChartKind::Tree => tree_defaults(),
        ChartKind::FlowChart => flow_defaults(),
        ChartKind::RangeSlider => range_slider_defaults(),
        ChartKind::BubbleChart => bubble_defaults(),
    };
    if let (Some(base), Value::Object(extra)) = (out.as_object_mut(), specific) {
        base.extend(extra);
        base.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    }
    out
}

/// Longest `values` array across the records of an axis chart.
pub fn series_count(data: Option<&Value>) -> usize {
    data.and_then(Value::as_array)
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r.get("values").and_then(Value::as_array))
                .map(Vec::len)
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

pub fn default_group(prefix: &str, index: usize) -> Value {
    json!({ "color": DEFAULT_GROUP_COLOR, "label": format!("{prefix}-{}", index + 1) })
}

fn base_defaults() -> Value {
    json!({
        "id": null,
        "margin": { "top": 10, "right": 10, "bottom": 10, "left": 10 },
        "overflowX": false,
        "overflowY": false,
        "tooltipFormat": "{label}: {value}"
    })
}

fn axis_defaults() -> Value {
    json!({
        "showAxisX": true,
        "showAxisY": true,
        "invertAxisX": false,
        "invertAxisY": false,
        "labelXOrientation": "horizontal",
        "labelYOrientation": "horizontal",
        "lineColor": "black",
        "textColor": "black"
    })
}

fn legend_defaults() -> Value {
    json!({ "enabled": false, "position": "right" })
}

fn axis_chart_defaults(group_prefix: &str, series: usize, histogram: bool) -> Value {
    let groups: Vec<Value> = (0..series).map(|i| default_group(group_prefix, i)).collect();
    let mut out = json!({
        "groups": groups,
        "events": { "clickOnElement": false },
        "orientation": "vertical",
        "grid": { "axisX": true, "axisY": true, "color": "#ccc" },
        "axis": axis_defaults(),
        "legend": legend_defaults()
    });
    if let Some(map) = out.as_object_mut() {
        if histogram {
            map.insert("groupedType".to_string(), json!("inline"));
        } else {
            map.insert("hasArea".to_string(), json!(true));
        }
    }
    out
}

fn pie_defaults() -> Value {
    json!({
        "events": { "clickOnElement": false },
        "slices": { "colors": DEFAULT_SLICE_COLORS, "textColor": "white" },
        "legend": legend_defaults()
    })
}

fn shape_defaults() -> Value {
    json!({
        "shape": "circle",
        "collapsedColor": "lightsteelblue",
        "expandedColor": "white",
        "strokeColor": "lightsteelblue",
        "circleRadius": 10,
        "rectangleDimensions": { "width": 150, "height": 40 },
        "squareDimensions": 80,
        "rhombusDimensions": 120,
        "distanceBetweenBrothers": 20,
        "distanceBetweenParentAndChild": 150
    })
}

fn label_defaults() -> Value {
    json!({
        "color": "black",
        "padding": { "top": 5, "left": 10, "right": 10, "bottom": 5 }
    })
}

fn tree_defaults() -> Value {
    let mut nodes = shape_defaults();
    if let Some(map) = nodes.as_object_mut() {
        map.insert("distanceBetweenCousins".to_string(), json!(40));
        map.insert("expandable".to_string(), json!(true));
        map.insert("maxInitialExpandedLevel".to_string(), json!(2));
    }
    json!({
        "events": { "clickOnElement": false },
        "orientation": "vertical",
        "nodes": nodes,
        "links": { "color": "lightsteelblue", "arrow": true, "arrowDirection": "end" },
        "label": label_defaults()
    })
}

fn flow_defaults() -> Value {
    json!({
        "events": { "clickOnElement": false },
        "orientation": "vertical",
        "nodes": shape_defaults(),
        "links": {
            "color": "lightsteelblue",
            "arrow": true,
            "arrowDirection": "end",
            "shape": "straight"
        },
        "label": label_defaults(),
        "clusters": {
            "strokeColor": "lightsteelblue",
            "fillColor": "transparent",
            "position": "default",
            "shape": "rectangle",
            "label": {
                "color": "lightsteelblue",
                "position": "center",
                "font-size": 25,
                "padding": { "top": 5, "left": 10, "right": 10, "bottom": 5 }
            }
        }
    })
}

fn range_slider_defaults() -> Value {
    json!({
        "events": { "rangeChanged": false, "rangeChanging": false },
        "orientation": "horizontal",
        "track": {
            "color": "#bbb",
            "width": 6,
            "insetColor": "#eee",
            "insetWidth": 4,
            "fillColor": "#3883fa",
            "fillWidth": 4
        },
        "interval": { "type": "discrete" },
        "handle": {
            "strokeColor": "#777",
            "fillColor": "white",
            "type": "double",
            "showTooltip": "always"
        },
        "axis": { "showAxisX": true, "showAxisY": false }
    })
}

fn bubble_defaults() -> Value {
    json!({
        "events": { "clickOnElement": false },
        "nodes": {
            "backgroundStartColor": "lightsteelblue",
            "backgroundEndColor": "steelblue",
            "strokeColorOnHover": "darkgrey",
            "expandable": true,
            "maxInitialExpandedLevel": 2
        },
        "label": { "color": "black" }
    })
}
