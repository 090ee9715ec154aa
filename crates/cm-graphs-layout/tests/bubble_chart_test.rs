use cm_graphs_core::config::GraphConfig;
use cm_graphs_core::data::ChartData;
use cm_graphs_core::{Size, normalize_config, normalize_data};
use cm_graphs_layout::model::BubbleChartLayout;
use cm_graphs_layout::{BubbleChart, Chart, ChartEvent, Error, LayoutOptions, Scalable};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

const EPS: f64 = 1e-9;

fn data() -> Value {
    json!([{
        "id": "root", "label": "root", "children": [
            {"id": "a", "label": "a", "value": 1},
            {"id": "b", "label": "b", "children": [
                {"id": "b1", "label": "b1", "children": [{"id": "b1x", "label": "b1x", "value": 2}]},
                {"id": "b2", "label": "b2", "value": 3}
            ]}
        ]
    }])
}

fn chart(config: Value) -> BubbleChart {
    let cfg = normalize_config(&config, None).expect("config");
    let ChartData::Bubble(records) = normalize_data(&cfg, &data()).expect("data") else {
        panic!("expected bubble data");
    };
    let GraphConfig::BubbleChart(cfg) = cfg else {
        panic!("expected bubble config");
    };
    BubbleChart::new(cfg, records, Size::new(500.0, 400.0), LayoutOptions::default())
        .expect("chart")
}

fn visible(layout: &BubbleChartLayout) -> Vec<&str> {
    layout.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn labelled(layout: &BubbleChartLayout) -> Vec<&str> {
    layout
        .nodes
        .iter()
        .filter(|n| n.label_visible)
        .map(|n| n.id.as_str())
        .collect()
}

#[test]
fn root_focus_fills_the_graph_area() {
    let chart = chart(json!({"type": "bubble-chart"}));
    let layout = chart.layout();
    assert_eq!(layout.focus, "root");
    assert!((layout.transform.k - 1.0).abs() < EPS);
    assert!((layout.label_scale - 1.0).abs() < EPS);

    let mut ids = visible(layout);
    ids.sort_unstable();
    assert_eq!(ids, ["a", "b", "b1", "b2"]);
    let mut labels = labelled(layout);
    labels.sort_unstable();
    assert_eq!(labels, ["a", "b"]);

    let b1 = layout.nodes.iter().find(|n| n.id == "b1").expect("b1");
    assert!(b1.clickable);
    assert_ne!(b1.fill, layout.nodes.iter().find(|n| n.id == "a").expect("a").fill);
}

#[test]
fn focusing_a_parent_zooms_in_and_shows_its_labels() {
    let mut chart = chart(json!({"type": "bubble-chart"}));
    chart.click(Some("b")).expect("click");
    let layout = chart.layout();
    assert_eq!(layout.focus, "b");
    assert!(layout.transform.k > 1.0);
    assert!((layout.label_scale * layout.transform.k - 1.0).abs() < EPS);
    let mut labels = labelled(layout);
    labels.sort_unstable();
    assert_eq!(labels, ["b1", "b2"]);
    assert_eq!(layout.zoom.expect("zoom").duration, 750.0);
}

#[test]
fn hidden_children_appear_on_focus_and_go_when_focus_moves_up() {
    let mut chart = chart(json!({"type": "bubble-chart"}));
    chart.click(Some("b")).expect("click");
    chart.click(Some("b1")).expect("click");
    assert!(visible(chart.layout()).contains(&"b1x"));
    assert_eq!(chart.layout().focus, "b1");

    chart.click(Some("a")).expect("leaf click");
    let layout = chart.layout();
    assert_eq!(layout.focus, "root");
    assert!(!visible(layout).contains(&"b1x"));
}

#[test]
fn background_click_returns_to_the_root() {
    let mut chart = chart(json!({"type": "bubble-chart"}));
    chart.click(Some("b")).expect("click");
    chart.click(None).expect("background");
    assert_eq!(chart.layout().focus, "root");
}

#[test]
fn resize_keeps_the_focus_without_animation() {
    let mut chart = chart(json!({"type": "bubble-chart"}));
    chart.click(Some("b")).expect("click");
    let generation = chart.layout().generation;

    let next = chart.resize(Size::new(300.0, 300.0)).expect("resize");
    let layout = chart.layout();
    assert!(next > generation);
    assert_eq!(layout.generation, next);
    assert_eq!(layout.focus, "b");
    assert_eq!(layout.zoom.expect("zoom").duration, 0.0);
    assert_eq!(chart.container_size(), Size::new(300.0, 300.0));
}

#[test]
fn leaf_labels_are_reported_when_not_expandable() {
    let mut chart = chart(json!({
        "type": "bubble-chart",
        "events": {"clickOnElement": true},
        "nodes": {"expandable": false}
    }));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    chart
        .events_mut()
        .subscribe(move |e| sink.borrow_mut().push(e.clone()));

    chart.click_label("a").expect("click");
    let events = seen.borrow();
    let [ChartEvent::ClickOnElement { record, .. }] = events.as_slice() else {
        panic!("expected one click event, got {events:?}");
    };
    assert_eq!(record["id"], "a");
    assert_eq!(record["value"], 1.0);
}

#[test]
fn unknown_nodes_are_rejected() {
    let mut chart = chart(json!({"type": "bubble-chart"}));
    assert!(matches!(
        chart.click(Some("zzz")),
        Err(Error::UnknownElement { .. })
    ));
    assert!(matches!(
        chart.click_label("zzz"),
        Err(Error::UnknownElement { .. })
    ));
}
