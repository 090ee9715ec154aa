use cm_graphs_core::config::GraphConfig;
use cm_graphs_core::data::ChartData;
use cm_graphs_core::{Size, normalize_config, normalize_data};
use cm_graphs_layout::model::TreeChartLayout;
use cm_graphs_layout::viewport::{TRANSITION_DURATION, ZoomTransform};
use cm_graphs_layout::{Chart, ChartEvent, Error, LayoutOptions, TreeChart, Zoomable};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

fn chain() -> Value {
    json!([{
        "id": "a", "label": "root", "children": [{
            "id": "b", "label": "child", "children": [{
                "id": "c", "label": "grandchild", "children": [
                    {"id": "d", "label": "leaf"},
                    {"id": "e", "label": "other leaf"}
                ]
            }]
        }]
    }])
}

fn chart(config: Value, data: Value) -> TreeChart {
    let cfg = normalize_config(&config, None).expect("config");
    let ChartData::Tree(records) = normalize_data(&cfg, &data).expect("data") else {
        panic!("expected tree data");
    };
    let GraphConfig::Tree(cfg) = cfg else {
        panic!("expected tree config");
    };
    TreeChart::new(cfg, records, Size::new(800.0, 600.0), LayoutOptions::default())
        .expect("chart")
}

fn visible(layout: &TreeChartLayout) -> Vec<&str> {
    layout.nodes.iter().map(|n| n.id.as_str()).collect()
}

#[test]
fn nodes_below_the_initial_level_start_collapsed() {
    let tree = chart(json!({"type": "tree"}), chain());
    let layout = tree.layout();
    assert_eq!(visible(layout), ["a", "b", "c"]);
    let c = &layout.nodes[2];
    assert!(c.collapsed);
    assert_eq!(c.fill, c.node.collapsed_color);
    assert_eq!(layout.links.len(), 2);
    assert!(layout.entering.is_empty() && layout.source.is_none());
}

#[test]
fn children_sit_one_level_step_below_their_parent() {
    let tree = chart(json!({"type": "tree", "nodes": {"expandable": false}}), chain());
    let layout = tree.layout();
    let by_id = |id: &str| {
        layout
            .nodes
            .iter()
            .find(|n| n.id == id)
            .expect("node")
    };
    let (a, b, d, e) = (by_id("a"), by_id("b"), by_id("d"), by_id("e"));
    assert!(b.center.y > a.center.y);
    assert_eq!(d.center.y, e.center.y);
    assert!(e.center.x > d.center.x);
    assert_eq!(b.parent.as_deref(), Some("a"));

    let link = layout.links.iter().find(|l| l.target == "b").expect("link");
    assert_eq!(link.points[0].x, a.center.x);
    assert_eq!(link.points[5].y, b.center.y - b.size.height / 2.0);
}

#[test]
fn horizontal_trees_grow_to_the_right() {
    let tree = chart(
        json!({"type": "tree", "orientation": "horizontal", "nodes": {"expandable": false}}),
        chain(),
    );
    let layout = tree.layout();
    let a = &layout.nodes[0];
    let b = &layout.nodes[1];
    assert!(b.center.x > a.center.x);
    assert_eq!(b.center.y, a.center.y);
}

#[test]
fn clicking_a_collapsed_node_expands_it_and_back() {
    let mut tree = chart(json!({"type": "tree"}), chain());
    let first = tree.layout().generation;
    let c_center = tree.layout().nodes[2].center;

    tree.click("c").expect("expand");
    let layout = tree.layout();
    assert_eq!(visible(layout), ["a", "b", "c", "d", "e"]);
    assert_eq!(layout.entering, ["d", "e"]);
    assert_eq!(layout.source, Some(c_center));
    assert!(layout.generation > first);
    let transition = layout.viewport.transition.expect("transition");
    assert_eq!(transition.duration, TRANSITION_DURATION);

    tree.click("c").expect("collapse");
    let layout = tree.layout();
    assert_eq!(visible(layout), ["a", "b", "c"]);
    assert_eq!(layout.exiting, ["d", "e"]);
}

#[test]
fn leaf_clicks_are_reported_when_enabled() {
    let mut tree = chart(
        json!({"type": "tree", "events": {"clickOnElement": true}, "nodes": {"expandable": false}}),
        chain(),
    );
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    tree.events_mut().subscribe(move |e| sink.borrow_mut().push(e.clone()));

    tree.click("d").expect("click");
    tree.click("b").expect("click");
    let events = seen.borrow();
    assert_eq!(events.len(), 2);
    let ChartEvent::ClickOnElement { record, .. } = &events[0] else {
        panic!("expected a click event");
    };
    assert_eq!(record["id"], "d");
    assert_eq!(record["label"], "leaf");

    drop(events);
    assert!(matches!(tree.click("zz"), Err(Error::UnknownElement { .. })));
}

#[test]
fn zoom_state_follows_the_fit() {
    let mut tree = chart(
        json!({"type": "tree", "zoom": {"minZoom": 0.1, "maxZoom": 3}}),
        chain(),
    );
    let fit = tree.layout().viewport.fit.expect("fit");
    let state = *tree.zoom_state().expect("zoom");
    assert_eq!(state.transform, ZoomTransform::from(fit));
    assert_eq!(state.scale_extent, Some((0.1, 3.0)));

    assert!(tree.zoom_by(100.0, Default::default()));
    assert_eq!(tree.zoom_state().expect("zoom").transform.k, 3.0);

    let mut plain = chart(json!({"type": "tree"}), chain());
    assert!(plain.zoom_state().is_none());
    assert!(!plain.pan_by(1.0, 1.0));
}

#[test]
fn only_the_first_root_is_drawn() {
    let tree = chart(
        json!({"type": "tree"}),
        json!([{"id": "x", "label": "x"}, {"id": "y", "label": "y"}]),
    );
    assert_eq!(visible(tree.layout()), ["x"]);
}

#[test]
fn empty_tree_has_nothing_to_fit() {
    let tree = chart(json!({"type": "tree"}), json!([]));
    let layout = tree.layout();
    assert!(layout.nodes.is_empty());
    assert!(layout.viewport.fit.is_none());
}
