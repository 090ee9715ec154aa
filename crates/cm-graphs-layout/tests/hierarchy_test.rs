use cm_graphs_core::data::{BubbleDatum, ChartData, TreeDatum};
use cm_graphs_core::{Size, normalize_config, normalize_data};
use cm_graphs_layout::hierarchy::pack::pack;
use cm_graphs_layout::hierarchy::{Hierarchy, NodeId};
use serde_json::{Value, json};
use std::collections::BTreeSet;

fn tree(data: Value) -> TreeDatum {
    let cfg = normalize_config(&json!({"type": "tree"}), None).expect("config");
    let ChartData::Tree(mut roots) = normalize_data(&cfg, &data).expect("data") else {
        panic!("expected tree data");
    };
    roots.remove(0)
}

fn bubbles(data: Value) -> BubbleDatum {
    let cfg = normalize_config(&json!({"type": "bubble-chart"}), None).expect("config");
    let ChartData::Bubble(mut roots) = normalize_data(&cfg, &data).expect("data") else {
        panic!("expected bubble data");
    };
    roots.remove(0)
}

fn sample() -> Hierarchy<String> {
    let root = tree(json!([{
        "id": "r", "label": "r", "children": [
            {"id": "a", "label": "a", "children": [
                {"id": "a1", "label": "a1", "children": [{"id": "a1x", "label": "a1x"}]},
                {"id": "a2", "label": "a2"}
            ]},
            {"id": "b", "label": "b"}
        ]
    }]));
    Hierarchy::from_nested(&root, |d: &TreeDatum| d.id.clone())
}

fn ids(h: &Hierarchy<String>, nodes: Vec<NodeId>) -> BTreeSet<String> {
    nodes.into_iter().map(|id| h.node(id).data.clone()).collect()
}

fn find(h: &Hierarchy<String>, id: &str) -> NodeId {
    h.find(|d| d == id).expect("node")
}

#[test]
fn collapse_then_expand_restores_the_subtree() {
    let mut h = sample();
    let a1 = find(&h, "a1");
    assert!(h.collapse(a1));
    let a = find(&h, "a");
    let visible = ids(&h, h.descendants(a));
    let whole = ids(&h, h.all_descendants(a));

    assert!(h.collapse(a));
    assert_eq!(ids(&h, h.descendants(a)), BTreeSet::from(["a".to_string()]));
    assert_eq!(ids(&h, h.all_descendants(a)), whole);

    assert!(h.expand(a));
    assert_eq!(ids(&h, h.descendants(a)), visible);
    assert!(h.node(a1).is_collapsed());
}

#[test]
fn toggling_twice_is_a_no_op() {
    let mut h = sample();
    let before = h.clone();
    let a = find(&h, "a");
    assert!(h.toggle(a));
    assert!(h.toggle(a));
    assert_eq!(h, before);
}

#[test]
fn leaves_cannot_collapse() {
    let mut h = sample();
    let b = find(&h, "b");
    assert!(!h.collapse(b));
    assert!(!h.expand(b));
}

#[test]
fn initial_collapse_hides_everything_from_a_depth() {
    let mut h = sample();
    assert_eq!(h.collapse_from_depth(1), 2);
    assert_eq!(
        ids(&h, h.descendants(h.root())),
        BTreeSet::from(["r".to_string(), "a".to_string(), "b".to_string()])
    );
    let a = find(&h, "a");
    h.expand(a);
    let a1 = find(&h, "a1");
    assert!(h.node(a1).is_collapsed());
    assert_eq!(h.height(), 3);
}

#[test]
fn values_sum_over_hidden_children() {
    let root = bubbles(json!([{
        "id": "r", "label": "r", "children": [
            {"id": "a", "label": "a", "value": 1},
            {"id": "b", "label": "b", "children": [
                {"id": "b1", "label": "b1", "value": 2},
                {"id": "b2", "label": "b2", "value": 3}
            ]}
        ]
    }]));
    let mut h = Hierarchy::from_nested(&root, |d: &BubbleDatum| d.value);
    let b = h.node(h.root()).children()[1];
    h.collapse(b);
    h.sum(|v| v.unwrap_or(0.0));
    assert_eq!(h.node(h.root()).value, 6.0);
    assert_eq!(h.node(b).value, 5.0);

    h.sort_by_value_desc();
    assert_eq!(h.node(h.root()).children()[0], b);
}

#[test]
fn packed_children_stay_inside_their_parent() {
    let root = bubbles(json!([{
        "id": "r", "label": "r", "children": [
            {"id": "a", "label": "a", "value": 1},
            {"id": "b", "label": "b", "value": 4},
            {"id": "c", "label": "c", "children": [
                {"id": "c1", "label": "c1", "value": 2},
                {"id": "c2", "label": "c2", "value": 2}
            ]}
        ]
    }]));
    let mut h = Hierarchy::from_nested(&root, |d: &BubbleDatum| d.value);
    h.sum(|v| v.unwrap_or(0.0));
    pack(&mut h, Size::new(400.0, 300.0), 3.0);

    let r = h.node(h.root());
    assert_eq!((r.x, r.y), (200.0, 150.0));
    assert!((r.r - 150.0).abs() < 1e-9);
    for id in h.all_descendants(h.root()).into_iter().skip(1) {
        let n = h.node(id);
        let p = h.node(n.parent.expect("parent"));
        let d = (n.x - p.x).hypot(n.y - p.y);
        assert!(d + n.r <= p.r + 1e-6, "node {} leaves its parent", id.index());
    }
}
