use cm_graphs_core::config::{FlowConfig, GraphConfig, Orientation};
use cm_graphs_core::data::{ChartData, FlowData};
use cm_graphs_core::text::DeterministicTextMeasurer;
use cm_graphs_core::{Point, Size, normalize_config, normalize_data};
use cm_graphs_layout::Error;
use cm_graphs_layout::flow::{FlowLayout, adjust_full_space, clip_to_circle, layout_flow};
use proptest::prelude::*;
use serde_json::{Value, json};

const EPS: f64 = 1e-9;

fn flow(config: Value, data: Value) -> (FlowConfig, FlowData) {
    let cfg = normalize_config(&config, None).expect("config");
    let ChartData::Flow(data) = normalize_data(&cfg, &data).expect("data") else {
        panic!("expected flow data");
    };
    let GraphConfig::FlowChart(cfg) = cfg else {
        panic!("expected flow config");
    };
    (cfg, data)
}

fn two_clusters() -> (FlowConfig, FlowData) {
    flow(
        json!({"type": "flow-chart"}),
        json!({
            "nodes": [{"id": "a", "label": "a"}, {"id": "b", "label": "b"}],
            "edges": [{"source": "a", "target": "b"}],
            "clusters": [
                {"id": "late", "nodes": ["b"], "cluster": {"level": 2}},
                {"id": "early", "nodes": ["a"], "cluster": {"level": 1}}
            ]
        }),
    )
}

fn place(layout: &mut FlowLayout) {
    let a = layout.nodes.iter_mut().find(|n| n.data.id == "a").expect("a");
    a.center = Point::new(0.0, 0.0);
    a.size = Size::new(20.0, 20.0);
    let b = layout.nodes.iter_mut().find(|n| n.data.id == "b").expect("b");
    b.center = Point::new(100.0, 500.0);
    b.size = Size::new(20.0, 20.0);
    for c in &mut layout.clusters {
        c.size = Size::new(40.0, 40.0);
        c.center = if c.data.id == "early" {
            Point::new(0.0, 0.0)
        } else {
            Point::new(100.0, 500.0)
        };
    }
    layout.edges[0].points = vec![
        Point::new(0.0, 10.0),
        Point::new(50.0, 250.0),
        Point::new(100.0, 490.0),
    ];
}

#[test]
fn nodes_flow_along_the_orientation() {
    let data = json!({
        "nodes": [{"id": "a", "label": "a"}, {"id": "b", "label": "b"}],
        "edges": [{"source": "a", "target": "b"}]
    });
    let measurer = DeterministicTextMeasurer::default();

    let (cfg, d) = flow(json!({"type": "flow-chart"}), data.clone());
    let layout = layout_flow(&d, &cfg, &measurer).expect("layout");
    let (a, b) = (layout.node("a").expect("a"), layout.node("b").expect("b"));
    assert!(b.center.y > a.center.y);
    assert_eq!(layout.edges.len(), 1);
    assert!(layout.edges[0].points.len() >= 2);
    assert!(layout.bounds().is_some());

    let (cfg, d) = flow(json!({"type": "flow-chart", "orientation": "horizontal"}), data);
    let layout = layout_flow(&d, &cfg, &measurer).expect("layout");
    let (a, b) = (layout.node("a").expect("a"), layout.node("b").expect("b"));
    assert!(b.center.x > a.center.x);
}

#[test]
fn nested_clusters_take_the_smallest_superset() {
    let (cfg, d) = flow(
        json!({"type": "flow-chart"}),
        json!({
            "nodes": [{"id": "a", "label": "a"}, {"id": "b", "label": "b"}, {"id": "c", "label": "c"}],
            "edges": [{"source": "a", "target": "b"}, {"source": "b", "target": "c"}],
            "clusters": [
                {"id": "all", "nodes": ["a", "b", "c"]},
                {"id": "pair", "nodes": ["a", "b"]},
                {"id": "one", "nodes": ["a"]}
            ]
        }),
    );
    let layout = layout_flow(&d, &cfg, &DeterministicTextMeasurer::default()).expect("layout");
    assert_eq!(layout.cluster("all").expect("all").parent, None);
    assert_eq!(layout.cluster("pair").expect("pair").parent.as_deref(), Some("all"));
    assert_eq!(layout.cluster("one").expect("one").parent.as_deref(), Some("pair"));

    let all = layout.cluster("all").expect("all").rect();
    let a = layout.node("a").expect("a").extent();
    assert!(all.x <= a.x && all.x + all.width >= a.x + a.width);
}

#[test]
fn empty_flow_has_no_bounds() {
    let (cfg, d) = flow(json!({"type": "flow-chart"}), json!({}));
    let layout = layout_flow(&d, &cfg, &DeterministicTextMeasurer::default()).expect("layout");
    assert!(layout.nodes.is_empty());
    assert!(layout.bounds().is_none());
}

#[test]
fn duplicate_ids_are_rejected() {
    let (cfg, mut d) = two_clusters();
    let mut clash = d.clusters[0].clone();
    clash.id = "a".to_string();
    d.clusters.push(clash);
    let err = layout_flow(&d, &cfg, &DeterministicTextMeasurer::default()).unwrap_err();
    assert!(matches!(err, Error::DuplicateId { id } if id == "a"));
}

#[test]
fn full_space_clusters_span_the_cross_axis_and_stack_by_level() {
    let (cfg, d) = two_clusters();
    let mut layout = layout_flow(&d, &cfg, &DeterministicTextMeasurer::default()).expect("layout");
    place(&mut layout);

    adjust_full_space(&mut layout, Orientation::Vertical, 50.0);

    let ids: Vec<&str> = layout.clusters.iter().map(|c| c.data.id.as_str()).collect();
    assert_eq!(ids, ["early", "late"]);
    for c in &layout.clusters {
        assert_eq!(c.center.x, 50.0);
        assert_eq!(c.size.width, 140.0);
    }
    let early = layout.cluster("early").expect("early");
    assert_eq!(early.center.y, 0.0);

    let late = layout.cluster("late").expect("late");
    assert_eq!(late.center.y, 90.0);
    assert_eq!(layout.node("b").expect("b").center.y, 90.0);
    assert_eq!(layout.node("a").expect("a").center.y, 0.0);

    // late moved by 90 - 500; only the first point stays with the source.
    let points = &layout.edges[0].points;
    assert_eq!(points[0].y, 10.0);
    assert_eq!(points[1].y, 250.0 - 410.0);
    assert_eq!(points[2].y, 80.0);
}

#[test]
fn overlapping_clusters_push_the_next_level_down_with_its_edges() {
    let (cfg, d) = flow(
        json!({"type": "flow-chart"}),
        json!({
            "nodes": [{"id": "a", "label": "a"}, {"id": "b", "label": "b"}],
            "edges": [{"source": "a", "target": "b"}],
            "clusters": [
                {"id": "upper", "nodes": ["a"], "cluster": {"level": 0}},
                {"id": "lower", "nodes": ["b"], "cluster": {"level": 1}}
            ]
        }),
    );
    let mut layout = layout_flow(&d, &cfg, &DeterministicTextMeasurer::default()).expect("layout");
    for n in &mut layout.nodes {
        n.size = Size::new(20.0, 20.0);
        n.center = if n.data.id == "a" {
            Point::new(0.0, 0.0)
        } else {
            Point::new(100.0, 40.0)
        };
    }
    for c in &mut layout.clusters {
        if c.data.id == "upper" {
            c.center = Point::new(0.0, 5.0);
            c.size = Size::new(40.0, 50.0);
        } else {
            c.center = Point::new(100.0, 37.5);
            c.size = Size::new(40.0, 25.0);
        }
    }
    layout.edges[0].points = vec![
        Point::new(0.0, 10.0),
        Point::new(50.0, 20.0),
        Point::new(100.0, 30.0),
    ];

    let gap = 50.0;
    adjust_full_space(&mut layout, Orientation::Vertical, gap);

    let upper = layout.cluster("upper").expect("upper").rect();
    let lower = layout.cluster("lower").expect("lower").rect();
    assert_eq!(upper.y, -20.0);
    assert_eq!(lower.y, upper.y + upper.height + gap);

    let delta = 55.0;
    assert_eq!(layout.node("a").expect("a").center.y, 0.0);
    assert_eq!(layout.node("b").expect("b").center.y, 40.0 + delta);
    let ys: Vec<f64> = layout.edges[0].points.iter().map(|p| p.y).collect();
    assert_eq!(ys, [10.0, 20.0 + delta, 30.0 + delta]);
}

#[test]
fn adjacent_clusters_stay_where_they_are() {
    let (cfg, d) = two_clusters();
    let mut layout = layout_flow(&d, &cfg, &DeterministicTextMeasurer::default()).expect("layout");
    place(&mut layout);
    let late = layout
        .clusters
        .iter_mut()
        .find(|c| c.data.id == "late")
        .expect("late");
    late.center.y = 80.0;

    adjust_full_space(&mut layout, Orientation::Vertical, 50.0);
    assert_eq!(layout.cluster("late").expect("late").center.y, 80.0);
    assert_eq!(layout.node("b").expect("b").center.y, 500.0);
}

#[test]
fn aligned_endpoints_are_not_clipped() {
    let center = Point::new(10.0, 10.0);
    let p = Point::new(10.0, 40.0);
    assert_eq!(clip_to_circle(p, center, 5.0), p);
    let q = Point::new(-3.0, 10.0);
    assert_eq!(clip_to_circle(q, center, 5.0), q);
}

proptest! {
    #[test]
    fn clipped_endpoints_lie_on_the_circle(
        dx in prop_oneof![-500.0f64..-0.5, 0.5f64..500.0],
        dy in prop_oneof![-500.0f64..-0.5, 0.5f64..500.0],
        r in 1.0f64..100.0,
    ) {
        let center = Point::new(30.0, -20.0);
        let p = Point::new(center.x + dx, center.y + dy);
        let clipped = clip_to_circle(p, center, r);
        let d = (clipped.x - center.x).hypot(clipped.y - center.y);
        prop_assert!((d - r).abs() < 1e-6 * r.max(1.0));
        prop_assert!((clipped.x - center.x).signum() == dx.signum());
        prop_assert!((clipped.y - center.y).signum() == dy.signum());
    }
}

#[test]
fn clip_keeps_the_direction() {
    let clipped = clip_to_circle(Point::new(3.0, 4.0), Point::new(0.0, 0.0), 10.0);
    assert!((clipped.x - 6.0).abs() < EPS);
    assert!((clipped.y - 8.0).abs() < EPS);
}
