use narwhal::{
    EdgeLabel, Error, GraphLabel, GraphOptions, LayoutGraph, NodeLabel, Point, RankDir, layout,
};

const EPS: f64 = 1e-6;

fn graph(label: GraphLabel) -> LayoutGraph {
    let mut g = LayoutGraph::new(GraphOptions::default());
    g.set_graph(label);
    g
}

fn add_nodes(g: &mut LayoutGraph, ids: &[&str]) {
    for id in ids {
        g.set_node(*id, NodeLabel::sized(20.0, 10.0));
    }
}

fn add_edge(g: &mut LayoutGraph, v: &str, w: &str) {
    g.set_edge(v, w, EdgeLabel::default()).unwrap();
}

fn center(g: &LayoutGraph, id: &str) -> Point {
    let n = g.node(id).unwrap();
    Point::new(n.x, n.y)
}

#[test]
fn layout_of_an_empty_graph_is_empty() {
    let mut g = graph(GraphLabel::default());
    layout(&mut g).unwrap();
    assert_eq!(g.graph().width, 0.0);
    assert_eq!(g.graph().height, 0.0);
}

#[test]
fn chain_is_stacked_top_to_bottom() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b", "c"]);
    add_edge(&mut g, "a", "b");
    add_edge(&mut g, "b", "c");
    layout(&mut g).unwrap();

    assert_eq!(center(&g, "a"), Point::new(10.0, 5.0));
    assert_eq!(center(&g, "b"), Point::new(10.0, 65.0));
    assert_eq!(center(&g, "c"), Point::new(10.0, 125.0));
    assert_eq!(g.graph().width, 20.0);
    assert_eq!(g.graph().height, 130.0);

    let points = &g.edge_between("a", "b").unwrap().points;
    assert_eq!(points, &vec![Point::new(10.0, 10.0), Point::new(10.0, 60.0)]);
}

#[test]
fn left_to_right_swaps_axes() {
    let mut g = graph(GraphLabel {
        rankdir: RankDir::LR,
        ..Default::default()
    });
    add_nodes(&mut g, &["a", "b", "c"]);
    add_edge(&mut g, "a", "b");
    add_edge(&mut g, "b", "c");
    layout(&mut g).unwrap();

    assert_eq!(center(&g, "a"), Point::new(10.0, 5.0));
    assert_eq!(center(&g, "b"), Point::new(80.0, 5.0));
    assert_eq!(center(&g, "c"), Point::new(150.0, 5.0));
    let a = g.node("a").unwrap();
    assert_eq!((a.width, a.height), (20.0, 10.0));
    assert_eq!(g.graph().width, 160.0);
    assert_eq!(g.graph().height, 10.0);
}

#[test]
fn bottom_to_top_mirrors_ranks() {
    let mut g = graph(GraphLabel {
        rankdir: RankDir::BT,
        ..Default::default()
    });
    add_nodes(&mut g, &["a", "b"]);
    add_edge(&mut g, "a", "b");
    layout(&mut g).unwrap();
    assert!(center(&g, "a").y > center(&g, "b").y);
}

#[test]
fn margins_offset_the_drawing() {
    let mut g = graph(GraphLabel {
        marginx: 10.0,
        marginy: 7.0,
        ..Default::default()
    });
    add_nodes(&mut g, &["a"]);
    layout(&mut g).unwrap();
    assert_eq!(center(&g, "a"), Point::new(20.0, 12.0));
    assert_eq!(g.graph().width, 40.0);
    assert_eq!(g.graph().height, 24.0);
}

#[test]
fn reversed_edges_keep_their_direction() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b"]);
    add_edge(&mut g, "a", "b");
    add_edge(&mut g, "b", "a");
    layout(&mut g).unwrap();

    assert!(center(&g, "a").y < center(&g, "b").y);
    let back = &g.edge_between("b", "a").unwrap().points;
    assert!(back.first().unwrap().y > back.last().unwrap().y);
    let forward = &g.edge_between("a", "b").unwrap().points;
    assert!(forward.first().unwrap().y < forward.last().unwrap().y);
}

#[test]
fn long_edges_bend_at_intermediate_ranks() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b", "c"]);
    add_edge(&mut g, "a", "b");
    add_edge(&mut g, "b", "c");
    add_edge(&mut g, "a", "c");
    layout(&mut g).unwrap();

    let points = &g.edge_between("a", "c").unwrap().points;
    assert_eq!(points.len(), 3);
    assert!((points[1].y - center(&g, "b").y).abs() < EPS);
    assert_eq!(g.node_count(), 3, "dummy nodes must not leak into the input graph");
}

#[test]
fn minlen_stretches_edges() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b"]);
    g.set_edge(
        "a",
        "b",
        EdgeLabel {
            minlen: 2,
            ..Default::default()
        },
    )
    .unwrap();
    layout(&mut g).unwrap();
    assert_eq!(g.node("a").unwrap().rank, Some(0));
    assert_eq!(g.node("b").unwrap().rank, Some(2));
}

#[test]
fn self_loops_are_drawn_on_the_right() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a"]);
    add_edge(&mut g, "a", "a");
    layout(&mut g).unwrap();

    let a = center(&g, "a");
    let points = &g.edge_between("a", "a").unwrap().points;
    assert_eq!(points.len(), 7);
    assert!(points.iter().all(|p| p.x >= a.x - EPS));
}

#[test]
fn barycenter_sweeps_remove_avoidable_crossings() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b", "c", "x", "y"]);
    add_edge(&mut g, "a", "x");
    add_edge(&mut g, "b", "y");
    add_edge(&mut g, "c", "x");
    layout(&mut g).unwrap();

    let x = |id: &str| center(&g, id).x;
    assert!(x("a") < x("c"));
    assert!(x("c") < x("b"));
    assert!(x("x") < x("y"));
}

#[test]
fn nodes_of_one_rank_never_overlap() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["r", "a", "b", "c", "d"]);
    for w in ["a", "b", "c", "d"] {
        add_edge(&mut g, "r", w);
    }
    layout(&mut g).unwrap();

    let mut xs: Vec<f64> = ["a", "b", "c", "d"].iter().map(|id| center(&g, id).x).collect();
    xs.sort_by(f64::total_cmp);
    for pair in xs.windows(2) {
        assert!(pair[1] - pair[0] >= 20.0 + 50.0 - EPS);
    }
    // The parent sits above the middle of its children.
    let mid = (xs[0] + xs[3]) / 2.0;
    assert!((center(&g, "r").x - mid).abs() < 1.0);
}

struct Box4 {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

fn bounds(g: &LayoutGraph, id: &str) -> Box4 {
    let n = g.node(id).unwrap();
    Box4 {
        left: n.x - n.width / 2.0,
        top: n.y - n.height / 2.0,
        right: n.x + n.width / 2.0,
        bottom: n.y + n.height / 2.0,
    }
}

fn contains_with_padding(outer: &Box4, inner: &Box4, padding: f64) -> bool {
    outer.left <= inner.left - padding + EPS
        && outer.top <= inner.top - padding + EPS
        && outer.right >= inner.right + padding - EPS
        && outer.bottom >= inner.bottom + padding - EPS
}

#[test]
fn clusters_enclose_their_members() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b", "c"]);
    g.set_node("group", NodeLabel::default());
    g.set_parent("a", Some("group")).unwrap();
    g.set_parent("b", Some("group")).unwrap();
    add_edge(&mut g, "a", "b");
    add_edge(&mut g, "c", "b");
    layout(&mut g).unwrap();

    let padding = g.graph().cluster_padding;
    let cluster = bounds(&g, "group");
    assert!(contains_with_padding(&cluster, &bounds(&g, "a"), padding));
    assert!(contains_with_padding(&cluster, &bounds(&g, "b"), padding));

    let c = bounds(&g, "c");
    assert!(c.right <= cluster.left + EPS || c.left >= cluster.right - EPS);
}

#[test]
fn nested_clusters_nest_their_boxes() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b", "c"]);
    g.set_node("outer", NodeLabel::default());
    g.set_node("inner", NodeLabel::default());
    g.set_parent("inner", Some("outer")).unwrap();
    g.set_parent("a", Some("inner")).unwrap();
    g.set_parent("b", Some("outer")).unwrap();
    add_edge(&mut g, "a", "b");
    add_edge(&mut g, "b", "c");
    layout(&mut g).unwrap();

    let padding = g.graph().cluster_padding;
    let outer = bounds(&g, "outer");
    let inner = bounds(&g, "inner");
    assert!(contains_with_padding(&outer, &inner, padding));
    assert!(contains_with_padding(&inner, &bounds(&g, "a"), padding));
    assert!(contains_with_padding(&outer, &bounds(&g, "b"), padding));
    let c = bounds(&g, "c");
    assert!(c.top >= outer.bottom - EPS);
}

#[test]
fn edges_may_not_touch_clusters() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b"]);
    g.set_node("group", NodeLabel::default());
    g.set_parent("a", Some("group")).unwrap();
    add_edge(&mut g, "group", "b");
    assert_eq!(
        layout(&mut g),
        Err(Error::EdgeToCluster {
            v: "group".into(),
            w: "b".into()
        })
    );
}

#[test]
fn graph_rejects_unknown_nodes_and_parent_cycles() {
    let mut g = graph(GraphLabel::default());
    add_nodes(&mut g, &["a", "b"]);
    assert_eq!(
        g.set_edge("a", "zz", EdgeLabel::default()),
        Err(Error::UnknownNode { id: "zz".into() })
    );
    g.set_parent("a", Some("b")).unwrap();
    assert!(matches!(
        g.set_parent("b", Some("a")),
        Err(Error::ParentCycle { .. })
    ));
}
