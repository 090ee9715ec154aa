#![forbid(unsafe_code)]

//! Layered layout for compound directed graphs.
//!
//! [`layout`] assigns a center and a size to every node, a box to every cluster (a node with
//! children) and a polyline to every edge. The stages run on a private working copy of the
//! input graph:
//!
//! 1. orient the graph top to bottom ([`coordinate_system`]),
//! 2. reverse back edges ([`acyclic`]) and rank the leaves ([`rank`]),
//! 3. split long edges into dummy chains ([`normalize`]) and add cluster borders ([`border`]),
//! 4. order every rank ([`order`]) and assign coordinates ([`position`]),
//! 5. restore edges, orientation and cycles, then copy the results back.

pub mod acyclic;
pub mod border;
pub mod coordinate_system;
pub mod error;
pub mod graph;
pub mod model;
pub mod normalize;
pub mod order;
pub mod position;
pub mod rank;
pub mod util;

pub use error::{Error, Result};
pub use graph::{EdgeKey, Graph, GraphOptions};
pub use model::{DummyKind, EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir};

/// Lays out `g` in place.
///
/// Leaf nodes keep their size and receive `x`/`y` centers. Clusters receive a center and a size
/// enclosing their members plus `cluster_padding`. Every edge receives `points` from the border
/// of its source to the border of its target. The graph label receives the total `width` and
/// `height`, margins included.
pub fn layout(g: &mut LayoutGraph) -> Result<()> {
    let mut work = build_layout_graph(g)?;
    run_layout(&mut work)?;
    update_input_graph(g, &work);
    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        width = g.graph().width,
        height = g.graph().height,
        "graph layout done"
    );
    Ok(())
}

fn build_layout_graph(input: &LayoutGraph) -> Result<LayoutGraph> {
    let mut g = LayoutGraph::new(GraphOptions {
        multigraph: true,
        compound: true,
    });
    g.set_graph(input.graph().clone());
    for (id, n) in input.nodes() {
        g.set_node(id, NodeLabel::sized(n.width, n.height));
    }
    for (id, _) in input.nodes() {
        if let Some(parent) = input.parent(id) {
            g.set_parent(id, Some(parent))?;
        }
    }
    for (i, (key, e)) in input.edges().enumerate() {
        if g.is_cluster(&key.v) || g.is_cluster(&key.w) {
            return Err(Error::EdgeToCluster {
                v: key.v.clone(),
                w: key.w.clone(),
            });
        }
        g.set_edge_named(
            &key.v,
            &key.w,
            Some(i.to_string()),
            EdgeLabel {
                minlen: e.minlen.max(1),
                weight: e.weight,
                forward: Some(key.clone()),
                ..Default::default()
            },
        )?;
    }
    Ok(g)
}

fn run_layout(g: &mut LayoutGraph) -> Result<()> {
    coordinate_system::adjust(g);
    let self_loops = remove_self_loops(g);
    acyclic::run(g);
    rank::run(g);
    let chains = normalize::run(g)?;
    let borders = border::run(g)?;
    let layers = order::run(g, &borders);
    position::run(g, &layers, &borders);
    position::cluster_boxes(g, &borders);
    restore_self_loops(g, self_loops)?;
    border::undo(g, &borders);
    normalize::undo(g, chains)?;
    coordinate_system::undo(g);
    translate(g);
    assign_node_intersects(g);
    acyclic::undo(g);
    Ok(())
}

fn remove_self_loops(g: &mut LayoutGraph) -> Vec<(EdgeKey, EdgeLabel)> {
    g.edge_keys()
        .into_iter()
        .filter(EdgeKey::is_self_loop)
        .filter_map(|key| g.remove_edge(&key).map(|label| (key, label)))
        .collect()
}

/// Self loops leave the right side of their node and come back below the exit point.
fn restore_self_loops(g: &mut LayoutGraph, loops: Vec<(EdgeKey, EdgeLabel)>) -> Result<()> {
    let dx = g.graph().nodesep / 2.0;
    for (key, mut label) in loops {
        let Some(n) = g.node(&key.v) else {
            continue;
        };
        let x = n.x + n.width / 2.0;
        let (y, dy) = (n.y, n.height / 2.0);
        label.points = vec![
            Point::new(x + 2.0 * dx / 3.0, y - dy),
            Point::new(x + 5.0 * dx / 6.0, y - dy),
            Point::new(x + dx, y),
            Point::new(x + 5.0 * dx / 6.0, y + dy),
            Point::new(x + 2.0 * dx / 3.0, y + dy),
        ];
        g.set_edge_named(&key.v, &key.w, key.name.clone(), label)?;
    }
    Ok(())
}

fn translate(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (_, n) in g.nodes() {
        min_x = min_x.min(n.x - n.width / 2.0);
        max_x = max_x.max(n.x + n.width / 2.0);
        min_y = min_y.min(n.y - n.height / 2.0);
        max_y = max_y.max(n.y + n.height / 2.0);
    }
    for (_, e) in g.edges() {
        for p in &e.points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }
    if !min_x.is_finite() {
        (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
    }

    let (marginx, marginy) = (g.graph().marginx, g.graph().marginy);
    let (dx, dy) = (marginx - min_x, marginy - min_y);
    g.for_each_node_mut(|_, n| {
        n.x += dx;
        n.y += dy;
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
    });
    let label = g.graph_mut();
    label.width = max_x - min_x + 2.0 * marginx;
    label.height = max_y - min_y + 2.0 * marginy;
}

/// Prepends and appends the points where each edge crosses the boxes of its endpoints.
fn assign_node_intersects(g: &mut LayoutGraph) {
    let boxes: rustc_hash::FxHashMap<String, (Point, f64, f64)> = g
        .nodes()
        .map(|(id, n)| (id.to_string(), (Point::new(n.x, n.y), n.width, n.height)))
        .collect();
    g.for_each_edge_mut(|key, e| {
        let (Some(&(vc, vw, vh)), Some(&(wc, ww, wh))) = (boxes.get(&key.v), boxes.get(&key.w))
        else {
            return;
        };
        let first = e.points.first().copied().unwrap_or(wc);
        let last = e.points.last().copied().unwrap_or(vc);
        e.points.insert(0, util::intersect_rect(vc, vw, vh, first));
        e.points.push(util::intersect_rect(wc, ww, wh, last));
    });
}

fn update_input_graph(input: &mut LayoutGraph, work: &LayoutGraph) {
    input.for_each_node_mut(|id, n| {
        if let Some(laid) = work.node(id) {
            n.x = laid.x;
            n.y = laid.y;
            n.width = laid.width;
            n.height = laid.height;
            n.rank = laid.rank;
            n.order = laid.order;
            n.min_rank = laid.min_rank;
            n.max_rank = laid.max_rank;
        }
    });
    for (_, e) in work.edges() {
        let Some(forward) = &e.forward else {
            continue;
        };
        if let Some(target) = input.edge_mut(forward) {
            target.points = e.points.clone();
        }
    }
    let (width, height) = (work.graph().width, work.graph().height);
    let label = input.graph_mut();
    label.width = width;
    label.height = height;
}
