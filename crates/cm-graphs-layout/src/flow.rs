//! Flow chart layout: sizes nodes, runs the layered layout and post-processes its output.
//!
//! Post-processing clips edge endpoints to circular nodes, optionally stretches clusters over
//! the whole cross axis and stacks them by level, and anchors cluster labels.

use crate::axis::TextAnchor;
use crate::error::{Error, Result};
use crate::nodes::{self, LabelLines};
use cm_graphs_core::config::{
    ClusterLabelPosition, ClusterPosition, ClusterShape, FlowConfig, NodeShape, Orientation,
};
use cm_graphs_core::data::{ClusterDatum, ClusterLabelStyle, FlowData, FlowEdgeDatum, FlowNodeDatum};
use cm_graphs_core::geom::{Bounds, Point, Rect, Size};
use cm_graphs_core::text::TextMeasurer;
use narwhal::{EdgeKey, EdgeLabel, GraphLabel, GraphOptions, LayoutGraph, NodeLabel, RankDir};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeLayout {
    pub data: FlowNodeDatum,
    pub center: Point,
    pub size: Size,
    /// Translation of the node group, see [`nodes::node_origin`].
    pub origin: Point,
    pub label: LabelLines,
    pub label_offset: Point,
}

impl FlowNodeLayout {
    pub fn extent(&self) -> Rect {
        nodes::node_extent(&self.data.node, self.center, self.size, &self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdgeLayout {
    pub data: FlowEdgeDatum,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Baseline {
    Middle,
    TextBeforeEdge,
    TextAfterEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterLabelAnchor {
    pub point: Point,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLayout {
    pub data: ClusterDatum,
    /// Enclosing cluster, if this one is nested.
    pub parent: Option<String>,
    pub center: Point,
    pub size: Size,
    /// Top left corner for rectangles, center for ellipses.
    pub origin: Point,
    pub label: ClusterLabelAnchor,
}

impl ClusterLayout {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowLayout {
    pub nodes: Vec<FlowNodeLayout>,
    pub edges: Vec<FlowEdgeLayout>,
    pub clusters: Vec<ClusterLayout>,
}

impl FlowLayout {
    pub fn node(&self, id: &str) -> Option<&FlowNodeLayout> {
        self.nodes.iter().find(|n| n.data.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&ClusterLayout> {
        self.clusters.iter().find(|c| c.data.id == id)
    }

    /// Everything that gets drawn: nodes with their labels, clusters and edge polylines.
    pub fn bounds(&self) -> Option<Rect> {
        let boxes = self
            .nodes
            .iter()
            .map(FlowNodeLayout::extent)
            .chain(self.clusters.iter().map(ClusterLayout::rect));
        let points = self
            .edges
            .iter()
            .flat_map(|e| e.points.iter().map(|p| (p.x, p.y)));
        let boxes = Bounds::from_rects(boxes);
        let points = Bounds::from_points(points);
        match (boxes, points) {
            (Some(a), Some(b)) => Some(a.union(&b).to_rect()),
            (a, b) => a.or(b).map(|b| b.to_rect()),
        }
    }
}

/// Lays out the flow chart. No nodes gives an empty layout.
pub fn layout_flow(
    data: &FlowData,
    config: &FlowConfig,
    measurer: &dyn TextMeasurer,
) -> Result<FlowLayout> {
    if data.nodes.is_empty() {
        tracing::debug!("flow chart without nodes");
        return Ok(FlowLayout::default());
    }

    let mut g = LayoutGraph::new(GraphOptions {
        multigraph: true,
        compound: true,
    });
    g.set_graph(GraphLabel {
        rankdir: match config.orientation {
            Orientation::Vertical => RankDir::TB,
            Orientation::Horizontal => RankDir::LR,
        },
        nodesep: config.nodes.distance_between_brothers,
        ranksep: config.nodes.distance_between_parent_and_child,
        ..GraphLabel::default()
    });

    let mut labels = Vec::with_capacity(data.nodes.len());
    for n in &data.nodes {
        if g.has_node(&n.id) {
            return Err(Error::DuplicateId { id: n.id.clone() });
        }
        let label = nodes::wrap_label(&n.label, nodes::label_width(&n.node), measurer);
        let size = nodes::node_size(&n.node, &config.label.padding, &label);
        g.set_node(n.id.as_str(), NodeLabel::sized(size.width, size.height));
        labels.push(label);
    }
    for c in &data.clusters {
        if g.has_node(&c.id) {
            return Err(Error::DuplicateId { id: c.id.clone() });
        }
        g.set_node(c.id.as_str(), NodeLabel::default());
    }

    let parents = cluster_parents(&data.clusters);
    for (c, parent) in data.clusters.iter().zip(&parents.clusters) {
        if let Some(p) = parent {
            g.set_parent(&c.id, Some(data.clusters[*p].id.as_str()))?;
        }
    }
    for n in &data.nodes {
        if let Some(p) = parents.nodes.get(n.id.as_str()) {
            g.set_parent(&n.id, Some(data.clusters[*p].id.as_str()))?;
        }
    }
    for e in &data.edges {
        g.set_edge_named(&e.source, &e.target, Some(e.id.clone()), EdgeLabel::default())?;
    }

    narwhal::layout(&mut g)?;

    let placed = |id: &str| -> Result<&NodeLabel> {
        g.node(id).ok_or_else(|| Error::UnknownElement { id: id.to_string() })
    };

    let mut out = FlowLayout::default();
    for (n, label) in data.nodes.iter().zip(labels) {
        let p = placed(&n.id)?;
        out.nodes.push(FlowNodeLayout {
            data: n.clone(),
            center: Point::new(p.x, p.y),
            size: Size::new(p.width, p.height),
            origin: Point::default(),
            label,
            label_offset: Point::default(),
        });
    }

    let circles: FxHashMap<&str, (Point, f64)> = out
        .nodes
        .iter()
        .filter(|n| n.data.node.shape == NodeShape::Circle)
        .map(|n| (n.data.id.as_str(), (n.center, n.data.node.circle_radius)))
        .collect();
    for e in &data.edges {
        let key = EdgeKey::new(e.source.as_str(), e.target.as_str(), Some(e.id.clone()));
        let routed = g
            .edge(&key)
            .ok_or_else(|| Error::UnknownElement { id: e.id.clone() })?;
        let mut points: Vec<Point> = routed.points.iter().map(|p| Point::new(p.x, p.y)).collect();
        if let (Some(first), Some((center, r))) = (points.first_mut(), circles.get(e.source.as_str())) {
            *first = clip_to_circle(*first, *center, *r);
        }
        if let (Some(last), Some((center, r))) = (points.last_mut(), circles.get(e.target.as_str())) {
            *last = clip_to_circle(*last, *center, *r);
        }
        out.edges.push(FlowEdgeLayout {
            data: e.clone(),
            points,
        });
    }

    for (c, parent) in data.clusters.iter().zip(&parents.clusters) {
        let p = placed(&c.id)?;
        out.clusters.push(ClusterLayout {
            data: c.clone(),
            parent: parent.map(|i| data.clusters[i].id.clone()),
            center: Point::new(p.x, p.y),
            size: Size::new(p.width, p.height),
            origin: Point::default(),
            label: ClusterLabelAnchor {
                point: Point::default(),
                anchor: TextAnchor::Middle,
                baseline: Baseline::Middle,
            },
        });
    }

    if config.clusters.position == ClusterPosition::FullSpace && !out.clusters.is_empty() {
        adjust_full_space(
            &mut out,
            config.orientation,
            config.nodes.distance_between_parent_and_child,
        );
    }

    finish_anchors(&mut out, config.clusters.shape);
    tracing::debug!(
        nodes = out.nodes.len(),
        edges = out.edges.len(),
        clusters = out.clusters.len(),
        "flow layout"
    );
    Ok(out)
}

struct ClusterParents<'a> {
    /// Per cluster, the index of the cluster it is nested in.
    clusters: Vec<Option<usize>>,
    /// Per node, the index of the innermost cluster listing it.
    nodes: FxHashMap<&'a str, usize>,
}

/// Builds the cluster hierarchy.
///
/// A cluster is nested in another when the other lists every one of its nodes and more. The
/// parent is the smallest such cluster, the first declared on ties. A node belongs to the
/// smallest cluster that lists it.
fn cluster_parents(clusters: &[ClusterDatum]) -> ClusterParents<'_> {
    let members: Vec<FxHashSet<&str>> = clusters
        .iter()
        .map(|c| c.nodes.iter().map(String::as_str).collect())
        .collect();

    let parents = (0..clusters.len())
        .map(|a| {
            (0..clusters.len())
                .filter(|&b| {
                    b != a
                        && members[b].len() > members[a].len()
                        && members[a].iter().all(|n| members[b].contains(n))
                })
                .min_by_key(|&b| (members[b].len(), b))
        })
        .collect();

    let mut nodes: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, set) in members.iter().enumerate() {
        for n in set {
            let smaller = nodes
                .get(n)
                .is_none_or(|&cur| (set.len(), i) < (members[cur].len(), cur));
            if smaller {
                nodes.insert(n, i);
            }
        }
    }

    ClusterParents {
        clusters: parents,
        nodes,
    }
}

/// Moves an edge endpoint lying off the center of a circle onto its border, along the ray from
/// the center through the endpoint. Endpoints aligned with the center on either axis are kept.
pub fn clip_to_circle(point: Point, center: Point, radius: f64) -> Point {
    if point.x == center.x || point.y == center.y {
        return point;
    }
    let d = point.distance(&center);
    let (sin, cos) = ((point.y - center.y) / d, (point.x - center.x) / d);
    Point::new(center.x + radius * cos, center.y + radius * sin)
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    fn of_mut(self, p: &mut Point) -> &mut f64 {
        match self {
            Axis::X => &mut p.x,
            Axis::Y => &mut p.y,
        }
    }

    fn extent(self, s: Size) -> f64 {
        match self {
            Axis::X => s.width,
            Axis::Y => s.height,
        }
    }

    fn extent_mut(self, s: &mut Size) -> &mut f64 {
        match self {
            Axis::X => &mut s.width,
            Axis::Y => &mut s.height,
        }
    }
}

/// Stretches every cluster over the whole cross axis and stacks clusters by level along the
/// rank axis, `gap` apart.
///
/// Clusters are taken in ascending `level`. A cluster is moved right after the previous one
/// when it overlaps it, lies before it, or is further than `gap` from it. Its member nodes move
/// with it. An edge into a moved cluster moves with it as well: edges starting inside the
/// cluster shift every point past the old cluster start; edges from outside shift every point
/// but the first, which stays put unless their source was moved by an earlier cluster, in which
/// case it follows the source.
pub fn adjust_full_space(layout: &mut FlowLayout, orientation: Orientation, gap: f64) {
    let (main, cross) = match orientation {
        Orientation::Vertical => (Axis::Y, Axis::X),
        Orientation::Horizontal => (Axis::X, Axis::Y),
    };
    layout
        .clusters
        .sort_by(|a, b| a.data.cluster.level.total_cmp(&b.data.cluster.level));

    let spans = layout
        .nodes
        .iter()
        .map(|n| (n.center, n.size))
        .chain(layout.clusters.iter().map(|c| (c.center, c.size)));
    let (lo, hi) = spans.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (c, s)| {
        let half = cross.extent(s) / 2.0;
        (lo.min(cross.of(c) - half), hi.max(cross.of(c) + half))
    });

    let mut moved: FxHashMap<String, f64> = FxHashMap::default();
    let mut previous: Option<(f64, f64)> = None;
    for cluster in &mut layout.clusters {
        *cross.of_mut(&mut cluster.center) = (lo + hi) / 2.0;
        *cross.extent_mut(&mut cluster.size) = hi - lo;

        let extent = main.extent(cluster.size);
        let start = main.of(cluster.center) - extent / 2.0;
        let before = main.of(cluster.center);
        let shifted = previous.is_some_and(|(prev_start, prev_extent)| {
            let prev_end = prev_start + prev_extent;
            let overlaps = start <= prev_end && start + extent >= prev_start;
            overlaps || start - prev_end > gap || start + extent <= prev_start
        });
        if let (true, Some((prev_start, prev_extent))) = (shifted, previous) {
            *main.of_mut(&mut cluster.center) = prev_start + prev_extent + gap + extent / 2.0;
        }
        previous = Some((main.of(cluster.center) - extent / 2.0, extent));
        if !shifted {
            continue;
        }

        let delta = main.of(cluster.center) - before;
        tracing::trace!(cluster = %cluster.data.id, delta, "full-space shift");
        let members: FxHashSet<&str> = cluster.data.nodes.iter().map(String::as_str).collect();
        for node in layout
            .nodes
            .iter_mut()
            .filter(|n| members.contains(n.data.id.as_str()))
        {
            *main.of_mut(&mut node.center) += delta;
            if delta != 0.0 {
                *moved.entry(node.data.id.clone()).or_default() += delta;
            }
        }

        let threshold = start;
        for edge in layout
            .edges
            .iter_mut()
            .filter(|e| members.contains(e.data.target.as_str()))
        {
            let inside = members.contains(edge.data.source.as_str());
            let source_delta = if inside {
                None
            } else {
                moved.get(&edge.data.source).copied()
            };
            for (index, p) in edge.points.iter_mut().enumerate() {
                let v = main.of_mut(p);
                if inside {
                    if *v >= threshold {
                        *v += delta;
                    }
                } else if index > 0 {
                    *v += delta;
                } else if let Some(d) = source_delta {
                    *v += d;
                }
            }
        }
    }
}

fn finish_anchors(layout: &mut FlowLayout, shape: ClusterShape) {
    for n in &mut layout.nodes {
        n.origin = nodes::node_origin(n.data.node.shape, n.center, n.size);
        n.label_offset = nodes::label_offset(&n.data.node, n.size, &n.label);
    }
    for c in &mut layout.clusters {
        c.origin = match shape {
            ClusterShape::Rectangle => Point::new(
                c.center.x - c.size.width / 2.0,
                c.center.y - c.size.height / 2.0,
            ),
            ClusterShape::Ellipse => c.center,
        };
        c.label = cluster_label_anchor(c.center, c.size, &c.data.cluster.label);
    }
}

/// Absolute anchor of a cluster label. Rectangles and ellipses share their bounding box, so the
/// anchor only depends on the label position.
pub fn cluster_label_anchor(center: Point, size: Size, style: &ClusterLabelStyle) -> ClusterLabelAnchor {
    use ClusterLabelPosition as P;
    let pad = &style.padding;
    let (half_w, half_h) = (size.width / 2.0, size.height / 2.0);
    let (x, anchor) = match style.position {
        P::Center | P::Top | P::Bottom => (center.x, TextAnchor::Middle),
        P::Left | P::TopLeft | P::BottomLeft => (center.x - half_w + pad.left, TextAnchor::Start),
        P::Right | P::TopRight | P::BottomRight => (center.x + half_w - pad.right, TextAnchor::End),
    };
    let (y, baseline) = match style.position {
        P::Center | P::Left | P::Right => (center.y, Baseline::Middle),
        P::Bottom | P::BottomLeft | P::BottomRight => {
            (center.y + half_h - pad.bottom, Baseline::TextAfterEdge)
        }
        P::Top | P::TopLeft | P::TopRight => (center.y - half_h + pad.top, Baseline::TextBeforeEdge),
    };
    ClusterLabelAnchor {
        point: Point::new(x, y),
        anchor,
        baseline,
    }
}
