//! Collapsible tree chart.

use super::{
    Chart, ChartEvent, EventDispatcher, LayoutOptions, Scalable, Zoomable, empty_viewport,
    fit_viewport, pass_duration,
};
use crate::container::container_layout;
use crate::error::{Error, Result};
use crate::hierarchy::tree::tidy_tree;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::model::{ChartLayout, TreeChartLayout, TreeLinkLayout, TreeNodeLayout};
use crate::nodes::{
    LabelLines, label_offset, label_width, node_extent, node_origin, node_size, wrap_label,
};
use crate::viewport::{LayoutClock, ZoomState, ZoomTransform};
use cm_graphs_core::config::{ChartKind, Orientation, TreeConfig};
use cm_graphs_core::data::TreeDatum;
use cm_graphs_core::geom::{Bounds, Point, Size};
use rustc_hash::FxHashSet;

/// Straight part of a link at each end, where the arrow marker sits.
pub const LINK_STUB: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
struct TreeNodeData {
    /// The record without its children.
    record: TreeDatum,
    label: LabelLines,
    size: Size,
}

#[derive(Debug)]
pub struct TreeChart {
    config: TreeConfig,
    size: Size,
    clock: LayoutClock,
    events: EventDispatcher,
    hierarchy: Option<Hierarchy<TreeNodeData>>,
    /// Largest node box; every node gets a slot of this size.
    node_max: Size,
    transform: ZoomTransform,
    zoom: Option<ZoomState>,
    layout: TreeChartLayout,
}

impl TreeChart {
    /// The first record is the root; further roots are ignored.
    pub fn new(
        config: TreeConfig,
        data: Vec<TreeDatum>,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        let measurer = &*options.text_measurer;
        let mut hierarchy = data.first().map(|root| {
            Hierarchy::from_nested(root, |d: &TreeDatum| {
                let label = wrap_label(&d.label, label_width(&d.node), measurer);
                TreeNodeData {
                    record: TreeDatum {
                        id: d.id.clone(),
                        label: d.label.clone(),
                        value: d.value,
                        node: d.node.clone(),
                        link: d.link.clone(),
                        extra_data: d.extra_data.clone(),
                        children: Vec::new(),
                    },
                    size: node_size(&d.node, &config.label.padding, &label),
                    label,
                }
            })
        });
        if data.len() > 1 {
            tracing::warn!(roots = data.len(), "tree chart uses the first root only");
        }
        let node_max = hierarchy.as_ref().map_or(Size::default(), |h| {
            h.all_descendants(h.root()).into_iter().fold(Size::default(), |acc, id| {
                let s = h.node(id).data.size;
                Size::new(acc.width.max(s.width), acc.height.max(s.height))
            })
        });
        let level = config.nodes.max_initial_expanded_level;
        if let Some(h) = &mut hierarchy {
            if config.nodes.expandable && level > 0 {
                let collapsed = h.collapse_from_depth(level);
                tracing::debug!(level, collapsed, "initial collapse");
            }
        }
        let zoom = config.zoom.as_ref().map(|z| ZoomState::new(Some(z)));
        let container = container_layout(size, &config.base.margin, None, None);
        let mut chart = Self {
            config,
            size,
            clock: LayoutClock::default(),
            events: EventDispatcher::default(),
            hierarchy,
            node_max,
            transform: ZoomTransform::IDENTITY,
            zoom,
            layout: TreeChartLayout {
                generation: 0,
                container,
                nodes: Vec::new(),
                links: Vec::new(),
                entering: Vec::new(),
                exiting: Vec::new(),
                source: None,
                viewport: empty_viewport(size),
                zoom: None,
            },
        };
        chart.relayout(false, None)?;
        Ok(chart)
    }

    pub fn layout(&self) -> &TreeChartLayout {
        &self.layout
    }

    /// `source` is the node an expand or collapse started from.
    fn relayout(&mut self, animate: bool, source: Option<Point>) -> Result<u64> {
        let generation = self.clock.begin();
        let container = container_layout(self.size, &self.config.base.margin, None, None);
        let (nodes, links) = match &mut self.hierarchy {
            Some(h) => layout_tree(h, &self.config, self.node_max),
            None => (Vec::new(), Vec::new()),
        };

        let (entering, exiting) = if source.is_some() {
            let before: FxHashSet<&str> =
                self.layout.nodes.iter().map(|n| n.id.as_str()).collect();
            let after: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
            (
                nodes
                    .iter()
                    .filter(|n| !before.contains(n.id.as_str()))
                    .map(|n| n.id.clone())
                    .collect(),
                self.layout
                    .nodes
                    .iter()
                    .filter(|n| !after.contains(n.id.as_str()))
                    .map(|n| n.id.clone())
                    .collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let content = Bounds::from_rects(
            nodes
                .iter()
                .map(|n| node_extent(&n.node, n.center, n.size, &n.label_lines)),
        )
        .map(|b| b.to_rect());
        let viewport = fit_viewport(
            content,
            self.size,
            &self.config.base,
            self.config.zoom.as_ref(),
            self.zoom.as_mut(),
            &mut self.transform,
            generation,
            pass_duration(animate),
        );
        tracing::debug!(
            generation,
            nodes = nodes.len(),
            entering = entering.len(),
            exiting = exiting.len(),
            "tree layout"
        );
        self.layout = TreeChartLayout {
            generation,
            container,
            nodes,
            links,
            entering,
            exiting,
            source,
            viewport,
            zoom: self.zoom,
        };
        Ok(generation)
    }

    fn find(&self, id: &str) -> Result<NodeId> {
        self.hierarchy
            .as_ref()
            .and_then(|h| h.find(|d| d.record.id == id))
            .ok_or_else(|| Error::UnknownElement { id: id.to_string() })
    }

    /// Expands or collapses an expandable node, otherwise reports the click.
    pub fn click(&mut self, id: &str) -> Result<()> {
        let node_id = self.find(id)?;
        let Some(h) = &mut self.hierarchy else {
            return Ok(());
        };
        let node = h.node(node_id);
        if self.config.nodes.expandable && (node.has_children() || node.is_collapsed()) {
            let source = self
                .layout
                .nodes
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.center);
            h.toggle(node_id);
            self.relayout(true, source.or(Some(Point::default())))?;
        } else if self.config.events.click_on_element {
            let record = serde_json::to_value(&node.data.record)?;
            self.events.dispatch(ChartEvent::ClickOnElement {
                chart: ChartKind::Tree,
                record,
            });
        }
        Ok(())
    }
}

/// Positions the visible nodes and the links between them.
fn layout_tree(
    h: &mut Hierarchy<TreeNodeData>,
    config: &TreeConfig,
    node_max: Size,
) -> (Vec<TreeNodeLayout>, Vec<TreeLinkLayout>) {
    let vertical = config.orientation == Orientation::Vertical;
    let (breadth, depth_size) = if vertical {
        (node_max.width, node_max.height)
    } else {
        (node_max.height, node_max.width)
    };
    let unit = if breadth > 0.0 { breadth } else { 1.0 };
    let nodes_config = &config.nodes;
    tidy_tree(h, [unit, depth_size], |same_parent| {
        if same_parent {
            (breadth + nodes_config.distance_between_brothers) / unit
        } else {
            (breadth + nodes_config.distance_between_cousins) / unit
        }
    });
    let level_step = nodes_config.distance_between_parent_and_child + depth_size;
    let center_of = |x: f64, depth: usize| {
        let d = depth as f64 * level_step;
        if vertical {
            Point::new(x, d)
        } else {
            Point::new(d, x)
        }
    };

    let visible = h.descendants(h.root());
    let nodes: Vec<TreeNodeLayout> = visible
        .iter()
        .map(|&id| {
            let n = h.node(id);
            let style = &n.data.record.node;
            let center = center_of(n.x, n.depth);
            let expandable = n.has_children() || n.is_collapsed();
            TreeNodeLayout {
                id: n.data.record.id.clone(),
                label: n.data.record.label.clone(),
                depth: n.depth,
                parent: n.parent.map(|p| h.node(p).data.record.id.clone()),
                collapsed: n.is_collapsed(),
                clickable: (nodes_config.expandable && expandable)
                    || config.events.click_on_element,
                fill: if n.is_collapsed() {
                    style.collapsed_color.clone()
                } else {
                    style.expanded_color.clone()
                },
                node: style.clone(),
                center,
                size: n.data.size,
                origin: node_origin(style.shape, center, n.data.size),
                label_lines: n.data.label.clone(),
                label_offset: label_offset(style, n.data.size, &n.data.label),
            }
        })
        .collect();

    let arrow = config.links.arrow.then_some(config.links.arrow_direction);
    let links = visible
        .iter()
        .filter_map(|&id| {
            let child = h.node(id);
            let parent = h.node(child.parent?);
            let s = center_of(parent.x, parent.depth);
            let e = center_of(child.x, child.depth);
            Some(TreeLinkLayout {
                source: parent.data.record.id.clone(),
                target: child.data.record.id.clone(),
                points: link_points(s, parent.data.size, e, child.data.size, vertical),
                link: child.data.record.link.clone(),
                arrow,
            })
        })
        .collect();
    (nodes, links)
}

/// Link from the far side of the parent to the near side of the child: a straight stub at each
/// end joined by a cubic curve whose control points sit a third of the way down.
fn link_points(
    source: Point,
    source_size: Size,
    target: Point,
    target_size: Size,
    vertical: bool,
) -> [Point; 6] {
    if vertical {
        let s = Point::new(source.x, source.y + source_size.height / 2.0);
        let e = Point::new(target.x, target.y - target_size.height / 2.0);
        let third = (2.0 * s.y + e.y) / 3.0;
        [
            s,
            Point::new(s.x, s.y + LINK_STUB),
            Point::new(s.x, third),
            Point::new(e.x, third),
            Point::new(e.x, e.y - LINK_STUB),
            e,
        ]
    } else {
        let s = Point::new(source.x + source_size.width / 2.0, source.y);
        let e = Point::new(target.x - target_size.width / 2.0, target.y);
        let third = (2.0 * s.x + e.x) / 3.0;
        [
            s,
            Point::new(s.x + LINK_STUB, s.y),
            Point::new(third, s.y),
            Point::new(third, e.y),
            Point::new(e.x - LINK_STUB, e.y),
            e,
        ]
    }
}

impl Chart for TreeChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Tree
    }

    fn snapshot(&self) -> ChartLayout {
        ChartLayout::Tree(self.layout.clone())
    }

    fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    fn clock(&self) -> &LayoutClock {
        &self.clock
    }
}

impl Scalable for TreeChart {
    fn resize(&mut self, size: Size) -> Result<u64> {
        self.size = size;
        self.relayout(false, None)
    }

    fn container_size(&self) -> Size {
        self.size
    }
}

impl Zoomable for TreeChart {
    fn zoom_state(&self) -> Option<&ZoomState> {
        self.zoom.as_ref()
    }

    fn zoom_state_mut(&mut self) -> Option<&mut ZoomState> {
        self.zoom.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_links_mirror_vertical_ones() {
        let size = Size::new(20.0, 10.0);
        let v = link_points(Point::new(0.0, 0.0), size, Point::new(30.0, 90.0), size, true);
        let h = link_points(
            Point::new(0.0, 0.0),
            Size::new(10.0, 20.0),
            Point::new(90.0, 30.0),
            Size::new(10.0, 20.0),
            false,
        );
        for (a, b) in v.iter().zip(&h) {
            assert_eq!(a.swapped(), *b);
        }
        assert_eq!(v[0], Point::new(0.0, 5.0));
        assert_eq!(v[2].y, (2.0 * 5.0 + 85.0) / 3.0);
    }
}
