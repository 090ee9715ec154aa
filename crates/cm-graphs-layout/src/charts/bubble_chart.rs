//! Zoomable circle packing.
//!
//! The chart always shows one focused node filling the graph area. Clicking a node with
//! children focuses it; clicking the background or a leaf circle focuses the root again.
//! Expandable charts reveal the children of a node only once it is focused, and hide them
//! again when the focus moves back up.

use super::{
    Chart, ChartEvent, EventDispatcher, LayoutOptions, Scalable, empty_viewport, fit_viewport,
};
use crate::container::container_layout;
use crate::error::{Error, Result};
use crate::hierarchy::pack::pack;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::model::{BubbleChartLayout, BubbleNodeLayout, ChartLayout, FocusZoom};
use crate::viewport::{
    LayoutClock, TRANSITION_DURATION, View, ZoomTransform, transform_for_view,
};
use cm_graphs_core::color::DepthColorScale;
use cm_graphs_core::config::{BubbleConfig, ChartKind};
use cm_graphs_core::data::BubbleDatum;
use cm_graphs_core::geom::{Point, Rect, Size};

/// Gap between sibling circles.
pub const PACK_PADDING: f64 = 3.0;

#[derive(Debug)]
pub struct BubbleChart {
    config: BubbleConfig,
    root: Option<BubbleDatum>,
    size: Size,
    graph: Size,
    clock: LayoutClock,
    events: EventDispatcher,
    hierarchy: Option<Hierarchy<BubbleDatum>>,
    colors: Option<DepthColorScale>,
    focus: NodeId,
    view: View,
    transform: ZoomTransform,
    layout: BubbleChartLayout,
}

impl BubbleChart {
    /// The first record is the root; further roots are ignored.
    pub fn new(
        config: BubbleConfig,
        data: Vec<BubbleDatum>,
        size: Size,
        _options: LayoutOptions,
    ) -> Result<Self> {
        if data.len() > 1 {
            tracing::warn!(roots = data.len(), "bubble chart uses the first root only");
        }
        let container = container_layout(size, &config.base.margin, None, None);
        let mut chart = Self {
            root: data.into_iter().next(),
            size,
            graph: container.graph_size(),
            clock: LayoutClock::default(),
            events: EventDispatcher::default(),
            hierarchy: None,
            colors: None,
            focus: NodeId::default(),
            view: [0.0, 0.0, 0.0],
            transform: ZoomTransform::IDENTITY,
            layout: BubbleChartLayout {
                generation: 0,
                container,
                nodes: Vec::new(),
                focus: String::new(),
                view: [0.0, 0.0, 0.0],
                transform: ZoomTransform::IDENTITY,
                label_scale: 1.0,
                zoom: None,
                viewport: empty_viewport(size),
            },
            config,
        };
        chart.rebuild(None)?;
        Ok(chart)
    }

    pub fn layout(&self) -> &BubbleChartLayout {
        &self.layout
    }

    /// Packs the data into the current graph area and focuses `focus` (or the root) without
    /// animation.
    fn rebuild(&mut self, focus: Option<String>) -> Result<u64> {
        let container = container_layout(self.size, &self.config.base.margin, None, None);
        self.graph = container.graph_size();
        self.layout.container = container;
        let Some(root) = &self.root else {
            self.hierarchy = None;
            let generation = self.clock.begin();
            self.layout.generation = generation;
            return Ok(generation);
        };

        let mut h = Hierarchy::from_nested(root, |d: &BubbleDatum| BubbleDatum {
            id: d.id.clone(),
            label: d.label.clone(),
            value: d.value,
            node: d.node.clone(),
            extra_data: d.extra_data.clone(),
            children: Vec::new(),
        });
        h.sum(|d| d.value.unwrap_or(0.0));
        h.sort_by_value_desc();
        pack(&mut h, self.graph, PACK_PADDING);
        let nodes = &self.config.nodes;
        if nodes.expandable && nodes.max_initial_expanded_level > 0 {
            h.collapse_from_depth(nodes.max_initial_expanded_level);
        }
        self.colors = Some(DepthColorScale::new(
            &nodes.background_start_color,
            &nodes.background_end_color,
            h.height() + 1,
        )?);
        let root_id = h.root();
        let r = h.node(root_id);
        self.view = [r.x, r.y, 2.0 * r.r];
        self.focus = root_id;
        let target = focus.and_then(|id| h.find(|d| d.id == id));
        self.hierarchy = Some(h);

        match target {
            Some(target) if target != root_id => self.activate(target, false),
            _ => Ok(self.focus_on(root_id, false)),
        }
    }

    /// Click on a node circle. `None`, and leaves, stand for the background.
    pub fn click(&mut self, id: Option<&str>) -> Result<()> {
        let Some(h) = &self.hierarchy else {
            return match id {
                Some(id) => Err(Error::UnknownElement { id: id.to_string() }),
                None => Ok(()),
            };
        };
        let target = match id {
            Some(id) => {
                let node = self.find(id)?;
                let n = h.node(node);
                if n.has_children() || n.is_collapsed() {
                    node
                } else {
                    h.root()
                }
            }
            None => h.root(),
        };
        self.activate(target, true)?;
        Ok(())
    }

    /// Click on a node label; labels of leaves are clickable too.
    pub fn click_label(&mut self, id: &str) -> Result<()> {
        let node = self.find(id)?;
        self.activate(node, true)?;
        Ok(())
    }

    fn find(&self, id: &str) -> Result<NodeId> {
        self.hierarchy
            .as_ref()
            .and_then(|h| h.find(|d| d.id == id))
            .ok_or_else(|| Error::UnknownElement { id: id.to_string() })
    }

    fn activate(&mut self, target: NodeId, animate: bool) -> Result<u64> {
        let focus = self.focus;
        let expandable = self.config.nodes.expandable;
        let level = self.config.nodes.max_initial_expanded_level;
        let Some(h) = &mut self.hierarchy else {
            return Ok(self.clock.current());
        };
        if expandable && focus != target {
            let (focus_depth, focus_open) = {
                let f = h.node(focus);
                (f.depth, f.has_children())
            };
            if focus_depth >= level && h.node(target).depth <= focus_depth && focus_open {
                h.collapse(focus);
            }
            h.expand(target);
            Ok(self.focus_on(target, animate))
        } else if h.node(target).has_children() && focus != target {
            Ok(self.focus_on(target, animate))
        } else {
            if self.config.events.click_on_element {
                let record = serde_json::to_value(&h.node(target).data)?;
                self.events.dispatch(ChartEvent::ClickOnElement {
                    chart: ChartKind::BubbleChart,
                    record,
                });
            }
            Ok(self.clock.current())
        }
    }

    /// Moves the focus to `target` and recomputes the visible nodes.
    fn focus_on(&mut self, target: NodeId, animate: bool) -> u64 {
        let generation = self.clock.begin();
        let Some(h) = &self.hierarchy else {
            return generation;
        };
        let half = (self.graph.width / 2.0, self.graph.height / 2.0);
        let root = h.root();
        let nodes: Vec<BubbleNodeLayout> = h
            .descendants(root)
            .into_iter()
            .skip(1)
            .map(|id| {
                let n = h.node(id);
                let parent = n.parent.unwrap_or(root);
                BubbleNodeLayout {
                    id: n.data.id.clone(),
                    label: n.data.label.clone(),
                    depth: n.depth,
                    parent: h.node(parent).data.id.clone(),
                    center: Point::new(n.x - half.0, n.y - half.1),
                    r: n.r,
                    fill: self
                        .colors
                        .map_or_else(String::new, |c| c.color(n.depth)),
                    stroke_color_on_hover: n.data.node.stroke_color_on_hover.clone(),
                    clickable: n.has_children() || n.is_collapsed(),
                    label_visible: parent == target,
                }
            })
            .collect();

        let t = h.node(target);
        let to: View = [t.x, t.y, 2.0 * t.r];
        let from = self.view;
        self.view = to;
        self.focus = target;
        let transform = transform_for_view(to, self.graph, self.size);
        let r = h.node(root);
        let circle = Rect::new(r.x - r.r - half.0, r.y - r.r - half.1, 2.0 * r.r, 2.0 * r.r);
        let viewport = fit_viewport(
            Some(circle),
            self.size,
            &self.config.base,
            self.config.zoom.as_ref(),
            None,
            &mut self.transform,
            generation,
            0.0,
        );
        tracing::debug!(
            generation,
            focus = %t.data.id,
            visible = nodes.len(),
            k = transform.k,
            "bubble focus"
        );
        self.layout = BubbleChartLayout {
            generation,
            container: self.layout.container,
            focus: t.data.id.clone(),
            nodes,
            view: to,
            transform,
            label_scale: if transform.k.is_finite() && transform.k != 0.0 {
                1.0 / transform.k
            } else {
                1.0
            },
            zoom: Some(FocusZoom {
                generation,
                from,
                to,
                duration: if animate { TRANSITION_DURATION } else { 0.0 },
            }),
            viewport,
        };
        generation
    }
}

impl Chart for BubbleChart {
    fn kind(&self) -> ChartKind {
        ChartKind::BubbleChart
    }

    fn snapshot(&self) -> ChartLayout {
        ChartLayout::BubbleChart(self.layout.clone())
    }

    fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    fn clock(&self) -> &LayoutClock {
        &self.clock
    }
}

impl Scalable for BubbleChart {
    /// Packs again for the new size and restores the focused node without animation.
    fn resize(&mut self, size: Size) -> Result<u64> {
        self.size = size;
        let focus = (!self.layout.focus.is_empty()).then(|| self.layout.focus.clone());
        self.rebuild(focus)
    }

    fn container_size(&self) -> Size {
        self.size
    }
}
