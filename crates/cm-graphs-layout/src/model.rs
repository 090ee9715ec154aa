use crate::axis::{AxisLayout, GridLayout};
use crate::bars::BarLayout;
use crate::container::ContainerLayout;
use crate::flow::FlowLayout;
use crate::legend::LegendLayout;
use crate::lines::LineSeries;
use crate::nodes::LabelLines;
use crate::pie::PieLayout;
use crate::scroll::ScrollState;
use crate::slider::SliderLayout;
use crate::viewport::{FitTransform, Overflow, Transition, View, ZoomState, ZoomTransform};
use cm_graphs_core::config::{ArrowDirection, ChartKind};
use cm_graphs_core::data::{LinkStyle, NodeStyle};
use cm_graphs_core::geom::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the content of a chart lands inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Content bounds the fit was computed from, in graph coordinates.
    pub content: Option<Rect>,
    pub overflow: Overflow,
    /// `None` when the content has no area.
    pub fit: Option<FitTransform>,
    /// Move from the previous transform to the fitted one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPreview {
    pub state: ScrollState,
    /// The strip, in graph coordinates.
    pub rect: Rect,
    pub bars: Vec<BarLayout>,
    pub lines: Vec<LineSeries>,
}

/// Histogram and line charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisChartLayout {
    pub generation: u64,
    pub container: ContainerLayout,
    /// First record of the visible window.
    pub window_start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_axis: Option<AxisLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_axis: Option<AxisLayout>,
    pub grid: GridLayout,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bars: Vec<BarLayout>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollPreview>,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChartLayout {
    pub generation: u64,
    pub container: ContainerLayout,
    pub pie: PieLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendLayout>,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodeLayout {
    pub id: String,
    pub label: String,
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Children are hidden; the node is filled with the collapsed color.
    pub collapsed: bool,
    pub clickable: bool,
    pub fill: String,
    pub node: NodeStyle,
    pub center: Point,
    pub size: Size,
    /// Translation of the node shape, see [`crate::nodes::node_origin`].
    pub origin: Point,
    pub label_lines: LabelLines,
    pub label_offset: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLinkLayout {
    pub source: String,
    pub target: String,
    /// Start, end of the start stub, two control points, start of the end stub, end.
    pub points: [Point; 6],
    pub link: LinkStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow: Option<ArrowDirection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeChartLayout {
    pub generation: u64,
    pub container: ContainerLayout,
    pub nodes: Vec<TreeNodeLayout>,
    pub links: Vec<TreeLinkLayout>,
    /// Nodes that appeared with this pass; they grow out of `source`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entering: Vec<String>,
    /// Nodes that disappeared with this pass; they shrink into `source`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exiting: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Point>,
    pub viewport: Viewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleNodeLayout {
    pub id: String,
    pub label: String,
    pub depth: usize,
    pub parent: String,
    /// Center relative to the middle of the graph area.
    pub center: Point,
    pub r: f64,
    pub fill: String,
    pub stroke_color_on_hover: String,
    /// Has visible or hidden children.
    pub clickable: bool,
    pub label_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusZoom {
    pub generation: u64,
    pub from: View,
    pub to: View,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleChartLayout {
    pub generation: u64,
    pub container: ContainerLayout,
    /// Every visible node but the root.
    pub nodes: Vec<BubbleNodeLayout>,
    pub focus: String,
    pub view: View,
    pub transform: ZoomTransform,
    /// Labels are scaled back by this factor so they keep their size.
    pub label_scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<FocusZoom>,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowChartLayout {
    pub generation: u64,
    pub container: ContainerLayout,
    pub flow: FlowLayout,
    pub viewport: Viewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderChartLayout {
    pub generation: u64,
    pub container: ContainerLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider: Option<SliderLayout>,
    pub viewport: Viewport,
}

/// Snapshot of a chart after a layout pass, ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[allow(clippy::large_enum_variant)]
pub enum ChartLayout {
    Histogram(AxisChartLayout),
    Line(AxisChartLayout),
    Pie(PieChartLayout),
    Donut(PieChartLayout),
    Tree(TreeChartLayout),
    FlowChart(FlowChartLayout),
    RangeSlider(SliderChartLayout),
    BubbleChart(BubbleChartLayout),
}

impl ChartLayout {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartLayout::Histogram(_) => ChartKind::Histogram,
            ChartLayout::Line(_) => ChartKind::Line,
            ChartLayout::Pie(_) => ChartKind::Pie,
            ChartLayout::Donut(_) => ChartKind::Donut,
            ChartLayout::Tree(_) => ChartKind::Tree,
            ChartLayout::FlowChart(_) => ChartKind::FlowChart,
            ChartLayout::RangeSlider(_) => ChartKind::RangeSlider,
            ChartLayout::BubbleChart(_) => ChartKind::BubbleChart,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            ChartLayout::Histogram(l) | ChartLayout::Line(l) => l.generation,
            ChartLayout::Pie(l) | ChartLayout::Donut(l) => l.generation,
            ChartLayout::Tree(l) => l.generation,
            ChartLayout::FlowChart(l) => l.generation,
            ChartLayout::RangeSlider(l) => l.generation,
            ChartLayout::BubbleChart(l) => l.generation,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
