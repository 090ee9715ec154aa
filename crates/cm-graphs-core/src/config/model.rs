//! Typed chart configuration.
//!
//! Every struct here is deserialized from the merged configuration tree, so all fields are
//! required: the defaults in [`super::defaults`] guarantee their presence. Enum values are
//! closed sets; an unknown string is rejected by serde and surfaces as
//! [`crate::Error::InvalidConfig`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Histogram,
    Line,
    Pie,
    Donut,
    Tree,
    FlowChart,
    RangeSlider,
    BubbleChart,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Histogram,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Donut,
        ChartKind::Tree,
        ChartKind::FlowChart,
        ChartKind::RangeSlider,
        ChartKind::BubbleChart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Donut => "donut",
            ChartKind::Tree => "tree",
            ChartKind::FlowChart => "flow-chart",
            ChartKind::RangeSlider => "range-slider",
            ChartKind::BubbleChart => "bubble-chart",
        }
    }

    pub fn parse(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| crate::Error::UnsupportedChart {
                chart_type: s.to_string(),
            })
    }

    /// Charts whose data is a tree of records (`children`).
    pub fn is_hierarchical(self) -> bool {
        matches!(self, ChartKind::Tree | ChartKind::BubbleChart)
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub type Margin = Padding;

impl Padding {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupedType {
    #[default]
    Inline,
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelOrientation {
    #[default]
    Horizontal,
    Vertical,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    #[default]
    Right,
    Bottom,
    Left,
}

impl LegendPosition {
    pub fn is_vertical(self) -> bool {
        matches!(self, LegendPosition::Left | LegendPosition::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Circle,
    Rect,
    Square,
    Rhombus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    Start,
    #[default]
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkShape {
    Smooth,
    #[default]
    Straight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterPosition {
    #[default]
    Default,
    FullSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterShape {
    #[default]
    Rectangle,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterLabelPosition {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    #[default]
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    #[default]
    Discrete,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleType {
    Single,
    #[default]
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TooltipVisibility {
    Never,
    #[default]
    Always,
    OnHover,
}

/// Fields shared by every chart type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    pub id: Option<String>,
    pub margin: Margin,
    pub overflow_x: bool,
    pub overflow_y: bool,
    pub tooltip_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvents {
    pub click_on_element: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub axis_x: bool,
    pub axis_y: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    pub show_axis_x: bool,
    pub show_axis_y: bool,
    pub invert_axis_x: bool,
    pub invert_axis_y: bool,
    pub label_x_orientation: LabelOrientation,
    pub label_y_orientation: LabelOrientation,
    pub line_color: String,
    pub text_color: String,
    /// Template applied to bottom axis tick values, `{value}` is substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_format_x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_format_y: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStyle {
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendConfig {
    pub enabled: bool,
    pub position: LegendPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub groups: Vec<GroupStyle>,
    pub events: ClickEvents,
    pub orientation: Orientation,
    pub grid: GridConfig,
    pub axis: AxisConfig,
    pub grouped_type: GroupedType,
    pub legend: LegendConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_displayed_number: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub groups: Vec<GroupStyle>,
    pub events: ClickEvents,
    pub orientation: Orientation,
    pub grid: GridConfig,
    pub axis: AxisConfig,
    pub has_area: bool,
    pub legend: LegendConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_displayed_number: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceConfig {
    pub colors: Vec<String>,
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub events: ClickEvents,
    pub slices: SliceConfig,
    pub legend: LegendConfig,
    /// Number of slices per ring; `None` keeps every slice on the first ring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_displayed_number: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ZoomConfig {
    pub fn clamp(&self, k: f64) -> f64 {
        k.max(self.min_zoom).min(self.max_zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodesConfig {
    pub shape: NodeShape,
    pub collapsed_color: String,
    pub expanded_color: String,
    pub stroke_color: String,
    pub circle_radius: f64,
    pub rectangle_dimensions: Dimensions,
    pub square_dimensions: f64,
    pub rhombus_dimensions: f64,
    pub distance_between_brothers: f64,
    pub distance_between_cousins: f64,
    pub distance_between_parent_and_child: f64,
    pub expandable: bool,
    pub max_initial_expanded_level: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksConfig {
    pub color: String,
    pub arrow: bool,
    pub arrow_direction: ArrowDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub color: String,
    pub padding: Padding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub events: ClickEvents,
    pub orientation: Orientation,
    pub nodes: TreeNodesConfig,
    pub links: LinksConfig,
    pub label: LabelConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodesConfig {
    pub shape: NodeShape,
    pub collapsed_color: String,
    pub expanded_color: String,
    pub stroke_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub circle_radius: f64,
    pub rectangle_dimensions: Dimensions,
    pub square_dimensions: f64,
    pub rhombus_dimensions: f64,
    pub distance_between_brothers: f64,
    pub distance_between_parent_and_child: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLinksConfig {
    pub color: String,
    pub arrow: bool,
    pub arrow_direction: ArrowDirection,
    pub shape: LinkShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLabelConfig {
    pub color: String,
    pub position: ClusterLabelPosition,
    #[serde(rename = "font-size", alias = "fontSize")]
    pub font_size: f64,
    pub padding: Padding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClustersConfig {
    pub stroke_color: String,
    pub fill_color: String,
    pub position: ClusterPosition,
    pub shape: ClusterShape,
    pub label: ClusterLabelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub events: ClickEvents,
    pub orientation: Orientation,
    pub nodes: FlowNodesConfig,
    pub links: FlowLinksConfig,
    pub label: LabelConfig,
    pub clusters: ClustersConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeEvents {
    pub range_changed: bool,
    pub range_changing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackConfig {
    pub color: String,
    pub width: f64,
    pub inset_color: String,
    pub inset_width: f64,
    pub fill_color: String,
    pub fill_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalConfig {
    #[serde(rename = "type")]
    pub kind: IntervalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleConfig {
    pub stroke_color: String,
    pub fill_color: String,
    #[serde(rename = "type")]
    pub kind: HandleType,
    pub show_tooltip: TooltipVisibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderAxisConfig {
    pub show_axis_x: bool,
    pub show_axis_y: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSliderConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub events: RangeEvents,
    pub orientation: Orientation,
    pub track: TrackConfig,
    pub interval: IntervalConfig,
    pub handle: HandleConfig,
    pub axis: SliderAxisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleNodesConfig {
    pub background_start_color: String,
    pub background_end_color: String,
    pub stroke_color_on_hover: String,
    pub expandable: bool,
    pub max_initial_expanded_level: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleLabelConfig {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub events: ClickEvents,
    pub nodes: BubbleNodesConfig,
    pub label: BubbleLabelConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomConfig>,
}

/// A fully normalized configuration, one variant per chart type.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphConfig {
    Histogram(HistogramConfig),
    Line(LineConfig),
    Pie(PieConfig),
    Donut(PieConfig),
    Tree(TreeConfig),
    FlowChart(FlowConfig),
    RangeSlider(RangeSliderConfig),
    BubbleChart(BubbleConfig),
}

impl GraphConfig {
    pub fn kind(&self) -> ChartKind {
        match self {
            GraphConfig::Histogram(_) => ChartKind::Histogram,
            GraphConfig::Line(_) => ChartKind::Line,
            GraphConfig::Pie(_) => ChartKind::Pie,
            GraphConfig::Donut(_) => ChartKind::Donut,
            GraphConfig::Tree(_) => ChartKind::Tree,
            GraphConfig::FlowChart(_) => ChartKind::FlowChart,
            GraphConfig::RangeSlider(_) => ChartKind::RangeSlider,
            GraphConfig::BubbleChart(_) => ChartKind::BubbleChart,
        }
    }

    pub fn base(&self) -> &BaseConfig {
        match self {
            GraphConfig::Histogram(c) => &c.base,
            GraphConfig::Line(c) => &c.base,
            GraphConfig::Pie(c) | GraphConfig::Donut(c) => &c.base,
            GraphConfig::Tree(c) => &c.base,
            GraphConfig::FlowChart(c) => &c.base,
            GraphConfig::RangeSlider(c) => &c.base,
            GraphConfig::BubbleChart(c) => &c.base,
        }
    }

    /// Serializes the configuration back into its JSON form, `type` included.
    pub fn to_value(&self) -> crate::Result<serde_json::Value> {
        let mut value = match self {
            GraphConfig::Histogram(c) => serde_json::to_value(c)?,
            GraphConfig::Line(c) => serde_json::to_value(c)?,
            GraphConfig::Pie(c) | GraphConfig::Donut(c) => serde_json::to_value(c)?,
            GraphConfig::Tree(c) => serde_json::to_value(c)?,
            GraphConfig::FlowChart(c) => serde_json::to_value(c)?,
            GraphConfig::RangeSlider(c) => serde_json::to_value(c)?,
            GraphConfig::BubbleChart(c) => serde_json::to_value(c)?,
        };
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(self.kind().as_str().to_string()),
            );
        }
        Ok(value)
    }
}
