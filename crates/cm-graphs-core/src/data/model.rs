use crate::config::{ClusterLabelPosition, Dimensions, NodeShape, Padding};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// A histogram or line chart record: one category with one value per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDatum {
    pub id: String,
    pub label: String,
    pub values: Vec<f64>,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceDatum {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub slice: SliceStyle,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderDatum {
    pub id: String,
    pub label: String,
    pub value: f64,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
}

/// Visual attributes of a tree or flow node, defaults merged with per-record overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub collapsed_color: String,
    pub expanded_color: String,
    pub stroke_color: String,
    pub label_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub circle_radius: f64,
    pub rectangle_dimensions: Dimensions,
    pub square_dimensions: f64,
    pub rhombus_dimensions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDatum {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub node: NodeStyle,
    pub link: LinkStyle,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
    #[serde(default)]
    pub children: Vec<TreeDatum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleNodeStyle {
    pub stroke_color_on_hover: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleDatum {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub node: BubbleNodeStyle,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
    #[serde(default)]
    pub children: Vec<BubbleDatum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeDatum {
    pub id: String,
    pub label: String,
    pub node: NodeStyle,
    pub link: LinkStyle,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdgeDatum {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub source: String,
    pub target: String,
    pub link: LinkStyle,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLabelStyle {
    pub color: String,
    pub position: ClusterLabelPosition,
    #[serde(rename = "font-size", alias = "fontSize")]
    pub font_size: f64,
    pub padding: Padding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStyle {
    pub level: f64,
    pub stroke_color: String,
    pub fill_color: String,
    pub label: ClusterLabelStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDatum {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub nodes: Vec<String>,
    pub cluster: ClusterStyle,
    #[serde(default = "empty_object")]
    pub extra_data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowData {
    pub nodes: Vec<FlowNodeDatum>,
    pub edges: Vec<FlowEdgeDatum>,
    pub clusters: Vec<ClusterDatum>,
}

/// Normalized chart data, one variant per family of chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "kebab-case")]
pub enum ChartData {
    Series(Vec<SeriesDatum>),
    Slices(Vec<SliceDatum>),
    Slider(Vec<SliderDatum>),
    Tree(Vec<TreeDatum>),
    Bubble(Vec<BubbleDatum>),
    Flow(FlowData),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Series(v) => v.len(),
            ChartData::Slices(v) => v.len(),
            ChartData::Slider(v) => v.len(),
            ChartData::Tree(v) => v.len(),
            ChartData::Bubble(v) => v.len(),
            ChartData::Flow(f) => f.nodes.len() + f.edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
