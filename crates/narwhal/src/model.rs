//! Label types attached to the graph, its nodes and its edges.

use crate::graph::EdgeKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LR | RankDir::RL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    /// Gap between neighboring nodes of one rank.
    pub nodesep: f64,
    /// Gap between consecutive ranks.
    pub ranksep: f64,
    /// Gap next to edge bends (dummy nodes).
    pub edgesep: f64,
    pub marginx: f64,
    pub marginy: f64,
    /// Space between a cluster border and its content.
    pub cluster_padding: f64,
    /// Ordering sweeps without improvement before giving up.
    pub order_patience: usize,

    pub width: f64,
    pub height: f64,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 20.0,
            marginx: 0.0,
            marginy: 0.0,
            cluster_padding: 20.0,
            order_patience: 4,
            width: 0.0,
            height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyKind {
    /// A bend point of an edge spanning several ranks.
    Edge,
    BorderLeft,
    BorderRight,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    /// Center of the node (or of the cluster box) after layout.
    pub x: f64,
    pub y: f64,
    pub rank: Option<i32>,
    pub order: Option<usize>,
    pub dummy: Option<DummyKind>,
    pub min_rank: Option<i32>,
    pub max_rank: Option<i32>,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub minlen: usize,
    pub weight: f64,
    pub points: Vec<Point>,
    pub reversed: bool,
    /// Key of the input edge a working edge was created from.
    pub forward: Option<EdgeKey>,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
            points: Vec::new(),
            reversed: false,
            forward: None,
        }
    }
}

pub type LayoutGraph = crate::graph::Graph<NodeLabel, EdgeLabel, GraphLabel>;
