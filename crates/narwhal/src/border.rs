//! Left and right border nodes for every rank a cluster spans.
//!
//! The ordering stage pins them to both ends of the cluster's block on each layer, and the
//! positioning stage keeps `cluster_padding` between them and the cluster content. The cluster
//! box is later read off their coordinates.

use crate::model::{DummyKind, LayoutGraph, NodeLabel};
use crate::util::unique_id;
use crate::Result;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct ClusterBorders {
    pub min_rank: i32,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl ClusterBorders {
    pub fn at(&self, rank: i32) -> Option<(&str, &str)> {
        let i = usize::try_from(rank - self.min_rank).ok()?;
        Some((self.left.get(i)?.as_str(), self.right.get(i)?.as_str()))
    }
}

pub type BorderMap = FxHashMap<String, ClusterBorders>;

pub fn run(g: &mut LayoutGraph) -> Result<BorderMap> {
    let mut out = BorderMap::default();
    for id in g.node_ids() {
        if !g.is_cluster(&id) {
            continue;
        }
        let Some((min_rank, max_rank)) = g
            .node(&id)
            .and_then(|n| n.min_rank.zip(n.max_rank))
        else {
            continue;
        };
        let mut borders = ClusterBorders {
            min_rank,
            ..Default::default()
        };
        for rank in min_rank..=max_rank {
            borders.left.push(add_border(g, &id, rank, DummyKind::BorderLeft)?);
            borders.right.push(add_border(g, &id, rank, DummyKind::BorderRight)?);
        }
        out.insert(id, borders);
    }
    Ok(out)
}

fn add_border(g: &mut LayoutGraph, cluster: &str, rank: i32, kind: DummyKind) -> Result<String> {
    let prefix = match kind {
        DummyKind::BorderLeft => "_bl",
        _ => "_br",
    };
    let id = unique_id(g, prefix);
    g.set_node(
        id.clone(),
        NodeLabel {
            rank: Some(rank),
            dummy: Some(kind),
            ..Default::default()
        },
    );
    g.set_parent(&id, Some(cluster))?;
    Ok(id)
}

pub fn undo(g: &mut LayoutGraph, borders: &BorderMap) {
    for b in borders.values() {
        for id in b.left.iter().chain(&b.right) {
            g.remove_node(id);
        }
    }
}
