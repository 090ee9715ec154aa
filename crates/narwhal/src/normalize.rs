//! Splits edges spanning several ranks into chains of unit length edges.
//!
//! Every intermediate rank gets a zero sized dummy node. The dummy becomes a child of the lowest
//! cluster containing both endpoints so that the ordering stage keeps it inside that cluster.

use crate::graph::EdgeKey;
use crate::model::{DummyKind, EdgeLabel, LayoutGraph, NodeLabel, Point};
use crate::util::unique_id;
use crate::Result;

#[derive(Debug, Clone)]
pub struct DummyChain {
    pub key: EdgeKey,
    pub label: EdgeLabel,
    pub dummies: Vec<String>,
}

pub fn run(g: &mut LayoutGraph) -> Result<Vec<DummyChain>> {
    let mut chains = Vec::new();
    for key in g.edge_keys() {
        if key.is_self_loop() {
            continue;
        }
        let (Some(rv), Some(rw)) = (
            g.node(&key.v).and_then(|n| n.rank),
            g.node(&key.w).and_then(|n| n.rank),
        ) else {
            continue;
        };
        if rw - rv <= 1 {
            continue;
        }
        let Some(label) = g.remove_edge(&key) else {
            continue;
        };

        let parent = lowest_common_cluster(g, &key.v, &key.w);
        let mut dummies = Vec::with_capacity((rw - rv - 1) as usize);
        let mut prev = key.v.clone();
        for rank in rv + 1..rw {
            let id = unique_id(g, "_d");
            g.set_node(
                id.clone(),
                NodeLabel {
                    rank: Some(rank),
                    dummy: Some(DummyKind::Edge),
                    ..Default::default()
                },
            );
            g.set_parent(&id, parent.as_deref())?;
            link(g, &prev, &id, &key, dummies.len(), label.weight)?;
            prev = id.clone();
            dummies.push(id);
        }
        link(g, &prev, &key.w, &key, dummies.len(), label.weight)?;
        chains.push(DummyChain {
            key,
            label,
            dummies,
        });
    }
    tracing::trace!(chains = chains.len(), "normalized long edges");
    Ok(chains)
}

fn link(g: &mut LayoutGraph, v: &str, w: &str, key: &EdgeKey, step: usize, weight: f64) -> Result<()> {
    let name = format!("{}#{step}", key.name.as_deref().unwrap_or(""));
    g.set_edge_named(
        v,
        w,
        Some(name),
        EdgeLabel {
            weight,
            ..Default::default()
        },
    )
}

/// Removes the dummy chains and restores the original edges with the bend points collected
/// from the dummies' positions.
pub fn undo(g: &mut LayoutGraph, chains: Vec<DummyChain>) -> Result<()> {
    for chain in chains {
        let mut label = chain.label;
        label.points = chain
            .dummies
            .iter()
            .filter_map(|d| g.node(d).map(|n| Point::new(n.x, n.y)))
            .collect();
        for d in &chain.dummies {
            g.remove_node(d);
        }
        g.set_edge_named(&chain.key.v, &chain.key.w, chain.key.name.clone(), label)?;
    }
    Ok(())
}

fn lowest_common_cluster(g: &LayoutGraph, v: &str, w: &str) -> Option<String> {
    let w_ancestors = g.ancestors(w);
    g.ancestors(v)
        .into_iter()
        .find(|a| w_ancestors.contains(a))
}
