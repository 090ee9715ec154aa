//! Coordinate assignment.
//!
//! `y` follows the ranks: every layer is as tall as its tallest node, consecutive layers are
//! `ranksep` apart plus `cluster_padding` for every cluster boundary between them.
//!
//! `x` minimizes the weighted squared distance between each node and the mean position of its
//! neighbors in the adjacent layer, subject to the minimum separation between consecutive nodes
//! of a layer. With the separations folded into the variables the problem becomes an isotonic
//! regression, solved exactly per layer by pool adjacent violators. Alternating sweeps over the
//! layers propagate the alignment through the graph.

use crate::border::BorderMap;
use crate::model::{DummyKind, GraphLabel, LayoutGraph, NodeLabel};
use crate::order::Layers;
use rustc_hash::FxHashMap;

const SWEEPS: usize = 8;

pub fn run(g: &mut LayoutGraph, layers: &Layers, borders: &BorderMap) {
    assign_y(g, layers);
    assign_x(g, layers, borders);
}

fn assign_y(g: &mut LayoutGraph, layers: &Layers) {
    let mut starts = vec![0usize; layers.len()];
    let mut ends = vec![0usize; layers.len()];
    for (id, n) in g.nodes() {
        if !g.is_cluster(id) {
            continue;
        }
        if let (Some(lo), Some(hi)) = (n.min_rank, n.max_rank) {
            starts[lo as usize] += 1;
            ends[hi as usize] += 1;
        }
    }

    let GraphLabel {
        ranksep,
        cluster_padding,
        ..
    } = *g.graph();
    let mut cursor = 0.0;
    for (r, layer) in layers.iter().enumerate() {
        if r > 0 {
            cursor += ranksep + cluster_padding * (ends[r - 1] + starts[r]) as f64;
        }
        let height = layer
            .iter()
            .filter_map(|id| g.node(id).map(|n| n.height))
            .fold(0.0, f64::max);
        let center = cursor + height / 2.0;
        for id in layer {
            if let Some(n) = g.node_mut(id) {
                n.y = center;
            }
        }
        cursor += height;
    }
}

fn assign_x(g: &mut LayoutGraph, layers: &Layers, borders: &BorderMap) {
    let label = g.graph().clone();
    let mut preds: FxHashMap<&str, Vec<(&str, f64)>> = FxHashMap::default();
    let mut succs: FxHashMap<&str, Vec<(&str, f64)>> = FxHashMap::default();
    for (key, e) in g.edges() {
        if key.is_self_loop() {
            continue;
        }
        succs.entry(key.v.as_str()).or_default().push((key.w.as_str(), e.weight));
        preds.entry(key.w.as_str()).or_default().push((key.v.as_str(), e.weight));
    }

    let info: FxHashMap<&str, &NodeLabel> = g.nodes().collect();
    let offsets: Vec<Vec<f64>> = layers
        .iter()
        .map(|layer| cumulative_separation(layer, &info, &label))
        .collect();

    let mut x: FxHashMap<&str, f64> = FxHashMap::default();
    for (layer, offs) in layers.iter().zip(&offsets) {
        for (id, &o) in layer.iter().zip(offs) {
            x.insert(id.as_str(), o);
        }
    }

    for sweep in 0..SWEEPS {
        let both = sweep + 2 >= SWEEPS;
        let down = sweep % 2 == 0;
        let ranks: Vec<usize> = if down {
            (0..layers.len()).collect()
        } else {
            (0..layers.len()).rev().collect()
        };
        for r in ranks {
            let layer = &layers[r];
            let mut targets = Vec::with_capacity(layer.len());
            let mut weights = Vec::with_capacity(layer.len());
            for (i, id) in layer.iter().enumerate() {
                let mut sum = 0.0;
                let mut weight = 0.0;
                let lists = [
                    (down || both).then(|| preds.get(id.as_str())).flatten(),
                    (!down || both).then(|| succs.get(id.as_str())).flatten(),
                ];
                for &(u, w) in lists.into_iter().flatten().flatten() {
                    if let Some(&ux) = x.get(u) {
                        sum += ux * w;
                        weight += w;
                    }
                }
                let current = x.get(id.as_str()).copied().unwrap_or(0.0);
                let kind = info.get(id.as_str()).and_then(|n| n.dummy);
                let (target, w) = if weight > 0.0 {
                    let pull = if kind == Some(DummyKind::Edge) { 2.0 } else { 1.0 };
                    (sum / weight, pull)
                } else if matches!(kind, Some(DummyKind::BorderLeft | DummyKind::BorderRight)) {
                    (current, 0.01)
                } else {
                    (current, 0.1)
                };
                targets.push(target - offsets[r][i]);
                weights.push(w);
            }
            let solved = isotonic_regression(&targets, &weights);
            for (i, id) in layer.iter().enumerate() {
                x.insert(id.as_str(), solved[i] + offsets[r][i]);
            }
        }
    }

    align_cluster_borders(&mut x, layers, &offsets, borders);

    let solved: Vec<(String, f64)> = x.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    for (id, value) in solved {
        if let Some(n) = g.node_mut(&id) {
            n.x = value;
        }
    }
}

/// Moves all left borders of a cluster onto one column, and all right borders onto another, so
/// that the cluster box is a rectangle nothing else intrudes into.
///
/// Borders are merged into one variable per side and the layer separations become constraints
/// of a DAG (sibling clusters keep one order on every layer). A longest path pass that starts
/// from the current positions then only pushes nodes to the right where needed.
fn align_cluster_borders<'l>(
    x: &mut FxHashMap<&'l str, f64>,
    layers: &'l Layers,
    offsets: &[Vec<f64>],
    borders: &BorderMap,
) {
    if borders.is_empty() {
        return;
    }
    let mut var_of: FxHashMap<&str, usize> = FxHashMap::default();
    let mut init: Vec<f64> = Vec::new();
    for b in borders.values() {
        for (side, leftmost) in [(&b.left, true), (&b.right, false)] {
            let var = init.len();
            let mut value: Option<f64> = None;
            for id in side {
                var_of.insert(id.as_str(), var);
                if let Some(&v) = x.get(id.as_str()) {
                    value = Some(match value {
                        None => v,
                        Some(acc) if leftmost => acc.min(v),
                        Some(acc) => acc.max(v),
                    });
                }
            }
            init.push(value.unwrap_or(0.0));
        }
    }
    for layer in layers {
        for id in layer {
            if !var_of.contains_key(id.as_str()) {
                var_of.insert(id.as_str(), init.len());
                init.push(x.get(id.as_str()).copied().unwrap_or(0.0));
            }
        }
    }

    let mut out_edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); init.len()];
    let mut indegree = vec![0usize; init.len()];
    for (layer, offs) in layers.iter().zip(offsets) {
        for i in 1..layer.len() {
            let (Some(&u), Some(&v)) = (
                var_of.get(layer[i - 1].as_str()),
                var_of.get(layer[i].as_str()),
            ) else {
                continue;
            };
            out_edges[u].push((v, offs[i] - offs[i - 1]));
            indegree[v] += 1;
        }
    }

    let mut value = init;
    let mut ready: Vec<usize> = (0..value.len()).filter(|&v| indegree[v] == 0).collect();
    let mut done = 0;
    while let Some(u) = ready.pop() {
        done += 1;
        for &(v, sep) in &out_edges[u] {
            value[v] = value[v].max(value[u] + sep);
            indegree[v] -= 1;
            if indegree[v] == 0 {
                ready.push(v);
            }
        }
    }
    if done < value.len() {
        tracing::warn!("cluster order is inconsistent across ranks; borders left unaligned");
        return;
    }

    for layer in layers {
        for id in layer {
            if let Some(&var) = var_of.get(id.as_str()) {
                x.insert(id.as_str(), value[var]);
            }
        }
    }
}

/// Offsets of each node relative to the first one when the layer is packed as tightly as the
/// separation rules allow.
fn cumulative_separation(
    layer: &[String],
    info: &FxHashMap<&str, &NodeLabel>,
    label: &GraphLabel,
) -> Vec<f64> {
    let mut out = Vec::with_capacity(layer.len());
    let mut acc = 0.0;
    for (i, id) in layer.iter().enumerate() {
        if i > 0 {
            let prev = info.get(layer[i - 1].as_str()).copied();
            let cur = info.get(id.as_str()).copied();
            acc += separation(prev, cur, label);
        }
        out.push(acc);
    }
    out
}

fn separation(left: Option<&NodeLabel>, right: Option<&NodeLabel>, label: &GraphLabel) -> f64 {
    let half = |n: Option<&NodeLabel>| n.map_or(0.0, |n| n.width / 2.0);
    let kind = |n: Option<&NodeLabel>| n.and_then(|n| n.dummy);
    let is_border = |k: Option<DummyKind>| {
        matches!(k, Some(DummyKind::BorderLeft | DummyKind::BorderRight))
    };
    let (kl, kr) = (kind(left), kind(right));
    let gap = if kl == Some(DummyKind::BorderRight) && kr == Some(DummyKind::BorderLeft) {
        label.nodesep
    } else if is_border(kl) || is_border(kr) {
        label.cluster_padding
    } else if kl == Some(DummyKind::Edge) || kr == Some(DummyKind::Edge) {
        label.edgesep
    } else {
        label.nodesep
    };
    half(left) + half(right) + gap
}

/// Weighted least squares fit of a non-decreasing sequence (pool adjacent violators).
pub fn isotonic_regression(targets: &[f64], weights: &[f64]) -> Vec<f64> {
    // (mean, weight, count)
    let mut blocks: Vec<(f64, f64, usize)> = Vec::with_capacity(targets.len());
    for (&t, &w) in targets.iter().zip(weights) {
        blocks.push((t, w, 1));
        while blocks.len() > 1 {
            let (m1, w1, c1) = blocks[blocks.len() - 1];
            let (m0, w0, c0) = blocks[blocks.len() - 2];
            if m0 <= m1 {
                break;
            }
            blocks.truncate(blocks.len() - 2);
            let w = w0 + w1;
            let m = if w > 0.0 {
                (m0 * w0 + m1 * w1) / w
            } else {
                (m0 + m1) / 2.0
            };
            blocks.push((m, w, c0 + c1));
        }
    }
    blocks
        .into_iter()
        .flat_map(|(m, _, c)| std::iter::repeat_n(m, c))
        .collect()
}

/// Computes the box of every cluster from its border nodes and its content.
pub fn cluster_boxes(g: &mut LayoutGraph, borders: &BorderMap) {
    let padding = g.graph().cluster_padding;
    let clusters: Vec<String> = g
        .node_ids()
        .into_iter()
        .filter(|id| g.is_cluster(id))
        .collect();

    let mut boxes: FxHashMap<String, (f64, f64, f64, f64)> = FxHashMap::default();
    // Deepest clusters first so parents can include their children's boxes.
    let mut by_depth: Vec<(usize, String)> = clusters
        .into_iter()
        .map(|c| (g.ancestors(&c).len(), c))
        .collect();
    by_depth.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, cluster) in by_depth {
        let Some(b) = borders.get(&cluster) else {
            continue;
        };
        let xs = |ids: &[String]| -> Vec<f64> {
            ids.iter().filter_map(|id| g.node(id).map(|n| n.x)).collect()
        };
        let left = xs(&b.left).into_iter().fold(f64::INFINITY, f64::min);
        let right = xs(&b.right).into_iter().fold(f64::NEG_INFINITY, f64::max);

        let mut top = f64::INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for child in g.children(Some(cluster.as_str())) {
            if let Some(&(_, t, _, bo)) = boxes.get(child) {
                top = top.min(t);
                bottom = bottom.max(bo);
            } else if let Some(n) = g.node(child).filter(|n| n.dummy.is_none()) {
                top = top.min(n.y - n.height / 2.0);
                bottom = bottom.max(n.y + n.height / 2.0);
            }
        }
        if !top.is_finite() {
            let ys: Vec<f64> = b
                .left
                .iter()
                .filter_map(|id| g.node(id).map(|n| n.y))
                .collect();
            top = ys.iter().copied().fold(f64::INFINITY, f64::min);
            bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        }
        if !(left.is_finite() && right.is_finite() && top.is_finite() && bottom.is_finite()) {
            continue;
        }
        boxes.insert(cluster, (left, top - padding, right, bottom + padding));
    }

    for (id, (left, top, right, bottom)) in boxes {
        if let Some(n) = g.node_mut(&id) {
            n.x = (left + right) / 2.0;
            n.y = (top + bottom) / 2.0;
            n.width = right - left;
            n.height = bottom - top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isotonic_regression_pools_violators() {
        let out = isotonic_regression(&[1.0, 3.0, 2.0, 4.0], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(out, vec![1.0, 2.5, 2.5, 4.0]);

        let out = isotonic_regression(&[5.0, 1.0], &[3.0, 1.0]);
        assert_eq!(out, vec![4.0, 4.0]);
    }
}
