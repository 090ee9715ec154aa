//! Vertex ordering within ranks.
//!
//! Layers start from a depth first walk and are then improved with alternating downward and
//! upward barycenter sweeps, keeping the ordering with the fewest weighted crossings. Each layer
//! is sorted recursively along the cluster tree, so the members of a cluster stay contiguous and
//! are enclosed by the cluster's border nodes. Sibling clusters keep one relative order across
//! all layers, which keeps their boxes from overlapping.

use crate::border::BorderMap;
use crate::model::{DummyKind, LayoutGraph};
use rustc_hash::{FxHashMap, FxHashSet};

pub type Layers = Vec<Vec<String>>;

const MAX_SWEEPS: usize = 24;

type Adjacency<'a> = FxHashMap<&'a str, Vec<(&'a str, f64)>>;
type Positions = FxHashMap<String, usize>;

pub fn run(g: &mut LayoutGraph, borders: &BorderMap) -> Layers {
    let layers = Ordering::new(g, borders).order();
    for layer in &layers {
        for (i, id) in layer.iter().enumerate() {
            if let Some(n) = g.node_mut(id) {
                n.order = Some(i);
            }
        }
    }
    layers
}

/// Weighted number of edge crossings between consecutive layers.
pub fn crossing_count(g: &LayoutGraph, layers: &Layers) -> f64 {
    let succs = adjacency(g, true);
    count_crossings(&succs, layers)
}

struct Ordering<'a> {
    g: &'a LayoutGraph,
    borders: &'a BorderMap,
    preds: Adjacency<'a>,
    succs: Adjacency<'a>,
}

struct Block {
    nodes: Vec<String>,
    /// Sum of weighted neighbor positions and the total weight.
    bary: Option<(f64, f64)>,
    index: usize,
    cluster: Option<String>,
}

impl<'a> Ordering<'a> {
    fn new(g: &'a LayoutGraph, borders: &'a BorderMap) -> Self {
        Self {
            g,
            borders,
            preds: adjacency(g, false),
            succs: adjacency(g, true),
        }
    }

    fn order(&self) -> Layers {
        let mut layers = self.initial_layers();
        if layers.is_empty() {
            return layers;
        }
        let keys = self.cluster_keys(&layers);
        layers = (0..layers.len())
            .map(|r| {
                let current = positions(&layers[r]);
                self.sort_subgraph(None, r as i32, None, &current, &keys).0
            })
            .collect();

        let mut best = layers.clone();
        let mut best_cc = count_crossings(&self.succs, &layers);
        let patience = self.g.graph().order_patience.max(1);
        let mut stall = 0;
        for i in 0..MAX_SWEEPS {
            if best_cc == 0.0 || stall >= patience {
                break;
            }
            let keys = self.cluster_keys(&layers);
            self.sweep(&mut layers, i % 2 == 0, &keys);
            let cc = count_crossings(&self.succs, &layers);
            tracing::trace!(sweep = i, crossings = cc, "ordering sweep");
            if cc < best_cc {
                best = layers.clone();
                best_cc = cc;
                stall = 0;
            } else {
                stall += 1;
            }
        }
        tracing::debug!(layers = best.len(), crossings = best_cc, "ordered layers");
        best
    }

    fn initial_layers(&self) -> Layers {
        let mut ranked: Vec<(&str, i32)> = self
            .g
            .nodes()
            .filter(|(id, _)| !self.g.is_cluster(id))
            .filter_map(|(id, n)| n.rank.map(|r| (id, r)))
            .collect();
        let Some(max_rank) = ranked.iter().map(|&(_, r)| r).max() else {
            return Vec::new();
        };
        ranked.sort_by_key(|&(_, r)| r);

        let mut layers: Layers = vec![Vec::new(); max_rank as usize + 1];
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        for &(start, _) in &ranked {
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                if !visited.insert(v) {
                    continue;
                }
                if let Some(r) = self.g.node(v).and_then(|n| n.rank) {
                    layers[r as usize].push(v.to_string());
                }
                if let Some(next) = self.succs.get(v) {
                    stack.extend(next.iter().rev().map(|&(w, _)| w));
                }
            }
        }
        layers
    }

    fn sweep(&self, layers: &mut Layers, down: bool, keys: &FxHashMap<String, f64>) {
        let ranks: Vec<usize> = if down {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };
        let neighbors = if down { &self.preds } else { &self.succs };
        for r in ranks {
            let reference = if down { r - 1 } else { r + 1 };
            let fixed = positions(&layers[reference]);
            let current = positions(&layers[r]);
            layers[r] = self
                .sort_subgraph(None, r as i32, Some((neighbors, &fixed)), &current, keys)
                .0;
        }
    }

    /// Mean position of each cluster's left border over the layers it spans.
    fn cluster_keys(&self, layers: &Layers) -> FxHashMap<String, f64> {
        let mut pos = Positions::default();
        for layer in layers {
            pos.extend(positions(layer));
        }
        self.borders
            .iter()
            .map(|(cluster, b)| {
                let seen: Vec<f64> = b
                    .left
                    .iter()
                    .filter_map(|id| pos.get(id).map(|&p| p as f64))
                    .collect();
                let key = if seen.is_empty() {
                    0.0
                } else {
                    seen.iter().sum::<f64>() / seen.len() as f64
                };
                (cluster.clone(), key)
            })
            .collect()
    }

    fn sort_subgraph(
        &self,
        parent: Option<&str>,
        rank: i32,
        reference: Option<(&Adjacency<'a>, &Positions)>,
        current: &Positions,
        keys: &FxHashMap<String, f64>,
    ) -> (Vec<String>, Option<(f64, f64)>) {
        let mut blocks = Vec::new();
        for child in self.g.children(parent) {
            let Some(n) = self.g.node(child) else {
                continue;
            };
            if self.g.is_cluster(child) {
                let (Some(lo), Some(hi)) = (n.min_rank, n.max_rank) else {
                    continue;
                };
                if rank < lo || rank > hi {
                    continue;
                }
                let (inner, bary) = self.sort_subgraph(Some(child), rank, reference, current, keys);
                let nodes = match self.borders.get(child).and_then(|b| b.at(rank)) {
                    Some((left, right)) => {
                        let mut nodes = Vec::with_capacity(inner.len() + 2);
                        nodes.push(left.to_string());
                        nodes.extend(inner);
                        nodes.push(right.to_string());
                        nodes
                    }
                    None => inner,
                };
                blocks.push(Block {
                    nodes,
                    bary,
                    index: 0,
                    cluster: Some(child.clone()),
                });
            } else if n.rank == Some(rank)
                && !matches!(n.dummy, Some(DummyKind::BorderLeft | DummyKind::BorderRight))
            {
                let bary = reference.and_then(|(adj, fixed)| barycenter(child, adj, fixed));
                blocks.push(Block {
                    nodes: vec![child.clone()],
                    bary,
                    index: 0,
                    cluster: None,
                });
            }
        }

        let mut by_position: Vec<(usize, usize)> = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let first = b
                    .nodes
                    .iter()
                    .filter_map(|n| current.get(n).copied())
                    .min()
                    .unwrap_or(usize::MAX);
                (first, i)
            })
            .collect();
        by_position.sort();
        for (index, &(_, i)) in by_position.iter().enumerate() {
            blocks[i].index = index;
        }

        let total = blocks.iter().filter_map(|b| b.bary).fold(None, |acc, (s, w)| {
            let (s0, w0) = acc.unwrap_or((0.0, 0.0));
            Some((s0 + s, w0 + w))
        });
        let sorted = keep_cluster_order(sort_blocks(blocks), keys);
        (sorted.into_iter().flat_map(|b| b.nodes).collect(), total)
    }
}

fn barycenter(id: &str, adj: &Adjacency<'_>, fixed: &Positions) -> Option<(f64, f64)> {
    let mut sum = 0.0;
    let mut weight = 0.0;
    for &(u, w) in adj.get(id)? {
        if let Some(&p) = fixed.get(u) {
            sum += p as f64 * w;
            weight += w;
        }
    }
    (weight > 0.0).then_some((sum, weight))
}

/// Sorts blocks with a barycenter and keeps the others at their current index.
fn sort_blocks(blocks: Vec<Block>) -> Vec<Block> {
    let (mut sortable, mut unsortable): (Vec<Block>, Vec<Block>) =
        blocks.into_iter().partition(|b| b.bary.is_some());
    let center = |b: &Block| b.bary.map_or(0.0, |(s, w)| s / w);
    sortable.sort_by(|a, b| center(a).total_cmp(&center(b)).then(a.index.cmp(&b.index)));
    unsortable.sort_by(|a, b| b.index.cmp(&a.index));

    let mut out = Vec::with_capacity(sortable.len() + unsortable.len());
    let mut next = 0;
    let consume = |out: &mut Vec<Block>, unsortable: &mut Vec<Block>, next: &mut usize| {
        while unsortable.last().is_some_and(|b| b.index <= *next) {
            if let Some(b) = unsortable.pop() {
                out.push(b);
                *next += 1;
            }
        }
    };
    consume(&mut out, &mut unsortable, &mut next);
    for b in sortable {
        out.push(b);
        next += 1;
        consume(&mut out, &mut unsortable, &mut next);
    }
    while let Some(b) = unsortable.pop() {
        out.push(b);
    }
    out
}

/// Refills the slots taken by cluster blocks with the clusters in their global order.
fn keep_cluster_order(blocks: Vec<Block>, keys: &FxHashMap<String, f64>) -> Vec<Block> {
    let mut slots: Vec<Option<Block>> = blocks.into_iter().map(Some).collect();
    let mut clusters: Vec<Block> = Vec::new();
    let mut free: Vec<usize> = Vec::new();
    for (i, slot) in slots.iter_mut().enumerate() {
        if slot.as_ref().is_some_and(|b| b.cluster.is_some()) {
            if let Some(b) = slot.take() {
                clusters.push(b);
                free.push(i);
            }
        }
    }
    let key = |b: &Block| {
        b.cluster
            .as_ref()
            .and_then(|c| keys.get(c).copied())
            .unwrap_or(f64::MAX)
    };
    clusters.sort_by(|a, b| key(a).total_cmp(&key(b)).then(a.index.cmp(&b.index)));
    for (i, b) in free.into_iter().zip(clusters) {
        slots[i] = Some(b);
    }
    slots.into_iter().flatten().collect()
}

fn positions(layer: &[String]) -> Positions {
    layer
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect()
}

fn adjacency(g: &LayoutGraph, outgoing: bool) -> Adjacency<'_> {
    let mut out: Adjacency<'_> = FxHashMap::default();
    for (key, e) in g.edges() {
        if key.is_self_loop() {
            continue;
        }
        let (from, to) = if outgoing {
            (key.v.as_str(), key.w.as_str())
        } else {
            (key.w.as_str(), key.v.as_str())
        };
        out.entry(from).or_default().push((to, e.weight));
    }
    out
}

fn count_crossings(succs: &Adjacency<'_>, layers: &Layers) -> f64 {
    layers
        .windows(2)
        .map(|pair| bilayer_crossings(succs, &pair[0], &pair[1]))
        .sum()
}

/// Accumulator tree count of weighted crossings between two adjacent layers.
fn bilayer_crossings(succs: &Adjacency<'_>, north: &[String], south: &[String]) -> f64 {
    if south.is_empty() {
        return 0.0;
    }
    let south_pos = positions(south);
    let mut entries: Vec<(usize, f64)> = Vec::new();
    for v in north {
        let mut targets: Vec<(usize, f64)> = succs
            .get(v.as_str())
            .into_iter()
            .flatten()
            .filter_map(|&(w, weight)| south_pos.get(w).map(|&p| (p, weight)))
            .collect();
        targets.sort_by_key(|&(p, _)| p);
        entries.extend(targets);
    }

    let mut first_index = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let mut tree = vec![0.0; 2 * first_index - 1];
    first_index -= 1;

    let mut crossings = 0.0;
    for (pos, weight) in entries {
        let mut index = pos + first_index;
        tree[index] += weight;
        let mut weight_sum = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) / 2;
            tree[index] += weight;
        }
        crossings += weight * weight_sum;
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bilayer_count_matches_pairwise_inversions() {
        let mut succs: Adjacency<'_> = FxHashMap::default();
        succs.insert("a", vec![("y", 1.0)]);
        succs.insert("b", vec![("x", 1.0)]);
        succs.insert("c", vec![("x", 2.0)]);
        let cc = bilayer_crossings(&succs, &layer(&["a", "b", "c"]), &layer(&["x", "y"]));
        assert_eq!(cc, 3.0);
    }

    #[test]
    fn unsortable_blocks_keep_their_slot() {
        let block = |id: &str, bary: Option<f64>, index: usize| Block {
            nodes: vec![id.to_string()],
            bary: bary.map(|b| (b, 1.0)),
            index,
            cluster: None,
        };
        let out = sort_blocks(vec![
            block("a", Some(2.0), 0),
            block("b", None, 1),
            block("c", Some(0.0), 2),
        ]);
        let ids: Vec<&str> = out.iter().map(|b| b.nodes[0].as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}
