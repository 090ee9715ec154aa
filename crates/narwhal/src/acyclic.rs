//! Break cycles by reversing the back edges found by a depth first search.
//!
//! Nodes are visited in insertion order, so the set of reversed edges is stable for a given
//! input. Self loops are removed before this stage and never reversed.

use crate::graph::EdgeKey;
use crate::model::LayoutGraph;
use rustc_hash::{FxHashMap, FxHashSet};

pub fn run(g: &mut LayoutGraph) {
    let back_edges = dfs_back_edges(g);
    for key in back_edges {
        let Some(mut label) = g.remove_edge(&key) else {
            continue;
        };
        label.reversed = true;
        // Names are unique per working edge, so the reversed edge cannot collide.
        let _ = g.set_edge_named(&key.w, &key.v, key.name.clone(), label);
    }
}

pub fn undo(g: &mut LayoutGraph) {
    for key in g.edge_keys() {
        if !g.edge(&key).is_some_and(|e| e.reversed) {
            continue;
        }
        let Some(mut label) = g.remove_edge(&key) else {
            continue;
        };
        label.reversed = false;
        label.points.reverse();
        let _ = g.set_edge_named(&key.w, &key.v, key.name.clone(), label);
    }
}

fn dfs_back_edges(g: &LayoutGraph) -> Vec<EdgeKey> {
    let mut out_edges: FxHashMap<&str, Vec<&EdgeKey>> = FxHashMap::default();
    for (key, _) in g.edges() {
        if !key.is_self_loop() {
            out_edges.entry(key.v.as_str()).or_default().push(key);
        }
    }

    let mut back = Vec::new();
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut on_stack: FxHashSet<&str> = FxHashSet::default();

    for (start, _) in g.nodes() {
        if visited.contains(start) {
            continue;
        }
        // Iterative DFS: (node, index of the next out edge to inspect).
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        visited.insert(start);
        on_stack.insert(start);
        while let Some(top) = stack.last_mut() {
            let (v, next) = *top;
            let edges = out_edges.get(v).map_or(&[][..], Vec::as_slice);
            if next >= edges.len() {
                on_stack.remove(v);
                stack.pop();
                continue;
            }
            top.1 += 1;
            let key = edges[next];
            let w = key.w.as_str();
            if on_stack.contains(w) {
                back.push(key.clone());
            } else if visited.insert(w) {
                on_stack.insert(w);
                stack.push((w, 0));
            }
        }
    }
    back
}
