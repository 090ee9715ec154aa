//! Rank assignment for leaf nodes.
//!
//! A longest path pass from the sinks gives a feasible ranking; a second pass in topological
//! order pulls every node with predecessors up against them, which shortens the edges that the
//! longest path pass stretched. Each weakly connected component finally starts at rank 0.

use crate::model::LayoutGraph;
use rustc_hash::FxHashMap;

pub fn run(g: &mut LayoutGraph) {
    let leaves: Vec<String> = g
        .nodes()
        .filter(|(id, _)| !g.is_cluster(id))
        .map(|(id, _)| id.to_string())
        .collect();
    if leaves.is_empty() {
        return;
    }
    let index: FxHashMap<&str, usize> = leaves
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut succ: Vec<Vec<(usize, i32)>> = vec![Vec::new(); leaves.len()];
    let mut pred: Vec<Vec<(usize, i32)>> = vec![Vec::new(); leaves.len()];
    for (key, e) in g.edges() {
        let (Some(&v), Some(&w)) = (index.get(key.v.as_str()), index.get(key.w.as_str())) else {
            continue;
        };
        if v == w {
            continue;
        }
        let minlen = i32::try_from(e.minlen).unwrap_or(i32::MAX);
        succ[v].push((w, minlen));
        pred[w].push((v, minlen));
    }

    let topo = topological_order(&succ, &pred);
    let mut rank = vec![0i32; leaves.len()];
    for &v in topo.iter().rev() {
        rank[v] = succ[v]
            .iter()
            .map(|&(w, minlen)| rank[w] - minlen)
            .min()
            .unwrap_or(0);
    }
    for &v in &topo {
        if let Some(tight) = pred[v].iter().map(|&(u, minlen)| rank[u] + minlen).max() {
            rank[v] = tight;
        }
    }

    let component = components(&succ);
    let mut component_min: FxHashMap<usize, i32> = FxHashMap::default();
    for (v, &c) in component.iter().enumerate() {
        let m = component_min.entry(c).or_insert(rank[v]);
        *m = (*m).min(rank[v]);
    }
    for (v, id) in leaves.iter().enumerate() {
        let shift = component_min.get(&component[v]).copied().unwrap_or(0);
        if let Some(n) = g.node_mut(id) {
            n.rank = Some(rank[v] - shift);
        }
    }

    assign_cluster_spans(g);
    tracing::trace!(
        ranks = rank.iter().max().copied().unwrap_or(0) + 1,
        "assigned ranks"
    );
}

/// Kahn's algorithm, ties broken by insertion order. The input is acyclic at this stage.
fn topological_order(succ: &[Vec<(usize, i32)>], pred: &[Vec<(usize, i32)>]) -> Vec<usize> {
    let mut indegree: Vec<usize> = pred.iter().map(Vec::len).collect();
    let mut ready: std::collections::VecDeque<usize> =
        (0..succ.len()).filter(|&v| indegree[v] == 0).collect();
    let mut out = Vec::with_capacity(succ.len());
    while let Some(v) = ready.pop_front() {
        out.push(v);
        for &(w, _) in &succ[v] {
            indegree[w] -= 1;
            if indegree[w] == 0 {
                ready.push_back(w);
            }
        }
    }
    out
}

fn components(succ: &[Vec<(usize, i32)>]) -> Vec<usize> {
    let mut parent: Vec<usize> = (0..succ.len()).collect();
    fn find(parent: &mut [usize], mut v: usize) -> usize {
        while parent[v] != v {
            parent[v] = parent[parent[v]];
            v = parent[v];
        }
        v
    }
    for (v, out) in succ.iter().enumerate() {
        for &(w, _) in out {
            let (a, b) = (find(&mut parent, v), find(&mut parent, w));
            if a != b {
                parent[a.max(b)] = a.min(b);
            }
        }
    }
    (0..succ.len()).map(|v| find(&mut parent, v)).collect()
}

/// Stores on every cluster the rank span of the leaves it contains.
fn assign_cluster_spans(g: &mut LayoutGraph) {
    fn span(g: &LayoutGraph, id: &str) -> Option<(i32, i32)> {
        let children = g.children(Some(id));
        if children.is_empty() {
            return g.node(id)?.rank.map(|r| (r, r));
        }
        children
            .iter()
            .filter_map(|c| span(g, c))
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }

    let clusters: Vec<String> = g
        .node_ids()
        .into_iter()
        .filter(|id| g.is_cluster(id))
        .collect();
    for id in clusters {
        let s = span(g, &id);
        if let Some(n) = g.node_mut(&id) {
            n.min_rank = s.map(|s| s.0);
            n.max_rank = s.map(|s| s.1);
        }
    }
}
