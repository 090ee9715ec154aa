//! Arena of hierarchy nodes shared by the tree and bubble charts.
//!
//! Every node keeps either its visible `children` or its hidden collapsed children, never both.
//! Collapsing moves the child list aside untouched, so expanding restores exactly the subtree
//! that was hidden.

pub mod pack;
pub mod tree;

use cm_graphs_core::data::{BubbleDatum, TreeDatum};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Records that nest their children.
pub trait Nested: Sized {
    fn nested(&self) -> &[Self];
}

impl Nested for TreeDatum {
    fn nested(&self) -> &[Self] {
        &self.children
    }
}

impl Nested for BubbleDatum {
    fn nested(&self) -> &[Self] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode<T> {
    pub data: T,
    pub depth: usize,
    pub parent: Option<NodeId>,
    children: Vec<NodeId>,
    collapsed: Vec<NodeId>,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl<T> HierarchyNode<T> {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn collapsed_children(&self) -> &[NodeId] {
        &self.collapsed
    }

    /// Visible or hidden children, whichever list is populated.
    pub fn all_children(&self) -> &[NodeId] {
        if self.children.is_empty() {
            &self.collapsed
        } else {
            &self.children
        }
    }

    pub fn is_collapsed(&self) -> bool {
        !self.collapsed.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy<T> {
    nodes: Vec<HierarchyNode<T>>,
}

impl<T> Hierarchy<T> {
    /// Builds the arena from a nested record; ids are assigned in pre-order, the root first.
    pub fn from_nested<D: Nested>(root: &D, mut data: impl FnMut(&D) -> T) -> Self {
        let mut nodes = Vec::new();
        let mut stack: Vec<(&D, Option<NodeId>, usize)> = vec![(root, None, 0)];
        while let Some((record, parent, depth)) = stack.pop() {
            let id = NodeId(nodes.len());
            nodes.push(HierarchyNode {
                data: data(record),
                depth,
                parent,
                children: Vec::new(),
                collapsed: Vec::new(),
                value: 0.0,
                x: 0.0,
                y: 0.0,
                r: 0.0,
            });
            if let Some(p) = parent {
                nodes[p.0].children.push(id);
            }
            for child in record.nested().iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode<T> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut HierarchyNode<T> {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyNode<T>> {
        self.nodes.get(id.0)
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<NodeId> {
        self.nodes.iter().position(|n| pred(&n.data)).map(NodeId)
    }

    /// Hides the children of `id`. Returns whether anything changed.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        if node.children.is_empty() {
            return false;
        }
        node.collapsed = std::mem::take(&mut node.children);
        true
    }

    pub fn expand(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        if node.collapsed.is_empty() {
            return false;
        }
        node.children = std::mem::take(&mut node.collapsed);
        true
    }

    pub fn toggle(&mut self, id: NodeId) -> bool {
        self.collapse(id) || self.expand(id)
    }

    /// Collapses every node at `depth >= level`, hidden descendants included.
    pub fn collapse_from_depth(&mut self, level: usize) -> usize {
        let targets: Vec<NodeId> = self
            .all_descendants(self.root())
            .into_iter()
            .filter(|id| self.nodes[id.0].depth >= level)
            .collect();
        targets.into_iter().filter(|id| self.collapse(*id)).count()
    }

    /// Visible subtree of `id` in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, |n| n.children())
    }

    /// Whole subtree of `id` in pre-order, hidden nodes included.
    pub fn all_descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, |n| n.all_children())
    }

    fn walk(&self, id: NodeId, next: impl Fn(&HierarchyNode<T>) -> &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(next(&self.nodes[cur.0]).iter().rev().copied());
        }
        out
    }

    /// Children-first order over the whole subtree, hidden nodes included.
    pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        // Pre-order with reversed children, reversed, is a post-order.
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.nodes[cur.0].all_children().iter().copied());
        }
        out.reverse();
        out
    }

    /// Deepest visible or hidden level below the root.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes[id.0].parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.nodes[p.0].parent;
        }
        out
    }

    /// Sets every node's value to its own value plus the sum over its subtree.
    pub fn sum(&mut self, own: impl Fn(&T) -> f64) {
        for id in self.post_order(self.root()) {
            let own = own(&self.nodes[id.0].data);
            let own = if own.is_finite() { own } else { 0.0 };
            let total: f64 = self.nodes[id.0]
                .all_children()
                .iter()
                .map(|c| self.nodes[c.0].value)
                .sum();
            self.nodes[id.0].value = own + total;
        }
    }

    /// Orders siblings by descending value; equal values keep their order.
    pub fn sort_by_value_desc(&mut self) {
        let values: Vec<f64> = self.nodes.iter().map(|n| n.value).collect();
        for node in &mut self.nodes {
            node.children
                .sort_by(|a, b| values[b.0].total_cmp(&values[a.0]));
            node.collapsed
                .sort_by(|a, b| values[b.0].total_cmp(&values[a.0]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rec(&'static str, Vec<Rec>);

    impl Nested for Rec {
        fn nested(&self) -> &[Self] {
            &self.1
        }
    }

    fn sample() -> Hierarchy<&'static str> {
        let root = Rec(
            "r",
            vec![Rec("a", vec![Rec("a1", vec![])]), Rec("b", vec![])],
        );
        Hierarchy::from_nested(&root, |r| r.0)
    }

    #[test]
    fn ids_are_pre_order() {
        let h = sample();
        let names: Vec<&str> = h.descendants(h.root()).iter().map(|id| h.node(*id).data).collect();
        assert_eq!(names, ["r", "a", "a1", "b"]);
        assert_eq!(h.node(NodeId(2)).depth, 2);
    }

    #[test]
    fn post_order_visits_children_first() {
        let h = sample();
        let names: Vec<&str> = h.post_order(h.root()).iter().map(|id| h.node(*id).data).collect();
        assert_eq!(names, ["a1", "a", "b", "r"]);
    }
}
