//! Tidy tree layout (Reingold-Tilford as improved by Buchheim, Jünger and Leipert).
//!
//! Only visible nodes take part. `x` is the breadth coordinate in units of the node width and
//! `y` the depth coordinate, both then multiplied by the node size.

use super::{Hierarchy, NodeId};

struct Walker {
    node: Option<NodeId>,
    parent: usize,
    children: Vec<usize>,
    /// Index among its siblings.
    i: usize,
    /// Ancestor pointer used while apportioning.
    a: usize,
    /// Default ancestor recorded on the parent.
    ancestor: Option<usize>,
    z: f64,
    m: f64,
    c: f64,
    s: f64,
    thread: Option<usize>,
}

impl Walker {
    fn new(node: Option<NodeId>, parent: usize, i: usize, index: usize) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            i,
            a: index,
            ancestor: None,
            z: 0.0,
            m: 0.0,
            c: 0.0,
            s: 0.0,
            thread: None,
        }
    }
}

/// Lays out the visible tree below the root.
///
/// `separation(same_parent)` is the gap between two neighbours in units of `node_size[0]`.
pub fn tidy_tree<T>(h: &mut Hierarchy<T>, node_size: [f64; 2], separation: impl Fn(bool) -> f64) {
    if h.is_empty() {
        return;
    }
    let mut layout = TidyTree {
        w: Vec::new(),
        separation: &separation,
    };
    layout.build(h);
    for v in layout.post_order() {
        layout.first_walk(v);
    }
    layout.w[0].m = -layout.w[1].z;
    for v in layout.pre_order() {
        let parent_m = layout.w[layout.w[v].parent].m;
        let x = layout.w[v].z + parent_m;
        layout.w[v].m += parent_m;
        if let Some(id) = layout.w[v].node {
            let node = h.node_mut(id);
            node.x = x * node_size[0];
            node.y = node.depth as f64 * node_size[1];
        }
    }
}

struct TidyTree<'a> {
    /// Index 0 is a virtual parent of the root, index 1 the root.
    w: Vec<Walker>,
    separation: &'a dyn Fn(bool) -> f64,
}

impl TidyTree<'_> {
    fn build<T>(&mut self, h: &Hierarchy<T>) {
        self.w.push(Walker::new(None, 0, 0, 0));
        self.w.push(Walker::new(Some(h.root()), 0, 0, 1));
        self.w[0].children.push(1);
        let mut stack = vec![1usize];
        while let Some(v) = stack.pop() {
            let Some(id) = self.w[v].node else {
                continue;
            };
            for (i, child) in h.node(id).children().iter().enumerate() {
                let index = self.w.len();
                self.w.push(Walker::new(Some(*child), v, i, index));
                self.w[v].children.push(index);
                stack.push(index);
            }
        }
    }

    fn pre_order(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![1usize];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(self.w[v].children.iter().rev().copied());
        }
        out
    }

    fn post_order(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![1usize];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(self.w[v].children.iter().copied());
        }
        out.reverse();
        out
    }

    fn sep(&self, a: usize, b: usize) -> f64 {
        (self.separation)(self.w[a].parent == self.w[b].parent)
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.w[v].children.first().copied().or(self.w[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.w[v].children.last().copied().or(self.w[v].thread)
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.w[wp].i as f64 - self.w[wm].i as f64);
        self.w[wp].c -= change;
        self.w[wp].s += shift;
        self.w[wm].c += change;
        self.w[wp].z += shift;
        self.w[wp].m += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let (mut shift, mut change) = (0.0, 0.0);
        let children = self.w[v].children.clone();
        for c in children.into_iter().rev() {
            let node = &mut self.w[c];
            node.z += shift;
            node.m += shift;
            change += node.c;
            shift += node.s + change;
        }
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let a = self.w[vim].a;
        if self.w[a].parent == self.w[v].parent {
            a
        } else {
            ancestor
        }
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.w[v].parent;
        let left = match self.w[v].i {
            0 => None,
            i => Some(self.w[parent].children[i - 1]),
        };
        if let (Some(&first), Some(&last)) = (self.w[v].children.first(), self.w[v].children.last())
        {
            self.execute_shifts(v);
            let midpoint = (self.w[first].z + self.w[last].z) / 2.0;
            if let Some(l) = left {
                self.w[v].z = self.w[l].z + self.sep(v, l);
                self.w[v].m = self.w[v].z - midpoint;
            } else {
                self.w[v].z = midpoint;
            }
        } else if let Some(l) = left {
            self.w[v].z = self.w[l].z + self.sep(v, l);
        }
        let default_ancestor = self.w[parent]
            .ancestor
            .unwrap_or(self.w[parent].children[0]);
        let ancestor = self.apportion(v, left, default_ancestor);
        self.w[parent].ancestor = Some(ancestor);
    }

    fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
        let Some(left) = left else {
            return ancestor;
        };
        let (mut vip, mut vop, mut vim) = (v, v, left);
        let mut vom = self.w[self.w[v].parent].children[0];
        let (mut sip, mut sop) = (self.w[vip].m, self.w[vop].m);
        let (mut sim, mut som) = (self.w[vim].m, self.w[vom].m);

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = om;
            vop = op;
            self.w[vop].a = v;
            let shift = self.w[vim].z + sim - self.w[vip].z - sip + self.sep(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.w[vim].m;
            sip += self.w[vip].m;
            som += self.w[vom].m;
            sop += self.w[vop].m;
            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }
        if let (Some(im), None) = (next_im, self.next_right(vop)) {
            self.w[vop].thread = Some(im);
            self.w[vop].m += sim - sop;
        }
        if let (Some(ip), None) = (next_ip, self.next_left(vom)) {
            self.w[vom].thread = Some(ip);
            self.w[vom].m += sip - som;
            ancestor = v;
        }
        ancestor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Nested;

    struct Rec(Vec<Rec>);

    impl Nested for Rec {
        fn nested(&self) -> &[Self] {
            &self.0
        }
    }

    #[test]
    fn parent_is_centered_over_children() {
        let root = Rec(vec![Rec(vec![]), Rec(vec![]), Rec(vec![])]);
        let mut h = Hierarchy::from_nested(&root, |_| ());
        tidy_tree(&mut h, [10.0, 50.0], |same| if same { 1.0 } else { 2.0 });
        let xs: Vec<f64> = h.node(h.root()).children().iter().map(|c| h.node(*c).x).collect();
        assert_eq!(xs, vec![-10.0, 0.0, 10.0]);
        assert_eq!(h.node(h.root()).x, 0.0);
        assert_eq!(h.node(h.node(h.root()).children()[0]).y, 50.0);
    }

    #[test]
    fn cousins_use_the_wider_separation() {
        let root = Rec(vec![Rec(vec![Rec(vec![])]), Rec(vec![Rec(vec![])])]);
        let mut h = Hierarchy::from_nested(&root, |_| ());
        tidy_tree(&mut h, [1.0, 1.0], |same| if same { 1.0 } else { 2.0 });
        let leaves: Vec<f64> = h
            .descendants(h.root())
            .into_iter()
            .filter(|id| h.node(*id).depth == 2)
            .map(|id| h.node(id).x)
            .collect();
        assert_eq!(leaves[1] - leaves[0], 2.0);
    }
}
