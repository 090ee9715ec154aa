//! The pipeline works top to bottom. Left to right layouts swap node dimensions on the way in
//! and swap coordinates on the way out; bottom to top and right to left layouts mirror `y`.

use crate::model::{LayoutGraph, RankDir};

pub fn adjust(g: &mut LayoutGraph) {
    if g.graph().rankdir.is_horizontal() {
        swap_width_height(g);
    }
}

pub fn undo(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    if matches!(rankdir, RankDir::BT | RankDir::RL) {
        g.for_each_node_mut(|_, n| n.y = -n.y);
        g.for_each_edge_mut(|_, e| e.points.iter_mut().for_each(|p| p.y = -p.y));
    }
    if rankdir.is_horizontal() {
        g.for_each_node_mut(|_, n| (n.x, n.y) = (n.y, n.x));
        g.for_each_edge_mut(|_, e| {
            e.points
                .iter_mut()
                .for_each(|p| (p.x, p.y) = (p.y, p.x))
        });
        swap_width_height(g);
    }
}

fn swap_width_height(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_, n| (n.width, n.height) = (n.height, n.width));
}
