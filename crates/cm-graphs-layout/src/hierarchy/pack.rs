//! Circle packing.
//!
//! Leaves get a radius of `sqrt(value)`; siblings are packed with a front-chain placement and
//! wrapped in their smallest enclosing circle (Welzl, with a seeded shuffle so the result is
//! reproducible). A first pass packs without padding to learn the root radius, a second pass
//! packs with the padding rescaled to that radius, and a final pass scales everything into the
//! target size.

use super::{Hierarchy, NodeId};
use cm_graphs_core::geom::Size;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }
}

/// Linear congruential generator used to shuffle circles before enclosing them.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Default for Lcg {
    fn default() -> Self {
        Self(1)
    }
}

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    pub fn next_f64(&mut self) -> f64 {
        self.0 = (Self::A * self.0 + Self::C) % Self::M;
        self.0 as f64 / Self::M as f64
    }
}

/// Packs the whole hierarchy, hidden nodes included, into `size`.
///
/// Node values must already be summed. Positions are absolute, the root sits at the center.
pub fn pack<T>(h: &mut Hierarchy<T>, size: Size, padding: f64) {
    if h.is_empty() {
        return;
    }
    let mut rng = Lcg::default();
    let root = h.root();
    let order = h.post_order(root);

    for id in &order {
        let node = h.node_mut(*id);
        if node.all_children().is_empty() {
            node.r = node.value.max(0.0).sqrt();
        }
    }
    for id in &order {
        pack_children(h, *id, 0.0, &mut rng);
    }
    let extent = size.width.min(size.height);
    let root_r = h.node(root).r;
    if !(root_r > 0.0) || !(extent > 0.0) {
        tracing::warn!(root_radius = root_r, "nothing to pack");
        for id in h.all_descendants(root) {
            let node = h.node_mut(id);
            node.x = size.width / 2.0;
            node.y = size.height / 2.0;
            node.r = 0.0;
        }
        return;
    }
    let k = root_r / extent;
    for id in &order {
        pack_children(h, *id, padding * k, &mut rng);
    }

    let k = extent / (2.0 * h.node(root).r);
    {
        let r = h.node_mut(root);
        r.x = size.width / 2.0;
        r.y = size.height / 2.0;
    }
    for id in h.all_descendants(root) {
        let parent = h.node(id).parent.map(|p| (h.node(p).x, h.node(p).y));
        let node = h.node_mut(id);
        node.r *= k;
        if let Some((px, py)) = parent {
            node.x = px + k * node.x;
            node.y = py + k * node.y;
        }
    }
    tracing::debug!(nodes = h.len(), scale = k, "circle pack");
}

fn pack_children<T>(h: &mut Hierarchy<T>, id: NodeId, pad: f64, rng: &mut Lcg) {
    let children: Vec<NodeId> = h.node(id).all_children().to_vec();
    if children.is_empty() {
        return;
    }
    let mut circles: Vec<Circle> = children
        .iter()
        .map(|c| {
            let n = h.node(*c);
            Circle::new(n.x, n.y, n.r + pad)
        })
        .collect();
    let enclosing = pack_siblings(&mut circles, rng);
    for (c, circle) in children.iter().zip(&circles) {
        let n = h.node_mut(*c);
        n.x = circle.x;
        n.y = circle.y;
    }
    h.node_mut(id).r = enclosing + pad;
}

/// Places circles side by side around the origin; returns the enclosing radius.
pub fn pack_siblings(circles: &mut [Circle], rng: &mut Lcg) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }
    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }
    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }
    let (a0, b0) = (circles[0], circles[1]);
    place(b0, a0, &mut circles[2]);

    // Front chain as a circular doubly linked list over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    let (mut a, mut b) = (0usize, 1usize);
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let mut i = 3;
    'pack: while i < n {
        let (ca, cb) = (circles[a], circles[b]);
        place(ca, cb, &mut circles[i]);
        let c = i;

        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(&circles[j], &circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        let score = |x: usize| -> f64 {
            let (p, q) = (circles[x], circles[next[x]]);
            let ab = p.r + q.r;
            let dx = (p.x * q.r + q.x * p.r) / ab;
            let dy = (p.y * q.r + q.y * p.r) / ab;
            dx * dx + dy * dy
        };
        let mut best = score(a);
        let mut cur = next[c];
        while cur != b {
            let s = score(cur);
            if s < best {
                a = cur;
                best = s;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut cur = next[b];
    while cur != b {
        chain.push(circles[cur]);
        cur = next[cur];
    }
    let e = enclose(&chain, rng);
    for circle in circles.iter_mut() {
        circle.x -= e.x;
        circle.y -= e.y;
    }
    e.r
}

/// Places `c` tangent to both `a` and `b`.
fn place(b: Circle, a: Circle, c: &mut Circle) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 == 0.0 {
        c.x = a.x + c.r;
        c.y = a.y;
        return;
    }
    let a2 = (a.r + c.r).powi(2);
    let b2 = (b.r + c.r).powi(2);
    if a2 > b2 {
        let x = (d2 + b2 - a2) / (2.0 * d2);
        let y = (b2 / d2 - x * x).max(0.0).sqrt();
        c.x = b.x - x * dx - y * dy;
        c.y = b.y - x * dy + y * dx;
    } else {
        let x = (d2 + a2 - b2) / (2.0 * d2);
        let y = (a2 / d2 - x * x).max(0.0).sqrt();
        c.x = a.x + x * dx - y * dy;
        c.y = a.y + x * dy + y * dx;
    }
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Smallest circle enclosing every circle.
pub fn enclose(circles: &[Circle], rng: &mut Lcg) -> Circle {
    let mut shuffled = circles.to_vec();
    let mut m = shuffled.len();
    while m > 0 {
        let i = (rng.next_f64() * m as f64) as usize;
        m -= 1;
        shuffled.swap(m, i);
    }

    let mut basis: Vec<Circle> = Vec::new();
    let mut e: Option<Circle> = None;
    let mut i = 0;
    while i < shuffled.len() {
        let p = shuffled[i];
        if e.is_some_and(|e| encloses_weak(&e, &p)) {
            i += 1;
            continue;
        }
        let Some(next) = extend_basis(&basis, p) else {
            tracing::warn!(circles = circles.len(), "degenerate enclosing circle");
            return bounding_circle(circles);
        };
        basis = next;
        e = Some(enclose_basis(&basis));
        i = 0;
    }
    e.unwrap_or(Circle::new(0.0, 0.0, 0.0))
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(&p, basis) {
        return Some(vec![p]);
    }
    for b in basis {
        if encloses_not(&p, b) && encloses_weak_all(&enclose2(b, &p), basis) {
            return Some(vec![*b, p]);
        }
    }
    for (i, bi) in basis.iter().enumerate() {
        for bj in &basis[i + 1..] {
            if encloses_not(&enclose2(bi, bj), &p)
                && encloses_not(&enclose2(bi, &p), bj)
                && encloses_not(&enclose2(bj, &p), bi)
                && encloses_weak_all(&enclose3(bi, bj, &p), basis)
            {
                return Some(vec![*bi, *bj, p]);
            }
        }
    }
    None
}

fn encloses_not(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: &Circle, b: &Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose2(a, b),
        [a, b, c] => enclose3(a, b, c),
        _ => bounding_circle(basis),
    }
}

fn enclose2(a: &Circle, b: &Circle) -> Circle {
    let (x21, y21, r21) = (b.x - a.x, b.y - a.y, b.r - a.r);
    let l = (x21 * x21 + y21 * y21).sqrt();
    Circle::new(
        (a.x + b.x + x21 / l * r21) / 2.0,
        (a.y + b.y + y21 / l * r21) / 2.0,
        (l + a.r + b.r) / 2.0,
    )
}

fn enclose3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (a2, a3) = (x1 - b.x, x1 - c.x);
    let (b2, b3) = (y1 - b.y, y1 - c.y);
    let (c2, c3) = (b.r - r1, c.r - r1);
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - b.x * b.x - b.y * b.y + b.r * b.r;
    let d3 = d1 - c.x * c.x - c.y * c.y + c.r * c.r;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });
    Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}

/// Loose enclosing circle around the bounding box; only used when the exact basis fails.
fn bounding_circle(circles: &[Circle]) -> Circle {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in circles {
        min_x = min_x.min(c.x - c.r);
        min_y = min_y.min(c.y - c.r);
        max_x = max_x.max(c.x + c.r);
        max_y = max_y.max(c.y + c.r);
    }
    if !min_x.is_finite() {
        return Circle::new(0.0, 0.0, 0.0);
    }
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    let r = circles
        .iter()
        .map(|c| (c.x - cx).hypot(c.y - cy) + c.r)
        .fold(0.0, f64::max);
    Circle::new(cx, cy, r)
}
