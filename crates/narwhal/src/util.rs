use crate::model::{LayoutGraph, Point};

/// A fresh node id starting with `prefix`.
pub fn unique_id(g: &LayoutGraph, prefix: &str) -> String {
    let mut i = g.node_count();
    loop {
        let id = format!("{prefix}{i}");
        if !g.has_node(&id) {
            return id;
        }
        i += 1;
    }
}

/// Point where the segment from the center of a `width x height` box to `toward` leaves the
/// box. Returns the center itself when `toward` coincides with it.
pub fn intersect_rect(center: Point, width: f64, height: f64, toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    let w = width / 2.0;
    let h = height / 2.0;
    if (dx == 0.0 && dy == 0.0) || (w == 0.0 && h == 0.0) {
        return center;
    }

    let (sx, sy) = if dy.abs() * w > dx.abs() * h {
        let h = if dy < 0.0 { -h } else { h };
        (h * dx / dy, h)
    } else {
        let w = if dx < 0.0 { -w } else { w };
        (w, w * dy / dx)
    };
    Point::new(center.x + sx, center.y + sy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_lands_on_the_closer_side() {
        let c = Point::new(0.0, 0.0);
        assert_eq!(intersect_rect(c, 20.0, 10.0, Point::new(0.0, 50.0)), Point::new(0.0, 5.0));
        assert_eq!(intersect_rect(c, 20.0, 10.0, Point::new(-40.0, 0.0)), Point::new(-10.0, 0.0));
        assert_eq!(intersect_rect(c, 20.0, 10.0, Point::new(20.0, 20.0)), Point::new(5.0, 5.0));
    }
}
