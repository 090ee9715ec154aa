//! Pie and donut layout.
//!
//! Slices are sorted by value and split into rings of at most `max_per_ring` slices, the largest
//! values on the inner ring. The first ring spans the full turn; every further ring spans the
//! fraction of the turn its sum represents relative to the first ring. A donut leaves the
//! innermost ring empty. Angles run clockwise from twelve o'clock.

use crate::axis::TextAnchor;
use cm_graphs_core::data::SliceDatum;
use cm_graphs_core::geom::{Bounds, Point, Rect};
use cm_graphs_core::text::{TextMeasurer, TextStyle};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Label polylines whose ends are closer than this vertically are spread apart.
pub const LABEL_MIN_DISTANCE: f64 = 20.0;
pub const LABEL_OFFSET: f64 = 30.0;
/// Length of the horizontal tail of a label polyline.
pub const LABEL_TAIL: f64 = 50.0;
pub const LABEL_RADIUS_FACTOR: f64 = 1.1;
pub const HOVER_RADIUS_FACTOR: f64 = 1.08;
pub const PIE_LABEL_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceLayout {
    pub data: SliceDatum,
    /// Ring number, 1 for the innermost ring.
    pub level: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub hover_outer_radius: f64,
    /// Where the value is written.
    pub centroid: Point,
    /// Polyline from the slice to its outside label.
    pub label_line: [Point; 3],
    pub label_point: Point,
    pub label_anchor: TextAnchor,
}

impl SliceLayout {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieLayout {
    pub radius: f64,
    /// Number of rings, the empty donut hole included.
    pub levels: usize,
    /// Slices in ring order, each ring sorted by descending value.
    pub slices: Vec<SliceLayout>,
    /// Arcs, label lines and label text, centered on the origin.
    pub bounds: Option<Rect>,
}

/// Point at `radius` and `angle` (clockwise from twelve o'clock).
fn polar(radius: f64, angle: f64) -> Point {
    Point::new(radius * angle.sin(), -radius * angle.cos())
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub fn layout_pie(
    data: &[SliceDatum],
    max_per_ring: Option<usize>,
    donut: bool,
    radius: f64,
    measurer: &dyn TextMeasurer,
) -> PieLayout {
    if data.is_empty() {
        return PieLayout {
            radius,
            ..PieLayout::default()
        };
    }
    let mut sorted: Vec<&SliceDatum> = data.iter().collect();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    let rings: Vec<&[&SliceDatum]> = match max_per_ring {
        Some(n) if n > 0 => sorted.chunks(n).collect(),
        _ => vec![&sorted[..]],
    };

    let first_level = if donut { 2 } else { 1 };
    let levels = rings.len() + first_level - 1;
    let band = radius / levels as f64;
    let first_sum: f64 = rings[0].iter().map(|d| d.value).sum();
    let spans: Vec<f64> = rings
        .iter()
        .map(|ring| {
            let sum: f64 = ring.iter().map(|d| d.value).sum();
            if first_sum > 0.0 {
                TAU * sum / first_sum
            } else {
                0.0
            }
        })
        .collect();

    let mut slices = Vec::with_capacity(data.len());
    for (ring_index, ring) in rings.iter().enumerate() {
        let level = ring_index + first_level;
        let positive: f64 = ring.iter().map(|d| d.value).filter(|v| *v > 0.0).sum();
        let k = if positive > 0.0 {
            spans[ring_index] / positive
        } else {
            0.0
        };
        let inner = (level - 1) as f64 * band;
        let outer = level as f64 * band;
        let mut angle = 0.0;
        for d in ring.iter() {
            let start = angle;
            angle += if d.value > 0.0 { d.value * k } else { 0.0 };
            let mid = (start + angle) / 2.0;

            // Labels sit just outside the outermost ring that still covers the slice.
            let covering = spans
                .iter()
                .enumerate()
                .skip(ring_index + 1)
                .take_while(|(_, span)| mid <= **span)
                .last()
                .map_or(level, |(i, _)| i + first_level);
            let label_radius = covering as f64 * band * LABEL_RADIUS_FACTOR;

            let direction = if mid < PI { 1.0 } else { -1.0 };
            let elbow = polar(label_radius, mid);
            slices.push(SliceLayout {
                data: (*d).clone(),
                level,
                start_angle: start,
                end_angle: angle,
                inner_radius: inner,
                outer_radius: outer,
                hover_outer_radius: outer * HOVER_RADIUS_FACTOR,
                centroid: polar((inner + outer) / 2.0, mid),
                label_line: [
                    polar((inner + outer) / 2.0, mid),
                    elbow,
                    Point::new(elbow.x + LABEL_TAIL * direction, elbow.y),
                ],
                label_point: Point::default(),
                label_anchor: if direction > 0.0 {
                    TextAnchor::Start
                } else {
                    TextAnchor::End
                },
            });
        }
    }

    let mut lines: Vec<[Point; 3]> = slices.iter().map(|s| s.label_line).collect();
    avoid_label_overlap(&mut lines);
    for (slice, line) in slices.iter_mut().zip(lines) {
        let direction = if slice.mid_angle() < PI { 1.0 } else { -1.0 };
        slice.label_line = line;
        slice.label_point = Point::new(line[2].x - LABEL_TAIL * direction, line[2].y - 5.0);
    }

    let bounds = pie_bounds(radius, &slices, measurer);
    tracing::debug!(rings = rings.len(), slices = slices.len(), radius, "pie layout");
    PieLayout {
        radius,
        levels,
        slices,
        bounds,
    }
}

/// Spreads label polylines apart vertically.
///
/// Lines are visited by the x of their end. When two ends on the same side are closer than
/// [`LABEL_MIN_DISTANCE`], the second line is pushed outwards by [`LABEL_OFFSET`] vertically,
/// and horizontally by the distance that keeps the slope of its first segment.
pub fn avoid_label_overlap(lines: &mut [[Point; 3]]) {
    let mut order: Vec<usize> = (0..lines.len()).collect();
    order.sort_by(|&a, &b| lines[a][2].x.total_cmp(&lines[b][2].x));
    for &p in &order {
        for &s in &order {
            if p == s || sign(lines[p][2].x) != sign(lines[s][2].x) {
                continue;
            }
            let dy = lines[p][2].y - lines[s][2].y;
            if dy.abs() >= LABEL_MIN_DISTANCE {
                continue;
            }
            let [origin, elbow, _] = lines[s];
            let slope = (origin.y - elbow.y).abs() / (origin.x - elbow.x).abs();
            let dx = LABEL_OFFSET / slope;
            let dx = if dx.is_finite() { dx } else { 0.0 };
            lines[s][1].x += sign(lines[s][1].x) * dx;
            lines[s][2].x += sign(lines[s][2].x) * dx;
            if dy > 0.0 {
                lines[s][1].y = lines[p][1].y + sign(lines[p][1].y) * LABEL_OFFSET;
                lines[s][2].y = lines[p][2].y + sign(lines[p][2].y) * LABEL_OFFSET;
            } else {
                lines[s][1].y += sign(lines[s][1].y) * LABEL_OFFSET;
                lines[s][2].y += sign(lines[s][2].y) * LABEL_OFFSET;
            }
        }
    }
}

fn pie_bounds(radius: f64, slices: &[SliceLayout], measurer: &dyn TextMeasurer) -> Option<Rect> {
    let style = TextStyle::with_size(PIE_LABEL_FONT_SIZE);
    let circle = Rect::new(-radius, -radius, 2.0 * radius, 2.0 * radius);
    let labels = slices.iter().map(|s| {
        let m = measurer.measure(&s.data.label, &style);
        let x = match s.label_anchor {
            TextAnchor::End => s.label_point.x - m.width,
            _ => s.label_point.x,
        };
        Rect::new(x, s.label_point.y - m.height, m.width, m.height)
    });
    let points = slices
        .iter()
        .flat_map(|s| s.label_line.iter().map(|p| (p.x, p.y)));
    let boxes = Bounds::from_rects(std::iter::once(circle).chain(labels))?;
    Some(match Bounds::from_points(points) {
        Some(b) => boxes.union(&b).to_rect(),
        None => boxes.to_rect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_graphs_core::data::SliceStyle;
    use cm_graphs_core::text::DeterministicTextMeasurer;

    fn slices(values: &[f64]) -> Vec<SliceDatum> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SliceDatum {
                id: format!("s{i}"),
                label: format!("S{i}"),
                value: *v,
                slice: SliceStyle {
                    color: "red".into(),
                },
                extra_data: serde_json::json!({}),
            })
            .collect()
    }

    #[test]
    fn first_ring_spans_the_turn_in_descending_order() {
        let m = DeterministicTextMeasurer::default();
        let pie = layout_pie(&slices(&[1.0, 3.0]), None, false, 100.0, &m);
        assert_eq!(pie.levels, 1);
        assert_eq!(pie.slices[0].data.value, 3.0);
        assert_eq!(pie.slices[0].start_angle, 0.0);
        assert!((pie.slices[1].end_angle - TAU).abs() < 1e-12);
        assert!((pie.slices[0].end_angle - TAU * 0.75).abs() < 1e-12);
    }

    #[test]
    fn outer_rings_span_their_share_of_the_first_ring() {
        let m = DeterministicTextMeasurer::default();
        let pie = layout_pie(&slices(&[4.0, 4.0, 1.0, 1.0]), Some(2), true, 90.0, &m);
        // hole, ring of 8 and ring of 2
        assert_eq!(pie.levels, 3);
        let outer: Vec<&SliceLayout> = pie.slices.iter().filter(|s| s.level == 3).collect();
        assert_eq!(outer.len(), 2);
        assert!((outer[1].end_angle - TAU * 0.25).abs() < 1e-12);
        assert_eq!(outer[0].inner_radius, 60.0);
        assert_eq!(pie.slices[0].inner_radius, 30.0);
    }

    #[test]
    fn close_labels_are_pushed_apart() {
        let mut lines = vec![
            [Point::new(10.0, 10.0), Point::new(20.0, 20.0), Point::new(70.0, 20.0)],
            [Point::new(10.0, 12.0), Point::new(20.0, 25.0), Point::new(71.0, 25.0)],
        ];
        avoid_label_overlap(&mut lines);
        assert!((lines[1][2].y - lines[0][2].y).abs() >= LABEL_MIN_DISTANCE);
    }
}
