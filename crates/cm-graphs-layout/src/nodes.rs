//! Node shapes shared by the tree and flow charts: label wrapping, box sizes and anchors.

use cm_graphs_core::config::{NodeShape, Padding};
use cm_graphs_core::data::NodeStyle;
use cm_graphs_core::geom::{Point, Rect, Size};
use cm_graphs_core::text::{TextMeasurer, TextStyle};
use serde::{Deserialize, Serialize};

pub const NODE_LABEL_FONT_SIZE: f64 = 12.0;
/// Line advance of wrapped labels, in em.
pub const LABEL_LINE_HEIGHT: f64 = 1.1;
/// A word starting with this marker always begins a new line.
pub const FORCED_BREAK: &str = "%nl%";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelLines {
    pub lines: Vec<String>,
    pub width: f64,
    pub height: f64,
}

/// Greedy word wrap of `text` into lines no wider than `max_width`.
///
/// A single word wider than the limit keeps a line of its own.
pub fn wrap_label(text: &str, max_width: Option<f64>, measurer: &dyn TextMeasurer) -> LabelLines {
    let style = TextStyle::with_size(NODE_LABEL_FONT_SIZE);
    let measure = |s: &str| measurer.measure(s, &style).width;
    let mut lines: Vec<String> = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        let (word, forced) = match word.strip_prefix(FORCED_BREAK) {
            Some(rest) => (rest, true),
            None => (word, false),
        };
        if !line.is_empty() {
            let candidate = format!("{} {word}", line.join(" "));
            let too_wide = max_width.is_some_and(|w| measure(&candidate) > w);
            if forced || too_wide {
                lines.push(line.join(" "));
                line.clear();
            }
        }
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }
    if lines.is_empty() {
        return LabelLines::default();
    }
    let width = lines.iter().map(|l| measure(l)).fold(0.0, f64::max);
    let height = lines.len() as f64 * NODE_LABEL_FONT_SIZE * LABEL_LINE_HEIGHT;
    LabelLines {
        lines,
        width,
        height,
    }
}

/// Width a label may take inside its shape; circle labels sit below the node unconstrained.
pub fn label_width(style: &NodeStyle) -> Option<f64> {
    match style.shape {
        NodeShape::Circle => None,
        NodeShape::Rect => Some(style.rectangle_dimensions.width),
        NodeShape::Square => Some(style.square_dimensions),
        NodeShape::Rhombus => Some(style.rhombus_dimensions * std::f64::consts::SQRT_2),
    }
}

/// Bounding box of a node: the shape grown to fit its label, plus label padding.
///
/// Rhombi are drawn as rotated squares, so their box is the diagonal. Square and rhombus use the
/// larger of the horizontal and vertical padding on both sides.
pub fn node_size(style: &NodeStyle, padding: &Padding, label: &LabelLines) -> Size {
    let uniform = padding.horizontal().max(padding.vertical());
    match style.shape {
        NodeShape::Circle => {
            let d = 2.0 * style.circle_radius;
            Size::new(d, d)
        }
        NodeShape::Rect => Size::new(
            label.width.max(style.rectangle_dimensions.width) + padding.horizontal(),
            label.height.max(style.rectangle_dimensions.height) + padding.vertical(),
        ),
        NodeShape::Square => Size::new(
            label.width.max(style.square_dimensions) + uniform,
            label.height.max(style.square_dimensions) + uniform,
        ),
        NodeShape::Rhombus => {
            let d = style.rhombus_dimensions * std::f64::consts::SQRT_2;
            Size::new(label.width.max(d) + uniform, label.height.max(d) + uniform)
        }
    }
}

/// Point the node group is translated to: the center of circles, the top left corner of
/// rectangles and squares, the top vertex of rhombi.
pub fn node_origin(shape: NodeShape, center: Point, size: Size) -> Point {
    match shape {
        NodeShape::Circle => center,
        NodeShape::Rect | NodeShape::Square => {
            Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
        }
        NodeShape::Rhombus => Point::new(center.x, center.y - size.height / 2.0),
    }
}

/// Top of the label block relative to the node origin, horizontally at the label center.
pub fn label_offset(style: &NodeStyle, size: Size, label: &LabelLines) -> Point {
    let icon = if style.icon.is_some() {
        size.height / 4.0
    } else {
        0.0
    };
    match style.shape {
        NodeShape::Circle => Point::new(0.0, style.circle_radius),
        NodeShape::Rect | NodeShape::Square => {
            Point::new(size.width / 2.0, (size.height - label.height) / 2.0 + icon)
        }
        NodeShape::Rhombus => Point::new(0.0, (size.height - label.height) / 2.0 + icon),
    }
}

/// Area covered by the node and its label, in absolute coordinates.
pub fn node_extent(style: &NodeStyle, center: Point, size: Size, label: &LabelLines) -> Rect {
    let body = Rect::from_center(center, size);
    if style.shape != NodeShape::Circle || label.lines.is_empty() {
        return body;
    }
    let below = Rect::new(
        center.x - label.width / 2.0,
        center.y + style.circle_radius,
        label.width,
        label.height,
    );
    body.bounds().union(&below.bounds()).to_rect()
}
