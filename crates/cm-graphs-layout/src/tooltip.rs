//! Tooltip text and placement.

use cm_graphs_core::format::{TooltipFormat, js_number};
use cm_graphs_core::geom::{Point, Rect};
use cm_graphs_core::text::{TextMeasurer, TextStyle};
use serde::{Deserialize, Serialize};

/// Horizontal and vertical padding around the tooltip text.
pub const TOOLTIP_PADDING: (f64, f64) = (20.0, 16.0);
/// Distance between the pointer and the tooltip box.
pub const TOOLTIP_OFFSET: f64 = 15.0;
pub const TOOLTIP_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipLayout {
    pub text: String,
    pub rect: Rect,
}

pub fn tooltip_text(format: &dyn TooltipFormat, label: &str, value: Option<f64>) -> String {
    let value = value.map(js_number).unwrap_or_default();
    format.format(label, &value)
}

/// Places the box above the pointer, below it when it would cross the top edge, and to the
/// left of it when it would cross the right edge of the graph.
pub fn place_tooltip(
    text: impl Into<String>,
    pointer: Point,
    graph_width: f64,
    measurer: &dyn TextMeasurer,
) -> TooltipLayout {
    let text = text.into();
    let metrics = measurer.measure(&text, &TextStyle::with_size(TOOLTIP_FONT_SIZE));
    let width = metrics.width + TOOLTIP_PADDING.0;
    let height = metrics.height + TOOLTIP_PADDING.1;
    let y = if pointer.y - height - TOOLTIP_OFFSET < 0.0 {
        pointer.y + TOOLTIP_OFFSET
    } else {
        pointer.y - height - TOOLTIP_OFFSET
    };
    let x = if pointer.x + width > graph_width {
        pointer.x - width
    } else {
        pointer.x
    };
    TooltipLayout {
        text,
        rect: Rect::new(x, y, width, height),
    }
}
