//! Legend entries and placement.
//!
//! Entries flow top to bottom for left/right legends, wrapping into a new column when the next
//! entry would reach the graph height, and left to right for top/bottom legends, wrapping into a
//! new row at the graph width.

use cm_graphs_core::config::LegendPosition;
use cm_graphs_core::geom::{Point, Rect, Size};
use cm_graphs_core::text::{TextMeasurer, TextStyle};
use serde::{Deserialize, Serialize};

pub const LEGEND_SWATCH: f64 = 15.0;
pub const LEGEND_PADDING_TOP: f64 = 15.0;
pub const LEGEND_PADDING_RIGHT: f64 = 10.0;
/// Padding between the legend border and its entries.
pub const LEGEND_CONTAINER_PADDING: f64 = 10.0;
pub const LEGEND_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    /// Top-left corner of the swatch, relative to the legend.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text_x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendLayout {
    pub position: LegendPosition,
    pub entries: Vec<LegendEntry>,
    /// Bounding box of the entries.
    pub size: Size,
    /// Space the legend takes away from the graph on its side.
    pub dimension: f64,
    /// Translation of the legend relative to the graph group.
    pub translate: Point,
}

/// Extra space between the graph area and a legend placed after it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegendGap {
    pub right: f64,
    pub bottom: f64,
}

impl LegendLayout {
    /// Lays entries out against a graph area of `graph` size; call [`LegendLayout::place`] once
    /// the final graph size is known.
    pub fn build(
        items: &[LegendItem],
        position: LegendPosition,
        graph: Size,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let style = TextStyle::with_size(LEGEND_FONT_SIZE);
        let text_x = LEGEND_SWATCH + LEGEND_PADDING_RIGHT;
        let boxes: Vec<Size> = items
            .iter()
            .map(|item| {
                let m = measurer.measure(&item.label, &style);
                Size::new(text_x + m.width, m.height.max(LEGEND_SWATCH))
            })
            .collect();

        let mut entries = Vec::with_capacity(items.len());
        let (mut x, mut y) = (0.0, 0.0);
        let (mut column_x, mut column_width, mut row) = (0.0, 0.0f64, 0usize);
        for (item, size) in items.iter().zip(&boxes) {
            let (ex, ey) = if position.is_vertical() {
                let step = size.height + LEGEND_PADDING_TOP;
                if y > 0.0 && y + step >= graph.height {
                    y = 0.0;
                    column_x += column_width;
                    column_width = 0.0;
                }
                let base = if position == LegendPosition::Right {
                    LEGEND_PADDING_RIGHT
                } else {
                    0.0
                };
                let at = (base + column_x, y);
                y += step;
                column_width = column_width.max(size.width + LEGEND_PADDING_TOP);
                at
            } else {
                let step = size.width + LEGEND_PADDING_TOP;
                if x > 0.0 && x + step >= graph.width {
                    x = 0.0;
                    row += 1;
                }
                let base = if position == LegendPosition::Bottom {
                    LEGEND_PADDING_TOP
                } else {
                    0.0
                };
                let at = (x, base + (LEGEND_SWATCH + LEGEND_PADDING_TOP) * row as f64);
                x += step;
                at
            };
            entries.push(LegendEntry {
                label: item.label.clone(),
                color: item.color.clone(),
                x: ex + LEGEND_CONTAINER_PADDING,
                y: ey + LEGEND_CONTAINER_PADDING,
                width: size.width,
                height: size.height,
                text_x,
            });
        }

        let size = Size::new(
            entries.iter().map(|e| e.x + e.width).fold(0.0, f64::max) - LEGEND_CONTAINER_PADDING,
            entries.iter().map(|e| e.y + e.height).fold(0.0, f64::max) - LEGEND_CONTAINER_PADDING,
        );
        let size = Size::new(size.width.max(0.0), size.height.max(0.0));
        let dimension = if position.is_vertical() {
            size.width
        } else {
            size.height
        } + 2.0 * LEGEND_CONTAINER_PADDING;

        Self {
            position,
            entries,
            size,
            dimension,
            translate: Point::default(),
        }
    }

    /// Moves the legend next to a graph area of the final size.
    pub fn place(&mut self, graph: Size, gap: LegendGap) {
        self.translate = match self.position {
            LegendPosition::Left => Point::new(-self.dimension, 0.0),
            LegendPosition::Right => Point::new(graph.width + gap.right, 0.0),
            LegendPosition::Top => {
                Point::new((graph.width - self.size.width) / 2.0, -self.dimension)
            }
            LegendPosition::Bottom => Point::new(
                (graph.width - self.size.width) / 2.0,
                graph.height + gap.bottom,
            ),
        };
    }

    /// Moves the legend next to arbitrary drawn content, as pie charts do: beside it and top
    /// aligned for left/right legends, centered above or below it otherwise.
    pub fn place_around(&mut self, content: Rect) {
        self.translate = match self.position {
            LegendPosition::Left => Point::new(content.x - self.dimension, content.y),
            LegendPosition::Right => Point::new(content.x + content.width, content.y),
            LegendPosition::Top | LegendPosition::Bottom => {
                let x = content.x - (self.size.width - content.width) / 2.0;
                let y = if self.position == LegendPosition::Top {
                    content.y - self.dimension
                } else {
                    content.y + content.height
                };
                Point::new(x, y)
            }
        };
    }

    /// Area covered by the legend once translated.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.translate.x,
            self.translate.y,
            self.size.width + 2.0 * LEGEND_CONTAINER_PADDING,
            self.size.height + 2.0 * LEGEND_CONTAINER_PADDING,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_graphs_core::text::DeterministicTextMeasurer;

    fn items(n: usize) -> Vec<LegendItem> {
        (0..n)
            .map(|i| LegendItem {
                label: format!("Group-{i}"),
                color: "red".into(),
            })
            .collect()
    }

    #[test]
    fn vertical_legend_wraps_into_columns() {
        let m = DeterministicTextMeasurer::default();
        let legend = LegendLayout::build(
            &items(4),
            LegendPosition::Left,
            Size::new(500.0, 70.0),
            &m,
        );
        let xs: Vec<f64> = legend.entries.iter().map(|e| e.x).collect();
        assert_eq!(xs[0], xs[1]);
        assert!(xs[2] > xs[1]);
        assert_eq!(legend.entries[2].y, LEGEND_CONTAINER_PADDING);
    }

    #[test]
    fn horizontal_legend_is_centered_below_the_graph() {
        let m = DeterministicTextMeasurer::default();
        let mut legend = LegendLayout::build(
            &items(2),
            LegendPosition::Bottom,
            Size::new(500.0, 300.0),
            &m,
        );
        legend.place(Size::new(500.0, 300.0), LegendGap { right: 0.0, bottom: 20.0 });
        assert_eq!(legend.translate.y, 320.0);
        assert!((legend.translate.x * 2.0 + legend.size.width - 500.0).abs() < 1e-9);
        assert_eq!(legend.dimension, legend.size.height + 20.0);
    }
}
