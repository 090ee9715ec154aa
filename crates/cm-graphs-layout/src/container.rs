//! Container and graph area dimensions.

use cm_graphs_core::config::{LegendPosition, Margin, Orientation};
use cm_graphs_core::geom::{Point, Size};
use serde::{Deserialize, Serialize};

/// Thickness reserved for the scroll strip of a paginated chart.
pub const SCROLL_DIMENSION: f64 = 40.0;
/// Gap between the graph and its scroll strip; the strip draws its preview in the rest.
pub const SCROLL_PADDING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerLayout {
    pub width: f64,
    pub height: f64,
    pub graph_width: f64,
    pub graph_height: f64,
    /// Translation of the graph group inside the container, margins included.
    pub offset: Point,
}

impl ContainerLayout {
    pub fn graph_size(&self) -> Size {
        Size::new(self.graph_width, self.graph_height)
    }
}

/// Graph area left after margins, the scroll strip and the legend.
///
/// `paging` is the orientation of a paginated chart: vertical charts lose the strip height,
/// horizontal charts the strip width.
pub fn container_layout(
    size: Size,
    margin: &Margin,
    paging: Option<Orientation>,
    legend: Option<(LegendPosition, f64)>,
) -> ContainerLayout {
    let mut graph_width = size.width - margin.horizontal();
    let mut graph_height = size.height - margin.vertical();
    match paging {
        Some(Orientation::Vertical) => graph_height -= SCROLL_DIMENSION,
        Some(Orientation::Horizontal) => graph_width -= SCROLL_DIMENSION,
        None => {}
    }
    let mut offset = Point::new(margin.left, margin.top);
    if let Some((position, dimension)) = legend {
        match position {
            LegendPosition::Left => {
                graph_width -= dimension;
                offset.x += dimension;
            }
            LegendPosition::Right => graph_width -= dimension,
            LegendPosition::Top => {
                graph_height -= dimension;
                offset.y += dimension;
            }
            LegendPosition::Bottom => graph_height -= dimension,
        }
    }
    ContainerLayout {
        width: size.width,
        height: size.height,
        graph_width: graph_width.max(0.0),
        graph_height: graph_height.max(0.0),
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn margin() -> Margin {
        Margin {
            top: 10.0,
            right: 10.0,
            bottom: 10.0,
            left: 10.0,
        }
    }

    #[test]
    fn scroll_strip_and_legend_shrink_the_graph() {
        let c = container_layout(
            Size::new(400.0, 300.0),
            &margin(),
            Some(Orientation::Vertical),
            Some((LegendPosition::Left, 50.0)),
        );
        assert_eq!(c.graph_width, 330.0);
        assert_eq!(c.graph_height, 240.0);
        assert_eq!(c.offset, Point::new(60.0, 10.0));
    }

    #[test]
    fn tiny_containers_clamp_to_zero() {
        let c = container_layout(Size::new(10.0, 10.0), &margin(), None, None);
        assert_eq!(c.graph_size(), Size::new(0.0, 0.0));
    }
}
