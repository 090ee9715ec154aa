//! Line series of the line chart.

use crate::axis::ChartAxes;
use crate::bars::group_color;
use cm_graphs_core::config::{GroupStyle, Orientation};
use cm_graphs_core::data::SeriesDatum;
use cm_graphs_core::geom::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePoint {
    pub record_id: String,
    pub label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub series: usize,
    pub label: String,
    pub color: String,
    pub points: Vec<LinePoint>,
    /// Closed outline of the area under the line, down to the zero value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Vec<Point>>,
}

/// One series per value index; records missing that index are skipped.
pub fn line_series(
    axes: &ChartAxes,
    records: &[SeriesDatum],
    groups: &[GroupStyle],
    has_area: bool,
) -> Vec<LineSeries> {
    let count = records.iter().map(|r| r.values.len()).max().unwrap_or(0);
    let categories = axes.categories();
    let values = axes.values();
    let vertical = axes.spec.orientation == Orientation::Vertical;
    let baseline = values.value(0.0);

    (0..count)
        .map(|series| {
            let points: Vec<LinePoint> = records
                .iter()
                .filter_map(|r| {
                    let value = *r.values.get(series)?;
                    let c = categories.category(&r.label)?;
                    let v = values.value(value)?;
                    let (x, y) = if vertical { (c, v) } else { (v, c) };
                    Some(LinePoint {
                        record_id: r.id.clone(),
                        label: r.label.clone(),
                        value,
                        x,
                        y,
                    })
                })
                .collect();

            let area = match (has_area, baseline) {
                (true, Some(base)) if !points.is_empty() => {
                    let mut outline: Vec<Point> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
                    outline.extend(points.iter().rev().map(|p| {
                        if vertical {
                            Point::new(p.x, base)
                        } else {
                            Point::new(base, p.y)
                        }
                    }));
                    Some(outline)
                }
                _ => None,
            };

            LineSeries {
                series,
                label: groups
                    .get(series)
                    .map_or_else(|| format!("Line-{}", series + 1), |g| g.label.clone()),
                color: group_color(groups, series),
                points,
                area,
            }
        })
        .collect()
}
