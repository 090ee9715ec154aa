//! Bar rectangles of the histogram.

use crate::axis::ChartAxes;
use cm_graphs_core::config::{GroupStyle, GroupedType, Orientation};
use cm_graphs_core::config::defaults::DEFAULT_GROUP_COLOR;
use cm_graphs_core::data::SeriesDatum;
use cm_graphs_core::format::format_number;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarLayout {
    /// Id of the record the bar belongs to.
    pub record_id: String,
    pub label: String,
    pub series: usize,
    pub value: f64,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One value of a record with the running sum it is stacked on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StackedValue {
    series: usize,
    value: f64,
    offset: f64,
}

/// Offsets accumulate per sign, and only for stacked bars.
fn stack(values: &[f64], grouped_type: GroupedType) -> Vec<StackedValue> {
    let (mut pos, mut neg) = (0.0, 0.0);
    values
        .iter()
        .enumerate()
        .map(|(series, &value)| {
            let offset = match grouped_type {
                GroupedType::Inline => 0.0,
                GroupedType::Stacked if value >= 0.0 => {
                    let o = pos;
                    pos += value;
                    o
                }
                GroupedType::Stacked => {
                    let o = neg;
                    neg += value;
                    o
                }
            };
            StackedValue {
                series,
                value,
                offset,
            }
        })
        .collect()
}

pub fn group_color(groups: &[GroupStyle], series: usize) -> String {
    groups
        .get(series)
        .map_or_else(|| DEFAULT_GROUP_COLOR.to_string(), |g| g.color.clone())
}

/// Rectangles in graph coordinates for every value of every record.
///
/// Vertical bars take their x from the grouped band and their extent from the value scale;
/// horizontal bars the other way round. With an inverted value axis the bar is anchored on its
/// other edge.
pub fn bar_layouts(axes: &ChartAxes, records: &[SeriesDatum], groups: &[GroupStyle]) -> Vec<BarLayout> {
    let Some(grouped) = &axes.grouped else {
        return Vec::new();
    };
    let categories = axes.categories();
    let values = axes.values();
    let spec = &axes.spec;
    let bandwidth = grouped.bandwidth();
    let mut out = Vec::new();

    for record in records {
        let Some(band) = categories.category(&record.label) else {
            continue;
        };
        for s in stack(&record.values, spec.grouped_type) {
            let slot = match spec.grouped_type {
                GroupedType::Inline => s.series,
                GroupedType::Stacked => 0,
            };
            let Some(inner) = grouped.apply_index(slot) else {
                continue;
            };
            let (Some(zero), Some(at_value), Some(at_offset), Some(at_end)) = (
                values.value(0.0),
                values.value(s.value),
                values.value(s.offset),
                values.value(s.offset + s.value),
            ) else {
                continue;
            };
            let extent = (zero - at_value).abs();
            let positive = s.value >= 0.0;
            let (x, y, width, height) = match spec.orientation {
                Orientation::Vertical => {
                    let y = match (spec.invert_y, positive) {
                        (true, true) | (false, false) => at_offset,
                        (true, false) | (false, true) => at_end,
                    };
                    (band + inner, y, bandwidth, extent)
                }
                Orientation::Horizontal => {
                    let x = match (spec.invert_x, positive) {
                        (true, true) | (false, false) => at_end,
                        (true, false) | (false, true) => at_offset,
                    };
                    (x, band + inner, extent, bandwidth)
                }
            };
            out.push(BarLayout {
                record_id: record.id.clone(),
                label: record.label.clone(),
                series: s.series,
                value: s.value,
                color: group_color(groups, s.series),
                x: format_number(x),
                y: format_number(y),
                width: format_number(width),
                height: format_number(height),
            });
        }
    }
    out
}
