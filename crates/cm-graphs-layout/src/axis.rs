//! Axes of the histogram and line charts.
//!
//! Orientation decides which axis carries the categories: vertical charts put them on the
//! bottom axis, horizontal charts on the left one. Inversion flips pixel ranges, never the
//! domain order. Axis extents depend on the measured size of the other axis' tick labels, so
//! [`ChartAxes::build`] is followed by [`ChartAxes::measure`] and [`ChartAxes::fit_to_labels`].

use crate::scale::{BandScale, LinearScale};
use cm_graphs_core::config::{GroupedType, LabelOrientation, Orientation};
use cm_graphs_core::data::SeriesDatum;
use cm_graphs_core::format::{format_number, format_tick, js_number};
use cm_graphs_core::geom::Point;
use cm_graphs_core::text::{TextMeasurer, TextStyle};
use serde::{Deserialize, Serialize};

pub const TICK_SIZE: f64 = 6.0;
pub const TICK_PADDING: f64 = 3.0;
pub const AXIS_FONT_SIZE: f64 = 10.0;
pub const TICK_COUNT: usize = 10;
/// Inner padding of the category band on the main chart.
pub const BAND_PADDING: f64 = 0.2;
pub const GROUPED_PADDING: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Bars,
    Lines,
}

/// Everything that shapes the scales of an axis chart, apart from the data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpec {
    pub marks: MarkKind,
    pub orientation: Orientation,
    pub invert_x: bool,
    pub invert_y: bool,
    pub grouped_type: GroupedType,
    pub band_padding: f64,
}

/// Domain of the value axis.
///
/// Inline grouping spans every raw value with zero pulled into the minimum. Stacked grouping
/// spans the positive and negative running sums of each record.
pub fn value_extent(records: &[SeriesDatum], grouped_type: GroupedType) -> (f64, f64) {
    let values: Vec<f64> = match grouped_type {
        GroupedType::Inline => records
            .iter()
            .flat_map(|r| r.values.iter().copied())
            .collect(),
        GroupedType::Stacked => records
            .iter()
            .flat_map(|r| {
                let (pos, neg) = stacked_sums(&r.values);
                [pos, neg]
            })
            .collect(),
    };
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let min = values.iter().copied().fold(0.0, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn stacked_sums(values: &[f64]) -> (f64, f64) {
    values.iter().fold((0.0, 0.0), |(pos, neg), v| {
        if *v >= 0.0 {
            (pos + v, neg)
        } else {
            (pos, neg + v)
        }
    })
}

/// Number of bars drawn side by side inside one category band.
pub fn grouped_series(records: &[SeriesDatum], grouped_type: GroupedType) -> usize {
    match grouped_type {
        GroupedType::Inline => records.iter().map(|r| r.values.len()).max().unwrap_or(0),
        GroupedType::Stacked => 1,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AxisScale {
    /// Categories of a histogram.
    Band(BandScale<String>),
    /// Categories of a line chart.
    Point(BandScale<String>),
    /// Values of a line chart: the sorted distinct values, zero included.
    ValuePoint(BandScale<f64>),
    /// Values of a histogram.
    Linear(LinearScale),
}

impl AxisScale {
    pub fn range(&self) -> [f64; 2] {
        match self {
            AxisScale::Band(s) | AxisScale::Point(s) => s.range(),
            AxisScale::ValuePoint(s) => s.range(),
            AxisScale::Linear(s) => s.range(),
        }
    }

    pub fn set_range(&mut self, range: [f64; 2]) {
        match self {
            AxisScale::Band(s) | AxisScale::Point(s) => s.set_range(range),
            AxisScale::ValuePoint(s) => s.set_range(range),
            AxisScale::Linear(s) => s.set_range(range),
        }
    }

    pub fn length(&self) -> f64 {
        let [a, b] = self.range();
        (b - a).abs()
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, AxisScale::Band(_) | AxisScale::Point(_))
    }

    pub fn bandwidth(&self) -> f64 {
        match self {
            AxisScale::Band(s) | AxisScale::Point(s) => s.bandwidth(),
            AxisScale::ValuePoint(s) => s.bandwidth(),
            AxisScale::Linear(_) => 0.0,
        }
    }

    /// Start of the band (or the point) of a category.
    pub fn category(&self, label: &str) -> Option<f64> {
        match self {
            AxisScale::Band(s) | AxisScale::Point(s) => s.apply(&label.to_string()),
            _ => None,
        }
    }

    pub fn value(&self, v: f64) -> Option<f64> {
        match self {
            AxisScale::ValuePoint(s) => s.apply(&v),
            AxisScale::Linear(s) => Some(s.apply(v)),
            _ => None,
        }
    }

    /// Tick positions and labels; band ticks sit in the middle of their band.
    pub fn ticks(&self, template: Option<&str>) -> Vec<(f64, String)> {
        match self {
            AxisScale::Band(s) | AxisScale::Point(s) => {
                let offset = s.bandwidth() / 2.0;
                s.domain()
                    .iter()
                    .zip(s.positions())
                    .map(|(label, pos)| (pos + offset, format_tick(template, label)))
                    .collect()
            }
            AxisScale::ValuePoint(s) => s
                .domain()
                .iter()
                .zip(s.positions())
                .map(|(v, pos)| (*pos, format_tick(template, &js_number(*v))))
                .collect(),
            AxisScale::Linear(s) => s
                .ticks(TICK_COUNT)
                .into_iter()
                .map(|v| (s.apply(v), format_tick(template, &js_number(v))))
                .collect(),
        }
    }
}

/// Pixel size taken by the rendered axes: the bottom axis height and the left axis width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisMeasures {
    pub bottom_height: f64,
    pub left_width: f64,
    /// Widest (bottom) or tallest (left) tick label of the category axis, along that axis.
    pub category_tick_length: f64,
}

/// What [`ChartAxes::measure`] needs to know about the rendered axes.
#[derive(Debug, Clone, Copy)]
pub struct AxisDisplay<'a> {
    pub show_x: bool,
    pub show_y: bool,
    pub label_x: LabelOrientation,
    pub label_y: LabelOrientation,
    pub tick_format_x: Option<&'a str>,
    pub tick_format_y: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartAxes {
    pub spec: AxisSpec,
    pub x: AxisScale,
    pub y: AxisScale,
    /// Series index inside a category band; bars only.
    pub grouped: Option<BandScale<usize>>,
}

impl ChartAxes {
    /// First pass: scales over the whole graph area.
    pub fn build(spec: AxisSpec, records: &[SeriesDatum], width: f64, height: f64) -> Self {
        let x_range = if spec.invert_x {
            [width, 0.0]
        } else {
            [0.0, width]
        };
        let y_range = if spec.invert_y {
            [0.0, height]
        } else {
            [height, 0.0]
        };
        let (category_range, value_range) = match spec.orientation {
            Orientation::Vertical => (x_range, y_range),
            Orientation::Horizontal => (y_range, x_range),
        };
        let labels = records.iter().map(|r| r.label.clone());

        let (categories, values, grouped) = match spec.marks {
            MarkKind::Bars => {
                let band = BandScale::band(labels, category_range)
                    .with_round(true)
                    .with_padding_inner(spec.band_padding);
                let (min, max) = value_extent(records, spec.grouped_type);
                let grouped = BandScale::band(
                    0..grouped_series(records, spec.grouped_type),
                    [0.0, band.bandwidth()],
                )
                .with_padding(GROUPED_PADDING);
                (
                    AxisScale::Band(band),
                    AxisScale::Linear(LinearScale::new([min, max], value_range)),
                    Some(grouped),
                )
            }
            MarkKind::Lines => {
                let mut values: Vec<f64> = records
                    .iter()
                    .flat_map(|r| r.values.iter().copied())
                    .chain(std::iter::once(0.0))
                    .collect();
                values.sort_by(f64::total_cmp);
                (
                    AxisScale::Point(BandScale::point(labels, category_range)),
                    AxisScale::ValuePoint(BandScale::point(values, value_range)),
                    None,
                )
            }
        };

        let (x, y) = match spec.orientation {
            Orientation::Vertical => (categories, values),
            Orientation::Horizontal => (values, categories),
        };
        Self {
            spec,
            x,
            y,
            grouped,
        }
    }

    pub fn categories(&self) -> &AxisScale {
        match self.spec.orientation {
            Orientation::Vertical => &self.x,
            Orientation::Horizontal => &self.y,
        }
    }

    pub fn values(&self) -> &AxisScale {
        match self.spec.orientation {
            Orientation::Vertical => &self.y,
            Orientation::Horizontal => &self.x,
        }
    }

    /// Measures the tick labels the axes would render.
    pub fn measure(&self, display: &AxisDisplay<'_>, measurer: &dyn TextMeasurer) -> AxisMeasures {
        let style = TextStyle::with_size(AXIS_FONT_SIZE);
        let label_box = |scale: &AxisScale, template: Option<&str>, orientation| {
            scale
                .ticks(template)
                .iter()
                .map(|(_, text)| {
                    let m = measurer.measure(text, &style);
                    rotated_box(m.width, m.height, orientation)
                })
                .fold((0.0f64, 0.0f64), |(w, h), (bw, bh)| (w.max(bw), h.max(bh)))
        };
        let (bottom_w, bottom_h) = label_box(&self.x, display.tick_format_x, display.label_x);
        let (left_w, left_h) = label_box(&self.y, display.tick_format_y, display.label_y);

        let category_tick_length = match self.spec.orientation {
            Orientation::Vertical => bottom_w,
            Orientation::Horizontal => left_h,
        };
        AxisMeasures {
            bottom_height: if display.show_x {
                TICK_SIZE + TICK_PADDING + bottom_h
            } else {
                0.0
            },
            left_width: if display.show_y {
                TICK_SIZE + TICK_PADDING + left_w
            } else {
                0.0
            },
            category_tick_length,
        }
    }

    /// Second pass: shrinks both ranges by the measured axes and re-nests the grouped scale.
    pub fn fit_to_labels(&mut self, measures: &AxisMeasures, width: f64, height: f64) {
        let (x0, x1) = (measures.left_width, width);
        let (y0, y1) = (0.0, (height - measures.bottom_height).max(0.0));
        self.x.set_range(if self.spec.invert_x {
            [x1, x0]
        } else {
            [x0, x1]
        });
        self.y.set_range(if self.spec.invert_y {
            [y0, y1]
        } else {
            [y1, y0]
        });
        self.sync_grouped();
    }

    /// Keeps the grouped scale spanning exactly one category band.
    pub fn sync_grouped(&mut self) {
        let bandwidth = self.categories().bandwidth();
        if let Some(grouped) = &mut self.grouped {
            grouped.set_range([0.0, bandwidth]);
        }
    }
}

/// Bounding box of a `width x height` label after rotation.
pub fn rotated_box(width: f64, height: f64, orientation: LabelOrientation) -> (f64, f64) {
    match orientation {
        LabelOrientation::Horizontal => (width, height),
        LabelOrientation::Vertical => (height, width),
        LabelOrientation::Oblique => {
            let side = (width + height) / std::f64::consts::SQRT_2;
            (side, side)
        }
    }
}

/// Which interior ticks stay visible when labels do not fit along the axis.
///
/// The first and the last tick are always kept; interior ticks are dropped in runs of
/// `ceil((n - maxTicks) / (maxTicks - 1))`.
pub fn thin_ticks(count: usize, axis_length: f64, tick_length: f64) -> Vec<bool> {
    let mut visible = vec![true; count];
    if count < 3 || tick_length <= 0.0 || axis_length >= tick_length * count as f64 {
        return visible;
    }
    let max_ticks = (axis_length / tick_length).floor() as usize;
    if max_ticks < 2 {
        for v in visible.iter_mut().take(count - 1).skip(1) {
            *v = false;
        }
        return visible;
    }
    let interval = (count - max_ticks).div_ceil(max_ticks - 1);
    let mut current = 0;
    for (i, v) in visible.iter_mut().enumerate() {
        if i == 0 || i == count - 1 {
            continue;
        }
        if current < interval {
            current += 1;
            *v = false;
        } else {
            if i + interval + 1 > count - 1 {
                *v = false;
            }
            current = 0;
        }
    }
    visible
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Rotation and offsets of tick labels, `dx`/`dy` in SVG length syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTransform {
    pub rotate: f64,
    pub anchor: TextAnchor,
    pub dx: String,
    pub dy: String,
}

impl LabelTransform {
    pub fn for_axis(position: AxisPosition, orientation: LabelOrientation) -> Self {
        let rotate = match orientation {
            LabelOrientation::Horizontal => 0.0,
            LabelOrientation::Vertical => -90.0,
            LabelOrientation::Oblique => -45.0,
        };
        let (anchor, dx, dy) = match (position, orientation) {
            (AxisPosition::Bottom, LabelOrientation::Horizontal) => (TextAnchor::Middle, "0", ".71em"),
            (AxisPosition::Bottom, LabelOrientation::Vertical) => (TextAnchor::End, "-.8em", "-.60em"),
            (AxisPosition::Bottom, LabelOrientation::Oblique) => (TextAnchor::End, "-.8em", "0"),
            (AxisPosition::Left, LabelOrientation::Horizontal) => (TextAnchor::End, "-9", ".32em"),
            (AxisPosition::Left, LabelOrientation::Vertical) => (TextAnchor::Middle, ".9em", "-.85em"),
            (AxisPosition::Left, LabelOrientation::Oblique) => (TextAnchor::Middle, "-9", "-.85em"),
        };
        Self {
            rotate,
            anchor,
            dx: dx.to_string(),
            dy: dy.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLayout {
    pub position: f64,
    pub label: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLayout {
    pub position: AxisPosition,
    pub translate: Point,
    pub range: [f64; 2],
    pub ticks: Vec<TickLayout>,
    pub label_transform: LabelTransform,
}

impl AxisLayout {
    pub fn bottom(
        axes: &ChartAxes,
        measures: &AxisMeasures,
        display: &AxisDisplay<'_>,
        height: f64,
    ) -> Self {
        let ticks = tick_layouts(
            &axes.x,
            display.tick_format_x,
            axes.spec.orientation == Orientation::Vertical,
            measures.category_tick_length,
        );
        Self {
            position: AxisPosition::Bottom,
            translate: Point::new(0.0, format_number(height - measures.bottom_height)),
            range: axes.x.range(),
            ticks,
            label_transform: LabelTransform::for_axis(AxisPosition::Bottom, display.label_x),
        }
    }

    pub fn left(axes: &ChartAxes, measures: &AxisMeasures, display: &AxisDisplay<'_>) -> Self {
        let ticks = tick_layouts(
            &axes.y,
            display.tick_format_y,
            axes.spec.orientation == Orientation::Horizontal,
            measures.category_tick_length,
        );
        Self {
            position: AxisPosition::Left,
            translate: Point::new(format_number(measures.left_width), 0.0),
            range: axes.y.range(),
            ticks,
            label_transform: LabelTransform::for_axis(AxisPosition::Left, display.label_y),
        }
    }
}

fn tick_layouts(
    scale: &AxisScale,
    template: Option<&str>,
    thin: bool,
    tick_length: f64,
) -> Vec<TickLayout> {
    let ticks = scale.ticks(template);
    let visible = if thin {
        thin_ticks(ticks.len(), scale.length(), tick_length)
    } else {
        vec![true; ticks.len()]
    };
    ticks
        .into_iter()
        .zip(visible)
        .map(|((position, label), visible)| TickLayout {
            position,
            label,
            visible,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Value ticks extended across the plot area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Lines at the left axis ticks.
    pub horizontal: Vec<GridLine>,
    /// Lines at the bottom axis ticks.
    pub vertical: Vec<GridLine>,
}

impl GridLayout {
    pub fn build(
        axes: &ChartAxes,
        measures: &AxisMeasures,
        show_x: bool,
        show_y: bool,
        width: f64,
        height: f64,
    ) -> Self {
        let bottom = (height - measures.bottom_height).max(0.0);
        let horizontal = if show_y {
            axes.y
                .ticks(None)
                .into_iter()
                .map(|(y, _)| GridLine {
                    from: Point::new(measures.left_width, y),
                    to: Point::new(width, y),
                })
                .collect()
        } else {
            Vec::new()
        };
        let vertical = if show_x {
            axes.x
                .ticks(None)
                .into_iter()
                .map(|(x, _)| GridLine {
                    from: Point::new(x, 0.0),
                    to: Point::new(x, bottom),
                })
                .collect()
        } else {
            Vec::new()
        };
        Self {
            horizontal,
            vertical,
        }
    }
}
