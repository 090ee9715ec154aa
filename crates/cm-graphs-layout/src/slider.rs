//! Range slider: a track, its value axis and one or two draggable handles.
//!
//! Discrete sliders snap to the data values through a point scale; continuous sliders map the
//! track linearly between the smallest and the largest value.

use crate::error::{Error, Result};
use crate::scale::{BandScale, LinearScale};
use cm_graphs_core::config::{HandleType, IntervalType, Orientation, RangeSliderConfig};
use cm_graphs_core::data::SliderDatum;
use cm_graphs_core::format::{TooltipFormat, js_number};
use cm_graphs_core::geom::{Point, Size};
use serde::{Deserialize, Serialize};

/// Value held by a handle. Discrete sliders keep the record the handle sits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleValue {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<&SliderDatum> for HandleValue {
    fn from(d: &SliderDatum) -> Self {
        Self {
            value: d.value,
            id: Some(d.id.clone()),
            label: Some(d.label.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SliderScale {
    Discrete(BandScale<f64>),
    Continuous(LinearScale),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSlider {
    data: Vec<SliderDatum>,
    orientation: Orientation,
    handle_type: HandleType,
    graph: Size,
    track_width: f64,
    scale: SliderScale,
    step: f64,
    handles: Vec<HandleValue>,
    dragging: Option<usize>,
}

impl RangeSlider {
    /// `None` without data. Records are ordered by value.
    pub fn new(data: &[SliderDatum], config: &RangeSliderConfig, graph: Size) -> Option<Self> {
        let mut data = data.to_vec();
        data.sort_by(|a, b| a.value.total_cmp(&b.value));
        let (first, last) = (data.first()?.clone(), data.last()?.clone());

        let length = match config.orientation {
            Orientation::Horizontal => graph.width,
            Orientation::Vertical => graph.height,
        };
        let scale = match config.interval.kind {
            IntervalType::Discrete => {
                SliderScale::Discrete(BandScale::point(data.iter().map(|d| d.value), [0.0, length]))
            }
            IntervalType::Continuous => {
                SliderScale::Continuous(LinearScale::new([first.value, last.value], [0.0, length]))
            }
        };
        let step = match (config.interval.step, config.interval.kind) {
            (Some(step), _) => step,
            (None, IntervalType::Discrete) => smallest_gap(&data),
            (None, IntervalType::Continuous) => 0.0,
        };
        let handles = match config.handle.kind {
            HandleType::Double => vec![HandleValue::from(&first), HandleValue::from(&last)],
            HandleType::Single => vec![HandleValue::from(&first)],
        };
        tracing::debug!(records = data.len(), step, length, "range slider");
        Some(Self {
            data,
            orientation: config.orientation,
            handle_type: config.handle.kind,
            graph,
            track_width: config.track.width,
            scale,
            step,
            handles,
            dragging: None,
        })
    }

    pub fn data(&self) -> &[SliderDatum] {
        &self.data
    }

    pub fn handles(&self) -> &[HandleValue] {
        &self.handles
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn track_length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.graph.width,
            Orientation::Vertical => self.graph.height,
        }
    }

    fn domain(&self) -> (f64, f64) {
        let first = self.data.first().map_or(0.0, |d| d.value);
        let last = self.data.last().map_or(0.0, |d| d.value);
        (first, last)
    }

    /// Pixel offset of `value` along the track.
    pub fn position_of(&self, value: f64) -> f64 {
        match &self.scale {
            SliderScale::Discrete(s) => s.apply(&value).unwrap_or_else(|| {
                // Clamped values that are not data values fall back to the nearest data value.
                let nearest = self
                    .data
                    .iter()
                    .min_by(|a, b| (a.value - value).abs().total_cmp(&(b.value - value).abs()))
                    .map_or(0.0, |d| d.value);
                s.apply(&nearest).unwrap_or(0.0)
            }),
            SliderScale::Continuous(s) => s.apply(value),
        }
    }

    /// Value under a pixel offset along the track.
    pub fn value_at(&self, position: f64) -> Option<HandleValue> {
        match &self.scale {
            SliderScale::Discrete(s) => {
                let value = *s.domain().get(s.nearest_index(position)?)?;
                self.data
                    .iter()
                    .find(|d| d.value == value)
                    .map(HandleValue::from)
            }
            SliderScale::Continuous(s) => Some(HandleValue {
                value: s.invert(position),
                id: None,
                label: None,
            }),
        }
    }

    fn clamp(&self, mut v: HandleValue) -> HandleValue {
        let (first, last) = self.domain();
        if v.value < first {
            v.value = first;
        } else if v.value > last {
            v.value = last;
        }
        v
    }

    pub fn drag_start(&mut self, handle: usize) -> Result<()> {
        if handle >= self.handles.len() {
            return Err(Error::InvalidHandle { index: handle });
        }
        self.dragging = Some(handle);
        Ok(())
    }

    /// Drags the active handle to `position`. Returns whether it moved.
    ///
    /// The two handles of a double slider stay at least one step apart; a move that would
    /// break that is ignored.
    pub fn drag(&mut self, position: f64) -> bool {
        let Some(index) = self.dragging else {
            return false;
        };
        let Some(next) = self.value_at(position) else {
            return false;
        };
        let allowed = match self.handle_type {
            HandleType::Single => true,
            HandleType::Double => {
                (index == 0 && next.value <= self.handles[1].value - self.step)
                    || (index == 1 && next.value >= self.handles[0].value + self.step)
            }
        };
        if !allowed {
            tracing::trace!(index, value = next.value, "handle move rejected");
            return false;
        }
        self.handles[index] = self.clamp(next);
        true
    }

    /// Ends the drag and returns the current range.
    pub fn drag_end(&mut self) -> &[HandleValue] {
        self.dragging = None;
        &self.handles
    }

    /// Moves the handle nearest to `position` there and returns its index.
    pub fn click(&mut self, position: f64) -> Option<usize> {
        let next = self.value_at(position)?;
        let index = match self.handles.iter().position(|h| *h == next) {
            Some(i) => i,
            None => {
                let target = self.position_of(next.value);
                self.handles
                    .iter()
                    .enumerate()
                    .min_by(|a, b| {
                        let da = (self.position_of(a.1.value) - target).abs();
                        let db = (self.position_of(b.1.value) - target).abs();
                        da.total_cmp(&db)
                    })
                    .map(|(i, _)| i)?
            }
        };
        self.handles[index] = self.clamp(next);
        Some(index)
    }

    fn point_at(&self, offset: f64) -> Point {
        match self.orientation {
            Orientation::Horizontal => Point::new(offset, self.graph.height / 2.0),
            Orientation::Vertical => Point::new(self.graph.width / 2.0, offset),
        }
    }

    pub fn layout(&self, format: &dyn TooltipFormat) -> SliderLayout {
        let length = self.track_length();
        let track = [self.point_at(0.0), self.point_at(length)];
        let fill_from = match self.handle_type {
            HandleType::Double => self.position_of(self.handles[0].value),
            HandleType::Single => self.position_of(self.domain().0),
        };
        let fill_to = self.position_of(self.handles[self.handles.len() - 1].value);
        let ticks = match &self.scale {
            SliderScale::Discrete(s) => s
                .domain()
                .iter()
                .zip(s.positions())
                .map(|(v, p)| (*p, js_number(*v)))
                .collect(),
            SliderScale::Continuous(s) => self
                .data
                .iter()
                .map(|d| (s.apply(d.value), js_number(d.value)))
                .collect(),
        };
        let axis_translate = match self.orientation {
            Orientation::Horizontal => {
                Point::new(0.0, self.graph.height / 2.0 + self.track_width / 2.0)
            }
            Orientation::Vertical => Point::new(self.graph.width / 2.0 - self.track_width / 2.0, 0.0),
        };
        SliderLayout {
            track,
            fill: [self.point_at(fill_from), self.point_at(fill_to)],
            handles: self
                .handles
                .iter()
                .map(|h| HandleLayout {
                    value: h.clone(),
                    position: self.point_at(self.position_of(h.value)),
                    tooltip: format.format("", &js_number(h.value)),
                })
                .collect(),
            ticks,
            axis_translate,
        }
    }
}

/// Smallest distance between neighbouring values, 0 with fewer than two records.
fn smallest_gap(sorted: &[SliderDatum]) -> f64 {
    sorted
        .windows(2)
        .map(|w| (w[1].value - w[0].value).abs())
        .reduce(f64::min)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleLayout {
    pub value: HandleValue,
    pub position: Point,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderLayout {
    pub track: [Point; 2],
    /// Highlighted part of the track: between the handles, or up to the single handle.
    pub fill: [Point; 2],
    pub handles: Vec<HandleLayout>,
    /// Tick offsets along the track and their labels.
    pub ticks: Vec<(f64, String)>,
    pub axis_translate: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_gap_ignores_order_of_pairs() {
        let data: Vec<SliderDatum> = [1.0, 3.0, 4.0, 10.0]
            .iter()
            .map(|v| SliderDatum {
                id: format!("{v}"),
                label: format!("{v}"),
                value: *v,
                extra_data: serde_json::json!({}),
            })
            .collect();
        assert_eq!(smallest_gap(&data), 1.0);
        assert_eq!(smallest_gap(&data[..1]), 0.0);
    }
}
