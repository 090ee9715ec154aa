//! Chart controllers.
//!
//! A controller owns the normalized configuration and data of one chart instance, runs its
//! layout passes and keeps the latest snapshot. Geometry lives in the modules of this crate and
//! has no side effects; controllers call it and then notify listeners through an
//! [`EventDispatcher`].
//!
//! Charts compose the capabilities they need instead of sharing a base: every controller is
//! [`Chart`] and [`Scalable`], axis charts are also [`LegendBearing`] and [`ScrollPaginated`],
//! tree and flow charts are [`Zoomable`].

pub mod axis_chart;
pub mod bubble_chart;
pub mod flow_chart;
pub mod pie_chart;
pub mod slider_chart;
pub mod tree_chart;

pub use axis_chart::AxisChart;
pub use bubble_chart::BubbleChart;
pub use flow_chart::FlowChart;
pub use pie_chart::PieChart;
pub use slider_chart::SliderChart;
pub use tree_chart::TreeChart;

use crate::error::{Error, Result};
use crate::legend::LegendLayout;
use crate::model::{ChartLayout, Viewport};
use crate::scroll::ScrollState;
use crate::slider::HandleValue;
use crate::viewport::{
    FitTransform, LayoutClock, Overflow, TRANSITION_DURATION, Transition, TransitionStatus, ZoomState,
    ZoomTransform, apply_overflow, compute_fit,
};
use cm_graphs_core::config::{BaseConfig, ChartKind, GraphConfig, ZoomConfig};
use cm_graphs_core::data::ChartData;
use cm_graphs_core::geom::{Point, Rect, Size};
use cm_graphs_core::text::{DeterministicTextMeasurer, TextMeasurer};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions").finish_non_exhaustive()
    }
}

/// Notification produced by an interaction, carrying plain data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ChartEvent {
    #[serde(rename_all = "camelCase")]
    ClickOnElement { chart: ChartKind, record: Value },
    RangeChanging { range: Vec<HandleValue> },
    RangeChanged { range: Vec<HandleValue> },
}

pub type Listener = Box<dyn FnMut(&ChartEvent)>;

/// Fans chart events out to the registered listeners, in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Listener>,
}

impl EventDispatcher {
    pub fn subscribe(&mut self, listener: impl FnMut(&ChartEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&mut self, event: ChartEvent) {
        tracing::debug!(?event, listeners = self.listeners.len(), "chart event");
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Shared surface of every chart controller.
pub trait Chart {
    fn kind(&self) -> ChartKind;

    /// Layout of the latest pass.
    fn snapshot(&self) -> ChartLayout;

    fn events_mut(&mut self) -> &mut EventDispatcher;

    fn clock(&self) -> &LayoutClock;

    /// Whether an animation started by pass `generation` should still run.
    fn transition_status(&self, generation: u64) -> TransitionStatus {
        self.clock().status(generation)
    }
}

/// Charts that recompute for a new container size.
pub trait Scalable {
    /// Runs a full layout pass and returns its generation.
    fn resize(&mut self, size: Size) -> Result<u64>;

    fn container_size(&self) -> Size;
}

/// Charts driven by a pan/zoom gesture handler.
pub trait Zoomable {
    /// `None` when zooming is not configured.
    fn zoom_state(&self) -> Option<&ZoomState>;

    fn zoom_state_mut(&mut self) -> Option<&mut ZoomState>;

    fn zoom_by(&mut self, factor: f64, center: Point) -> bool {
        match self.zoom_state_mut() {
            Some(state) => {
                state.zoom_by(factor, center);
                true
            }
            None => false,
        }
    }

    fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        match self.zoom_state_mut() {
            Some(state) => {
                state.pan_by(dx, dy);
                true
            }
            None => false,
        }
    }
}

pub trait LegendBearing {
    fn legend(&self) -> Option<&LegendLayout>;
}

pub trait ScrollPaginated {
    fn scroll(&self) -> Option<ScrollState>;

    /// Moves the scroll handle; returns the new window start when it changed.
    fn drag_scroll(&mut self, delta: f64) -> Result<Option<usize>>;

    /// Ends a drag: re-fits the chart.
    fn end_scroll(&mut self) -> Result<u64>;
}

/// Viewport of a chart that has not been laid out yet.
pub(crate) fn empty_viewport(container: Size) -> Viewport {
    Viewport {
        content: None,
        overflow: Overflow {
            container,
            scroll_x: false,
            scroll_y: false,
        },
        fit: None,
        transition: None,
    }
}

/// Fits `content` into the container and records the move from the previous transform.
///
/// With a zoom state the gesture handler is synchronized to the fit.
#[allow(clippy::too_many_arguments)]
pub(crate) fn fit_viewport(
    content: Option<Rect>,
    container: Size,
    base: &BaseConfig,
    zoom: Option<&ZoomConfig>,
    zoom_state: Option<&mut ZoomState>,
    previous: &mut ZoomTransform,
    generation: u64,
    duration: f64,
) -> Viewport {
    let Some(content_rect) = content else {
        return empty_viewport(container);
    };
    let overflow = apply_overflow(&content_rect, container, base.overflow_x, base.overflow_y);
    let fit: Option<FitTransform> =
        compute_fit(&content_rect, overflow.container, &base.margin, zoom);
    let transition = fit.map(|fit| {
        let to = ZoomTransform::from(fit);
        let t = Transition {
            generation,
            duration,
            from: *previous,
            to,
        };
        *previous = to;
        t
    });
    if let (Some(state), Some(fit)) = (zoom_state, &fit) {
        state.sync_to_fit(fit);
    }
    Viewport {
        content,
        overflow,
        fit,
        transition,
    }
}

/// Duration of a pass: immediate on build and resize, animated after a click.
pub(crate) fn pass_duration(animate: bool) -> f64 {
    if animate { TRANSITION_DURATION } else { 0.0 }
}

/// One controller per chart type.
#[derive(Debug)]
pub enum ChartController {
    Axis(AxisChart),
    Pie(PieChart),
    Tree(TreeChart),
    Bubble(BubbleChart),
    Flow(FlowChart),
    Slider(SliderChart),
}

impl ChartController {
    /// Builds the controller matching `config` and runs its first layout pass.
    pub fn new(
        config: GraphConfig,
        data: ChartData,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        let kind = config.kind();
        let mismatch = |data: &ChartData| Error::DataMismatch {
            chart: kind.to_string(),
            found: data_kind(data).to_string(),
        };
        tracing::debug!(chart = %kind, records = data.len(), "build chart");
        Ok(match (config, data) {
            (GraphConfig::Histogram(c), ChartData::Series(d)) => {
                Self::Axis(AxisChart::histogram(c, d, size, options)?)
            }
            (GraphConfig::Line(c), ChartData::Series(d)) => {
                Self::Axis(AxisChart::line(c, d, size, options)?)
            }
            (GraphConfig::Pie(c), ChartData::Slices(d)) => {
                Self::Pie(PieChart::new(c, d, false, size, options)?)
            }
            (GraphConfig::Donut(c), ChartData::Slices(d)) => {
                Self::Pie(PieChart::new(c, d, true, size, options)?)
            }
            (GraphConfig::Tree(c), ChartData::Tree(d)) => {
                Self::Tree(TreeChart::new(c, d, size, options)?)
            }
            (GraphConfig::BubbleChart(c), ChartData::Bubble(d)) => {
                Self::Bubble(BubbleChart::new(c, d, size, options)?)
            }
            (GraphConfig::FlowChart(c), ChartData::Flow(d)) => {
                Self::Flow(FlowChart::new(c, d, size, options)?)
            }
            (GraphConfig::RangeSlider(c), ChartData::Slider(d)) => {
                Self::Slider(SliderChart::new(c, d, size, options)?)
            }
            (_, data) => return Err(mismatch(&data)),
        })
    }

    pub fn as_chart(&self) -> &dyn Chart {
        match self {
            Self::Axis(c) => c,
            Self::Pie(c) => c,
            Self::Tree(c) => c,
            Self::Bubble(c) => c,
            Self::Flow(c) => c,
            Self::Slider(c) => c,
        }
    }

    pub fn as_chart_mut(&mut self) -> &mut dyn Chart {
        match self {
            Self::Axis(c) => c,
            Self::Pie(c) => c,
            Self::Tree(c) => c,
            Self::Bubble(c) => c,
            Self::Flow(c) => c,
            Self::Slider(c) => c,
        }
    }

    pub fn as_scalable_mut(&mut self) -> &mut dyn Scalable {
        match self {
            Self::Axis(c) => c,
            Self::Pie(c) => c,
            Self::Tree(c) => c,
            Self::Bubble(c) => c,
            Self::Flow(c) => c,
            Self::Slider(c) => c,
        }
    }

    pub fn snapshot(&self) -> ChartLayout {
        self.as_chart().snapshot()
    }

    pub fn resize(&mut self, size: Size) -> Result<u64> {
        self.as_scalable_mut().resize(size)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ChartEvent) + 'static) {
        self.as_chart_mut().events_mut().subscribe(listener);
    }
}

fn data_kind(data: &ChartData) -> &'static str {
    match data {
        ChartData::Series(_) => "series",
        ChartData::Slices(_) => "slices",
        ChartData::Slider(_) => "slider",
        ChartData::Tree(_) => "tree",
        ChartData::Bubble(_) => "bubble",
        ChartData::Flow(_) => "flow",
    }
}
