//! Range slider chart.

use super::{
    Chart, ChartEvent, EventDispatcher, LayoutOptions, Scalable, empty_viewport, fit_viewport,
    pass_duration,
};
use crate::axis::{AXIS_FONT_SIZE, TICK_PADDING, TICK_SIZE};
use crate::container::container_layout;
use crate::error::Result;
use crate::model::{ChartLayout, SliderChartLayout};
use crate::slider::{HandleValue, RangeSlider, SliderLayout};
use crate::viewport::{LayoutClock, ZoomTransform};
use cm_graphs_core::config::{ChartKind, Orientation, RangeSliderConfig};
use cm_graphs_core::data::SliderDatum;
use cm_graphs_core::format::TemplateFormat;
use cm_graphs_core::geom::{Bounds, Rect, Size};
use cm_graphs_core::text::{TextMeasurer, TextStyle};

/// Box of a handle drawn on the track.
pub const HANDLE_SIZE: Size = Size {
    width: 12.0,
    height: 15.0,
};

#[derive(Debug)]
pub struct SliderChart {
    config: RangeSliderConfig,
    data: Vec<SliderDatum>,
    size: Size,
    options: LayoutOptions,
    clock: LayoutClock,
    events: EventDispatcher,
    transform: ZoomTransform,
    slider: Option<RangeSlider>,
    layout: SliderChartLayout,
}

impl SliderChart {
    pub fn new(
        config: RangeSliderConfig,
        data: Vec<SliderDatum>,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        let container = container_layout(size, &config.base.margin, None, None);
        let mut chart = Self {
            config,
            data,
            size,
            options,
            clock: LayoutClock::default(),
            events: EventDispatcher::default(),
            transform: ZoomTransform::IDENTITY,
            slider: None,
            layout: SliderChartLayout {
                generation: 0,
                container,
                slider: None,
                viewport: empty_viewport(size),
            },
        };
        chart.relayout()?;
        Ok(chart)
    }

    pub fn layout(&self) -> &SliderChartLayout {
        &self.layout
    }

    /// Current values of the handles.
    pub fn range(&self) -> &[HandleValue] {
        self.slider.as_ref().map_or(&[], RangeSlider::handles)
    }

    /// Full pass. Handles start at the ends of the data again.
    fn relayout(&mut self) -> Result<u64> {
        let generation = self.clock.begin();
        let container = container_layout(self.size, &self.config.base.margin, None, None);
        self.slider = RangeSlider::new(&self.data, &self.config, container.graph_size());
        let slider = self.slider_layout();
        let content = slider
            .as_ref()
            .and_then(|s| slider_bounds(s, self.config.orientation, &*self.options.text_measurer));
        let viewport = fit_viewport(
            content,
            self.size,
            &self.config.base,
            None,
            None,
            &mut self.transform,
            generation,
            pass_duration(false),
        );
        tracing::debug!(generation, records = self.data.len(), "range slider layout");
        self.layout = SliderChartLayout {
            generation,
            container,
            slider,
            viewport,
        };
        Ok(generation)
    }

    fn slider_layout(&self) -> Option<SliderLayout> {
        let format = TemplateFormat::new(self.config.base.tooltip_format.clone());
        self.slider.as_ref().map(|s| s.layout(&format))
    }

    /// Redraws the handles after they moved; the fit stays.
    fn refresh(&mut self) -> u64 {
        let generation = self.clock.begin();
        self.layout.generation = generation;
        self.layout.slider = self.slider_layout();
        generation
    }

    pub fn drag_start(&mut self, handle: usize) -> Result<()> {
        match &mut self.slider {
            Some(slider) => slider.drag_start(handle),
            None => Err(crate::Error::InvalidHandle { index: handle }),
        }
    }

    /// Moves the dragged handle to `position` along the track. Returns whether it moved.
    pub fn drag(&mut self, position: f64) -> bool {
        let moved = self.slider.as_mut().is_some_and(|s| s.drag(position));
        if moved {
            self.refresh();
            if self.config.events.range_changing {
                let range = self.range().to_vec();
                self.events.dispatch(ChartEvent::RangeChanging { range });
            }
        }
        moved
    }

    pub fn drag_end(&mut self) {
        let Some(slider) = &mut self.slider else {
            return;
        };
        let range = slider.drag_end().to_vec();
        if self.config.events.range_changed {
            self.events.dispatch(ChartEvent::RangeChanged { range });
        }
    }

    /// Moves the nearest handle to a clicked track position.
    pub fn click(&mut self, position: f64) -> Option<usize> {
        let index = self.slider.as_mut()?.click(position)?;
        self.refresh();
        let range = self.range().to_vec();
        if self.config.events.range_changing {
            self.events.dispatch(ChartEvent::RangeChanging {
                range: range.clone(),
            });
        }
        if self.config.events.range_changed {
            self.events.dispatch(ChartEvent::RangeChanged { range });
        }
        Some(index)
    }
}

/// Track, handles and tick labels.
fn slider_bounds(
    layout: &SliderLayout,
    orientation: Orientation,
    measurer: &dyn TextMeasurer,
) -> Option<Rect> {
    let style = TextStyle::with_size(AXIS_FONT_SIZE);
    let gap = TICK_SIZE + TICK_PADDING;
    let base = layout.axis_translate;
    let labels = layout.ticks.iter().map(|(offset, text)| {
        let m = measurer.measure(text, &style);
        match orientation {
            Orientation::Horizontal => {
                Rect::new(offset - m.width / 2.0, base.y + gap, m.width, m.height)
            }
            Orientation::Vertical => Rect::new(
                base.x - gap - m.width,
                offset - m.height / 2.0,
                m.width,
                m.height,
            ),
        }
    });
    let handles = layout
        .handles
        .iter()
        .map(|h| Rect::from_center(h.position, HANDLE_SIZE));
    let boxes = Bounds::from_rects(handles.chain(labels));
    let track = Bounds::from_points(layout.track.iter().map(|p| (p.x, p.y)));
    match (boxes, track) {
        (Some(a), Some(b)) => Some(a.union(&b).to_rect()),
        (a, b) => a.or(b).map(|b| b.to_rect()),
    }
}

impl Chart for SliderChart {
    fn kind(&self) -> ChartKind {
        ChartKind::RangeSlider
    }

    fn snapshot(&self) -> ChartLayout {
        ChartLayout::RangeSlider(self.layout.clone())
    }

    fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    fn clock(&self) -> &LayoutClock {
        &self.clock
    }
}

impl Scalable for SliderChart {
    fn resize(&mut self, size: Size) -> Result<u64> {
        self.size = size;
        self.relayout()
    }

    fn container_size(&self) -> Size {
        self.size
    }
}
