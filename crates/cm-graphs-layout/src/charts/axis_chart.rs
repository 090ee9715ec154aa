//! Histogram and line charts.

use super::{
    Chart, ChartEvent, EventDispatcher, LayoutOptions, LegendBearing, Scalable, ScrollPaginated,
    empty_viewport, fit_viewport, pass_duration,
};
use crate::axis::{
    AxisDisplay, AxisLayout, AxisMeasures, AxisSpec, BAND_PADDING, ChartAxes, GridLayout, MarkKind,
};
use crate::bars::{BarLayout, bar_layouts};
use crate::container::{SCROLL_DIMENSION, SCROLL_PADDING, container_layout};
use crate::error::{Error, Result};
use crate::legend::{LegendGap, LegendItem, LegendLayout};
use crate::lines::{LineSeries, line_series};
use crate::model::{AxisChartLayout, ChartLayout, ScrollPreview};
use crate::scroll::{ScrollCoordinator, ScrollState};
use crate::tooltip::{TooltipLayout, place_tooltip, tooltip_text};
use crate::viewport::{LayoutClock, ZoomTransform};
use cm_graphs_core::config::{
    AxisConfig, BaseConfig, ChartKind, GridConfig, GroupStyle, GroupedType, HistogramConfig,
    LegendConfig, LineConfig, Orientation,
};
use cm_graphs_core::data::SeriesDatum;
use cm_graphs_core::format::TemplateFormat;
use cm_graphs_core::geom::{Bounds, Point, Rect, Size};
use serde_json::json;
use std::ops::Range;

/// The parts of a histogram or line configuration the layout reads.
#[derive(Debug, Clone, PartialEq)]
struct AxisSettings {
    marks: MarkKind,
    base: BaseConfig,
    groups: Vec<GroupStyle>,
    click_on_element: bool,
    orientation: Orientation,
    grid: GridConfig,
    axis: AxisConfig,
    grouped_type: GroupedType,
    has_area: bool,
    legend: LegendConfig,
    max_displayed_number: Option<usize>,
}

impl From<HistogramConfig> for AxisSettings {
    fn from(c: HistogramConfig) -> Self {
        Self {
            marks: MarkKind::Bars,
            base: c.base,
            groups: c.groups,
            click_on_element: c.events.click_on_element,
            orientation: c.orientation,
            grid: c.grid,
            axis: c.axis,
            grouped_type: c.grouped_type,
            has_area: false,
            legend: c.legend,
            max_displayed_number: c.max_displayed_number,
        }
    }
}

impl From<LineConfig> for AxisSettings {
    fn from(c: LineConfig) -> Self {
        Self {
            marks: MarkKind::Lines,
            base: c.base,
            groups: c.groups,
            click_on_element: c.events.click_on_element,
            orientation: c.orientation,
            grid: c.grid,
            axis: c.axis,
            grouped_type: GroupedType::Inline,
            has_area: c.has_area,
            legend: c.legend,
            max_displayed_number: c.max_displayed_number,
        }
    }
}

impl AxisSettings {
    fn spec(&self, band_padding: f64) -> AxisSpec {
        AxisSpec {
            marks: self.marks,
            orientation: self.orientation,
            invert_x: self.axis.invert_axis_x,
            invert_y: self.axis.invert_axis_y,
            grouped_type: self.grouped_type,
            band_padding,
        }
    }

    fn display(&self) -> AxisDisplay<'_> {
        AxisDisplay {
            show_x: self.axis.show_axis_x,
            show_y: self.axis.show_axis_y,
            label_x: self.axis.label_x_orientation,
            label_y: self.axis.label_y_orientation,
            tick_format_x: self.axis.tick_format_x.as_deref(),
            tick_format_y: self.axis.tick_format_y.as_deref(),
        }
    }

    /// Whether the scroll handle runs on a mirrored track.
    fn mirrored(&self) -> bool {
        match self.orientation {
            Orientation::Vertical => self.axis.invert_axis_x,
            Orientation::Horizontal => !self.axis.invert_axis_y,
        }
    }
}

/// Controller of a histogram or a line chart.
#[derive(Debug)]
pub struct AxisChart {
    kind: ChartKind,
    settings: AxisSettings,
    data: Vec<SeriesDatum>,
    size: Size,
    options: LayoutOptions,
    clock: LayoutClock,
    events: EventDispatcher,
    transform: ZoomTransform,
    scroll: Option<ScrollCoordinator>,
    measures: AxisMeasures,
    layout: AxisChartLayout,
}

impl AxisChart {
    pub fn histogram(
        config: HistogramConfig,
        data: Vec<SeriesDatum>,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        Self::new(ChartKind::Histogram, config.into(), data, size, options)
    }

    pub fn line(
        config: LineConfig,
        data: Vec<SeriesDatum>,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        Self::new(ChartKind::Line, config.into(), data, size, options)
    }

    fn new(
        kind: ChartKind,
        settings: AxisSettings,
        data: Vec<SeriesDatum>,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        let container = container_layout(size, &settings.base.margin, None, None);
        let mut chart = Self {
            kind,
            settings,
            data,
            size,
            options,
            clock: LayoutClock::default(),
            events: EventDispatcher::default(),
            transform: ZoomTransform::IDENTITY,
            scroll: None,
            measures: AxisMeasures::default(),
            layout: AxisChartLayout {
                generation: 0,
                container,
                window_start: 0,
                bottom_axis: None,
                left_axis: None,
                grid: GridLayout::default(),
                bars: Vec::new(),
                lines: Vec::new(),
                legend: None,
                scroll: None,
                viewport: empty_viewport(size),
            },
        };
        chart.relayout(true)?;
        Ok(chart)
    }

    pub fn layout(&self) -> &AxisChartLayout {
        &self.layout
    }

    pub fn data(&self) -> &[SeriesDatum] {
        &self.data
    }

    /// Orientation of the scroll strip when the data does not fit in one window.
    fn paging(&self) -> Option<Orientation> {
        match self.settings.max_displayed_number {
            Some(window) if window > 0 && self.data.len() > window => {
                Some(self.settings.orientation)
            }
            _ => None,
        }
    }

    fn window(&self) -> Range<usize> {
        self.scroll
            .as_ref()
            .map_or(0..self.data.len(), ScrollCoordinator::visible_range)
    }

    /// Full pass: container, axes, grid, marks, legend, scroll strip and fit, in that order.
    fn relayout(&mut self, rebuild_scroll: bool) -> Result<u64> {
        let generation = self.clock.begin();
        let measurer = &*self.options.text_measurer;
        let settings = &self.settings;
        let paging = self.paging();

        let mut legend = settings.legend.enabled.then(|| {
            let provisional = container_layout(self.size, &settings.base.margin, paging, None);
            let items: Vec<LegendItem> = settings
                .groups
                .iter()
                .map(|g| LegendItem {
                    label: g.label.clone(),
                    color: g.color.clone(),
                })
                .collect();
            LegendLayout::build(
                &items,
                settings.legend.position,
                provisional.graph_size(),
                measurer,
            )
        });
        let container = container_layout(
            self.size,
            &settings.base.margin,
            paging,
            legend.as_ref().map(|l| (l.position, l.dimension)),
        );
        let graph = container.graph_size();

        if rebuild_scroll {
            let track = match settings.orientation {
                Orientation::Vertical => graph.width,
                Orientation::Horizontal => graph.height,
            };
            self.scroll = settings.max_displayed_number.and_then(|window| {
                ScrollCoordinator::new(self.data.len(), window, track, settings.mirrored())
            });
        }
        let window = self.window();

        let spec = settings.spec(BAND_PADDING);
        let display = settings.display();
        let mut axes = ChartAxes::build(spec, &self.data[window.clone()], graph.width, graph.height);
        let measures = axes.measure(&display, measurer);
        axes.fit_to_labels(&measures, graph.width, graph.height);
        self.measures = measures;

        let (bottom_axis, left_axis, grid, bars, lines) =
            self.marks(&axes, &self.data[window.clone()], graph);

        let strip = self.scroll.as_ref().map(|_| strip_rect(settings.orientation, graph));
        if let Some(legend) = &mut legend {
            let gap = match strip {
                Some(_) if settings.orientation == Orientation::Horizontal => LegendGap {
                    right: SCROLL_DIMENSION,
                    bottom: 0.0,
                },
                Some(_) => LegendGap {
                    right: 0.0,
                    bottom: SCROLL_DIMENSION,
                },
                None => LegendGap::default(),
            };
            legend.place(graph, gap);
        }
        let scroll = self.preview(graph);

        let content = Bounds::from_rects(
            std::iter::once(Rect::new(0.0, 0.0, graph.width, graph.height))
                .chain(legend.as_ref().map(LegendLayout::rect))
                .chain(strip),
        )
        .map(|b| b.to_rect());
        let viewport = fit_viewport(
            content,
            self.size,
            &self.settings.base,
            None,
            None,
            &mut self.transform,
            generation,
            pass_duration(false),
        );

        tracing::debug!(
            chart = %self.kind,
            generation,
            window_start = window.start,
            window_end = window.end,
            graph_width = graph.width,
            graph_height = graph.height,
            "axis chart layout"
        );
        self.layout = AxisChartLayout {
            generation,
            container,
            window_start: window.start,
            bottom_axis,
            left_axis,
            grid,
            bars,
            lines,
            legend,
            scroll,
            viewport,
        };
        Ok(generation)
    }

    /// Axes, grid and marks of the visible window on scales that already fit their labels.
    #[allow(clippy::type_complexity)]
    fn marks(
        &self,
        axes: &ChartAxes,
        visible: &[SeriesDatum],
        graph: Size,
    ) -> (
        Option<AxisLayout>,
        Option<AxisLayout>,
        GridLayout,
        Vec<BarLayout>,
        Vec<LineSeries>,
    ) {
        let settings = &self.settings;
        let display = settings.display();
        let bottom = settings
            .axis
            .show_axis_x
            .then(|| AxisLayout::bottom(axes, &self.measures, &display, graph.height));
        let left = settings
            .axis
            .show_axis_y
            .then(|| AxisLayout::left(axes, &self.measures, &display));
        let grid = GridLayout::build(
            axes,
            &self.measures,
            settings.grid.axis_x,
            settings.grid.axis_y,
            graph.width,
            graph.height,
        );
        let (bars, lines) = match settings.marks {
            MarkKind::Bars => (bar_layouts(axes, visible, &settings.groups), Vec::new()),
            MarkKind::Lines => (
                Vec::new(),
                line_series(axes, visible, &settings.groups, settings.has_area),
            ),
        };
        (bottom, left, grid, bars, lines)
    }

    /// Miniature of the whole data set drawn inside the scroll strip.
    fn preview(&self, graph: Size) -> Option<ScrollPreview> {
        let scroll = self.scroll.as_ref()?;
        let rect = strip_rect(self.settings.orientation, graph);
        let (width, height) = match self.settings.orientation {
            Orientation::Vertical => (rect.width, rect.height - SCROLL_PADDING),
            Orientation::Horizontal => (rect.width - SCROLL_PADDING, rect.height),
        };
        let axes = ChartAxes::build(self.settings.spec(0.0), &self.data, width, height);
        let (bars, lines) = match self.settings.marks {
            MarkKind::Bars => (
                bar_layouts(&axes, &self.data, &self.settings.groups),
                Vec::new(),
            ),
            MarkKind::Lines => (
                Vec::new(),
                line_series(&axes, &self.data, &self.settings.groups, self.settings.has_area),
            ),
        };
        Some(ScrollPreview {
            state: scroll.snapshot(),
            rect,
            bars,
            lines,
        })
    }

    /// Rebuilds scales and marks for a new window; container, legend and fit stay.
    fn redraw_window(&mut self) -> u64 {
        let generation = self.clock.begin();
        let graph = self.layout.container.graph_size();
        let window = self.window();
        let visible = &self.data[window.clone()];
        let mut axes = ChartAxes::build(
            self.settings.spec(BAND_PADDING),
            visible,
            graph.width,
            graph.height,
        );
        axes.fit_to_labels(&self.measures, graph.width, graph.height);
        let (bottom_axis, left_axis, grid, bars, lines) = self.marks(&axes, visible, graph);

        let layout = &mut self.layout;
        layout.generation = generation;
        layout.window_start = window.start;
        layout.bottom_axis = bottom_axis;
        layout.left_axis = left_axis;
        layout.grid = grid;
        layout.bars = bars;
        layout.lines = lines;
        if let (Some(preview), Some(scroll)) = (&mut layout.scroll, &self.scroll) {
            preview.state = scroll.snapshot();
        }
        generation
    }

    fn record(&self, id: &str) -> Result<&SeriesDatum> {
        self.data
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::UnknownElement { id: id.to_string() })
    }

    /// Click on the mark of `series` in record `id`.
    pub fn click(&mut self, id: &str, series: usize) -> Result<()> {
        let record = self.record(id)?;
        if !self.settings.click_on_element {
            return Ok(());
        }
        let event = ChartEvent::ClickOnElement {
            chart: self.kind,
            record: json!({
                "id": record.id,
                "label": record.label,
                "value": record.values.get(series),
                "series": series,
                "extraData": record.extra_data,
            }),
        };
        self.events.dispatch(event);
        Ok(())
    }

    /// Tooltip of the mark of `series` in record `id`, next to `pointer`.
    pub fn tooltip(&self, id: &str, series: usize, pointer: Point) -> Result<TooltipLayout> {
        let record = self.record(id)?;
        let format = TemplateFormat::new(self.settings.base.tooltip_format.clone());
        let text = tooltip_text(&format, &record.label, record.values.get(series).copied());
        Ok(place_tooltip(
            text,
            pointer,
            self.layout.container.graph_width,
            &*self.options.text_measurer,
        ))
    }
}

/// Scroll strip next to the graph: below vertical charts, right of horizontal ones.
fn strip_rect(orientation: Orientation, graph: Size) -> Rect {
    match orientation {
        Orientation::Vertical => Rect::new(0.0, graph.height, graph.width, SCROLL_DIMENSION),
        Orientation::Horizontal => Rect::new(graph.width, 0.0, SCROLL_DIMENSION, graph.height),
    }
}

impl Chart for AxisChart {
    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn snapshot(&self) -> ChartLayout {
        match self.kind {
            ChartKind::Line => ChartLayout::Line(self.layout.clone()),
            _ => ChartLayout::Histogram(self.layout.clone()),
        }
    }

    fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    fn clock(&self) -> &LayoutClock {
        &self.clock
    }
}

impl Scalable for AxisChart {
    fn resize(&mut self, size: Size) -> Result<u64> {
        self.size = size;
        self.relayout(true)
    }

    fn container_size(&self) -> Size {
        self.size
    }
}

impl LegendBearing for AxisChart {
    fn legend(&self) -> Option<&LegendLayout> {
        self.layout.legend.as_ref()
    }
}

impl ScrollPaginated for AxisChart {
    fn scroll(&self) -> Option<ScrollState> {
        self.scroll.as_ref().map(ScrollCoordinator::snapshot)
    }

    fn drag_scroll(&mut self, delta: f64) -> Result<Option<usize>> {
        let Some(scroll) = &mut self.scroll else {
            return Ok(None);
        };
        let Some(index) = scroll.drag(delta) else {
            return Ok(None);
        };
        self.redraw_window();
        Ok(Some(index))
    }

    fn end_scroll(&mut self) -> Result<u64> {
        self.relayout(false)
    }
}
