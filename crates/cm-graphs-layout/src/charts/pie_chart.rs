//! Pie and donut charts.

use super::{
    Chart, ChartEvent, EventDispatcher, LayoutOptions, LegendBearing, Scalable, empty_viewport,
    fit_viewport, pass_duration,
};
use crate::container::container_layout;
use crate::error::{Error, Result};
use crate::legend::{LegendItem, LegendLayout};
use crate::model::{ChartLayout, PieChartLayout};
use crate::pie::{PieLayout, layout_pie};
use crate::tooltip::{TooltipLayout, place_tooltip, tooltip_text};
use crate::viewport::{LayoutClock, ZoomTransform};
use cm_graphs_core::config::{ChartKind, PieConfig};
use cm_graphs_core::data::SliceDatum;
use cm_graphs_core::format::TemplateFormat;
use cm_graphs_core::geom::{Point, Size};

#[derive(Debug)]
pub struct PieChart {
    config: PieConfig,
    donut: bool,
    data: Vec<SliceDatum>,
    size: Size,
    options: LayoutOptions,
    clock: LayoutClock,
    events: EventDispatcher,
    transform: ZoomTransform,
    layout: PieChartLayout,
}

impl PieChart {
    pub fn new(
        config: PieConfig,
        data: Vec<SliceDatum>,
        donut: bool,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        let container = container_layout(size, &config.base.margin, None, None);
        let mut chart = Self {
            config,
            donut,
            data,
            size,
            options,
            clock: LayoutClock::default(),
            events: EventDispatcher::default(),
            transform: ZoomTransform::IDENTITY,
            layout: PieChartLayout {
                generation: 0,
                container,
                pie: PieLayout::default(),
                legend: None,
                viewport: empty_viewport(size),
            },
        };
        chart.relayout()?;
        Ok(chart)
    }

    pub fn layout(&self) -> &PieChartLayout {
        &self.layout
    }

    fn chart_kind(&self) -> ChartKind {
        if self.donut {
            ChartKind::Donut
        } else {
            ChartKind::Pie
        }
    }

    fn relayout(&mut self) -> Result<u64> {
        let generation = self.clock.begin();
        let measurer = &*self.options.text_measurer;
        let container = container_layout(self.size, &self.config.base.margin, None, None);
        let graph = container.graph_size();
        let pie = layout_pie(
            &self.data,
            self.config.max_displayed_number,
            self.donut,
            graph.height / 2.0,
            measurer,
        );

        let legend = self.config.legend.enabled.then(|| {
            let items: Vec<LegendItem> = self
                .data
                .iter()
                .map(|d| LegendItem {
                    label: d.label.clone(),
                    color: d.slice.color.clone(),
                })
                .collect();
            let mut legend =
                LegendLayout::build(&items, self.config.legend.position, graph, measurer);
            if let Some(bounds) = pie.bounds {
                legend.place_around(bounds);
            }
            legend
        });

        let content = pie.bounds.map(|pie_bounds| match &legend {
            Some(l) => pie_bounds.bounds().union(&l.rect().bounds()).to_rect(),
            None => pie_bounds,
        });
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
        tracing::debug!(
            chart = %self.chart_kind(),
            generation,
            slices = pie.slices.len(),
            radius = pie.radius,
            "pie chart layout"
        );
        self.layout = PieChartLayout {
            generation,
            container,
            pie,
            legend,
            viewport,
        };
        Ok(generation)
    }

    fn slice(&self, id: &str) -> Result<&SliceDatum> {
        self.data
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::UnknownElement { id: id.to_string() })
    }

    pub fn click(&mut self, id: &str) -> Result<()> {
        let record = serde_json::to_value(self.slice(id)?)?;
        if self.config.events.click_on_element {
            let chart = self.chart_kind();
            self.events.dispatch(ChartEvent::ClickOnElement { chart, record });
        }
        Ok(())
    }

    pub fn tooltip(&self, id: &str, pointer: Point) -> Result<TooltipLayout> {
        let slice = self.slice(id)?;
        let format = TemplateFormat::new(self.config.base.tooltip_format.clone());
        Ok(place_tooltip(
            tooltip_text(&format, &slice.label, Some(slice.value)),
            pointer,
            self.layout.container.graph_width,
            &*self.options.text_measurer,
        ))
    }
}

impl Chart for PieChart {
    fn kind(&self) -> ChartKind {
        self.chart_kind()
    }

    fn snapshot(&self) -> ChartLayout {
        if self.donut {
            ChartLayout::Donut(self.layout.clone())
        } else {
            ChartLayout::Pie(self.layout.clone())
        }
    }

    fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    fn clock(&self) -> &LayoutClock {
        &self.clock
    }
}

impl Scalable for PieChart {
    fn resize(&mut self, size: Size) -> Result<u64> {
        self.size = size;
        self.relayout()
    }

    fn container_size(&self) -> Size {
        self.size
    }
}

impl LegendBearing for PieChart {
    fn legend(&self) -> Option<&LegendLayout> {
        self.layout.legend.as_ref()
    }
}
