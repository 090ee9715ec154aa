//! Flow chart.

use super::{
    Chart, ChartEvent, EventDispatcher, LayoutOptions, Scalable, Zoomable, empty_viewport,
    fit_viewport, pass_duration,
};
use crate::container::container_layout;
use crate::error::{Error, Result};
use crate::flow::{FlowLayout, layout_flow};
use crate::model::{ChartLayout, FlowChartLayout};
use crate::viewport::{LayoutClock, ZoomState, ZoomTransform};
use cm_graphs_core::config::{ChartKind, FlowConfig};
use cm_graphs_core::data::FlowData;
use cm_graphs_core::geom::Size;

#[derive(Debug)]
pub struct FlowChart {
    config: FlowConfig,
    data: FlowData,
    size: Size,
    options: LayoutOptions,
    clock: LayoutClock,
    events: EventDispatcher,
    transform: ZoomTransform,
    zoom: Option<ZoomState>,
    layout: FlowChartLayout,
}

impl FlowChart {
    pub fn new(
        config: FlowConfig,
        data: FlowData,
        size: Size,
        options: LayoutOptions,
    ) -> Result<Self> {
        let container = container_layout(size, &config.base.margin, None, None);
        let zoom = config.zoom.as_ref().map(|z| ZoomState::new(Some(z)));
        let mut chart = Self {
            config,
            data,
            size,
            options,
            clock: LayoutClock::default(),
            events: EventDispatcher::default(),
            transform: ZoomTransform::IDENTITY,
            zoom,
            layout: FlowChartLayout {
                generation: 0,
                container,
                flow: FlowLayout::default(),
                viewport: empty_viewport(size),
                zoom: None,
            },
        };
        chart.relayout()?;
        Ok(chart)
    }

    pub fn layout(&self) -> &FlowChartLayout {
        &self.layout
    }

    fn relayout(&mut self) -> Result<u64> {
        let generation = self.clock.begin();
        let container = container_layout(self.size, &self.config.base.margin, None, None);
        let flow = layout_flow(&self.data, &self.config, &*self.options.text_measurer)?;
        let viewport = fit_viewport(
            flow.bounds(),
            self.size,
            &self.config.base,
            self.config.zoom.as_ref(),
            self.zoom.as_mut(),
            &mut self.transform,
            generation,
            pass_duration(false),
        );
        tracing::debug!(
            generation,
            nodes = flow.nodes.len(),
            edges = flow.edges.len(),
            clusters = flow.clusters.len(),
            "flow chart layout"
        );
        self.layout = FlowChartLayout {
            generation,
            container,
            flow,
            viewport,
            zoom: self.zoom,
        };
        Ok(generation)
    }

    /// Reports a click on node `id`.
    pub fn click(&mut self, id: &str) -> Result<()> {
        let node = self
            .data
            .nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::UnknownElement { id: id.to_string() })?;
        if self.config.events.click_on_element {
            let record = serde_json::to_value(node)?;
            self.events.dispatch(ChartEvent::ClickOnElement {
                chart: ChartKind::FlowChart,
                record,
            });
        }
        Ok(())
    }
}

impl Chart for FlowChart {
    fn kind(&self) -> ChartKind {
        ChartKind::FlowChart
    }

    fn snapshot(&self) -> ChartLayout {
        ChartLayout::FlowChart(self.layout.clone())
    }

    fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    fn clock(&self) -> &LayoutClock {
        &self.clock
    }
}

impl Scalable for FlowChart {
    fn resize(&mut self, size: Size) -> Result<u64> {
        self.size = size;
        self.relayout()
    }

    fn container_size(&self) -> Size {
        self.size
    }
}

impl Zoomable for FlowChart {
    fn zoom_state(&self) -> Option<&ZoomState> {
        self.zoom.as_ref()
    }

    fn zoom_state_mut(&mut self) -> Option<&mut ZoomState> {
        self.zoom.as_mut()
    }
}
