#![forbid(unsafe_code)]

//! `cm-graphs` computes chart layouts without a browser.
//!
//! A chart is described by a JSON configuration (with a `type`) and JSON data. The configuration
//! is merged over the defaults of its chart type, the data is decorated with ids and visual
//! defaults, and a chart controller runs the layout pipeline. The result is a serializable
//! [`ChartLayout`] that a renderer can draw as is.
//!
//! ```no_run
//! let request = cm_graphs::ChartRequest::from_json(
//!     r#"{"config": {"type": "pie"}, "data": [{"label": "a", "value": 3}], "width": 400, "height": 300}"#,
//! )?;
//! let layout = cm_graphs::layout_chart(&request)?;
//! println!("{}", layout.to_value()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Interactive hosts keep a [`ChartController`] instead and feed it clicks, drags and resizes.

pub use cm_graphs_core::config::{ChartKind, ConfigValue, GraphConfig};
pub use cm_graphs_core::data::{ChartData, DataNormalizer};
pub use cm_graphs_core::geom::{Bounds, Point, Rect, Size};
pub use cm_graphs_core::text::{DeterministicTextMeasurer, TextMeasurer};
pub use cm_graphs_core::{merged_config, normalize_config, normalize_data};
pub use cm_graphs_layout::{
    BubbleChart, Chart, ChartController, ChartEvent, ChartLayout, FlowChart, LayoutOptions,
    LegendBearing, PieChart, Scalable, ScrollPaginated, SliderChart, TreeChart, Zoomable,
};

pub use cm_graphs_core as core;
pub use cm_graphs_layout as layout;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cm_graphs_core::Error),
    #[error(transparent)]
    Layout(#[from] cm_graphs_layout::Error),
    #[error("invalid chart request: {0}")]
    Request(#[from] serde_json::Error),
    #[error("container size must be positive and finite, got {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// One chart to lay out: configuration, data and container size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub config: Value,
    #[serde(default)]
    pub data: Value,
    pub width: f64,
    pub height: f64,
}

impl ChartRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn size(&self) -> Result<Size> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(self.width) && valid(self.height)) {
            return Err(Error::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(Size::new(self.width, self.height))
    }
}

/// The configuration of `request` merged over its chart defaults.
pub fn normalized_config(request: &ChartRequest) -> Result<GraphConfig> {
    Ok(normalize_config(&request.config, Some(&request.data))?)
}

/// Runs the first layout pass of `request` with the deterministic text measurer.
pub fn layout_chart(request: &ChartRequest) -> Result<ChartLayout> {
    Charts::new().layout(request)
}

/// Builds chart controllers and keeps generated data ids stable between requests.
///
/// Records without an explicit `id` get the same id back as long as their content does not
/// change, so a host that lays out the same chart again sees the same element ids.
#[derive(Debug, Default, Clone)]
pub struct Charts {
    normalizer: DataNormalizer,
    options: LayoutOptions,
}

impl Charts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self {
            normalizer: DataNormalizer::new(),
            options,
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn build(&mut self, request: &ChartRequest) -> Result<ChartController> {
        let size = request.size()?;
        let config = normalized_config(request)?;
        let data = self.normalizer.normalize(&config, &request.data)?;
        tracing::debug!(
            chart = %config.kind(),
            width = size.width,
            height = size.height,
            "chart request"
        );
        Ok(ChartController::new(
            config,
            data,
            size,
            self.options.clone(),
        )?)
    }

    pub fn layout(&mut self, request: &ChartRequest) -> Result<ChartLayout> {
        Ok(self.build(request)?.snapshot())
    }
}
