#![forbid(unsafe_code)]

//! Headless layout for cm-graphs charts.
//!
//! Every chart is laid out in two layers:
//!
//! - pure geometry: scales and axes ([`scale`], [`axis`]), marks ([`bars`], [`lines`], [`pie`]),
//!   hierarchies ([`hierarchy`]), flow graphs ([`flow`]), sliders ([`slider`]) and the
//!   viewport fit ([`viewport`]);
//! - controllers ([`charts`]) owning one chart instance. They run the layout passes, track
//!   interaction state and emit [`ChartEvent`]s.
//!
//! The result of a pass is a serializable [`ChartLayout`] snapshot. Rendering it is left to the
//! host.

pub mod axis;
pub mod bars;
pub mod charts;
pub mod container;
pub mod error;
pub mod flow;
pub mod hierarchy;
pub mod legend;
pub mod lines;
pub mod model;
pub mod nodes;
pub mod pie;
pub mod scale;
pub mod scroll;
pub mod slider;
pub mod tooltip;
pub mod viewport;

pub use charts::{
    AxisChart, BubbleChart, Chart, ChartController, ChartEvent, EventDispatcher, FlowChart,
    LayoutOptions, LegendBearing, PieChart, Scalable, ScrollPaginated, SliderChart, TreeChart,
    Zoomable,
};
pub use error::{Error, Result};
pub use model::{ChartLayout, Viewport};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
