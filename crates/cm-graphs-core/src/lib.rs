#![forbid(unsafe_code)]

//! Configuration and data normalization shared by every cm-graphs chart.
//!
//! The two entry points are [`normalize_config`], which merges a partial user configuration
//! over the defaults of its chart type, and [`DataNormalizer::normalize`], which decorates raw
//! records with ids and visual defaults.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod geom;
pub mod text;

pub use config::{ChartKind, ConfigValue, GraphConfig, merged_config, normalize_config};
pub use data::{ChartData, DataNormalizer, normalize_data};
pub use error::{Error, Result};
pub use geom::{Bounds, Point, Rect, Size};
