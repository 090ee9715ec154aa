pub mod defaults;
pub mod model;

pub use model::*;

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A loosely typed configuration tree with dotted-path accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue(Value);

impl Default for ConfigValue {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl ConfigValue {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

/// Merges `incoming` into `base`; `incoming` wins on conflicts.
///
/// Objects merge key by key. Arrays merge by position: the result has exactly the length of the
/// incoming array, entries that exist on both sides are merged recursively and default entries
/// past the incoming length are dropped.
pub fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(in_items)) => {
            base_items.truncate(in_items.len());
            for (i, in_value) in in_items.iter().enumerate() {
                match base_items.get_mut(i) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => base_items.push(in_value.clone()),
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

/// Merges the user configuration over the defaults of its chart type.
///
/// `data` is only consulted by charts whose defaults depend on the data (axis charts).
pub fn merged_config(user: &Value, data: Option<&Value>) -> Result<ConfigValue> {
    let kind = chart_kind_of(user)?;
    let mut defaults = defaults::defaults_for(kind, data);
    if kind == ChartKind::RangeSlider
        && user.get("orientation").and_then(Value::as_str) == Some("vertical")
    {
        if let Some(axis) = defaults.get_mut("axis") {
            *axis = serde_json::json!({ "showAxisX": false, "showAxisY": true });
        }
    }

    let mut merged = ConfigValue::from_value(defaults);
    merged.deep_merge(user);
    tracing::debug!(chart = kind.as_str(), "merged chart configuration");
    Ok(merged)
}

/// Normalizes a user configuration into its typed form.
pub fn normalize_config(user: &Value, data: Option<&Value>) -> Result<GraphConfig> {
    let kind = chart_kind_of(user)?;
    let merged = merged_config(user, data)?.into_value();
    let config = match kind {
        ChartKind::Histogram => GraphConfig::Histogram(typed(kind, merged)?),
        ChartKind::Line => GraphConfig::Line(typed(kind, merged)?),
        ChartKind::Pie => GraphConfig::Pie(typed(kind, merged)?),
        ChartKind::Donut => GraphConfig::Donut(typed(kind, merged)?),
        ChartKind::Tree => GraphConfig::Tree(typed(kind, merged)?),
        ChartKind::FlowChart => GraphConfig::FlowChart(typed(kind, merged)?),
        ChartKind::RangeSlider => GraphConfig::RangeSlider(typed(kind, merged)?),
        ChartKind::BubbleChart => GraphConfig::BubbleChart(typed(kind, merged)?),
    };
    validate(&config)?;
    Ok(config)
}

fn chart_kind_of(user: &Value) -> Result<ChartKind> {
    if !user.is_object() {
        return Err(Error::InvalidConfig {
            chart: "unknown".to_string(),
            message: "configuration must be a JSON object".to_string(),
        });
    }
    let Some(kind) = user.get("type").and_then(Value::as_str) else {
        return Err(Error::UnsupportedChart {
            chart_type: String::new(),
        });
    };
    ChartKind::parse(kind)
}

fn typed<T: DeserializeOwned>(kind: ChartKind, merged: Value) -> Result<T> {
    serde_json::from_value(merged).map_err(|err| Error::InvalidConfig {
        chart: kind.as_str().to_string(),
        message: err.to_string(),
    })
}

fn invalid(kind: ChartKind, message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        chart: kind.as_str().to_string(),
        message: message.into(),
    }
}

fn validate(config: &GraphConfig) -> Result<()> {
    let kind = config.kind();
    let margin = &config.base().margin;
    if [margin.top, margin.right, margin.bottom, margin.left]
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(invalid(kind, "margin values must be finite numbers"));
    }

    let zoom = match config {
        GraphConfig::Tree(c) => c.zoom.as_ref(),
        GraphConfig::FlowChart(c) => c.zoom.as_ref(),
        GraphConfig::BubbleChart(c) => c.zoom.as_ref(),
        _ => None,
    };
    if let Some(zoom) = zoom {
        if !(zoom.min_zoom > 0.0 && zoom.min_zoom <= zoom.max_zoom) {
            return Err(invalid(kind, "zoom requires 0 < minZoom <= maxZoom"));
        }
    }

    match config {
        GraphConfig::Histogram(c) if c.max_displayed_number == Some(0) => {
            Err(invalid(kind, "maxDisplayedNumber must be at least 1"))
        }
        GraphConfig::Line(c) if c.max_displayed_number == Some(0) => {
            Err(invalid(kind, "maxDisplayedNumber must be at least 1"))
        }
        GraphConfig::Pie(c) | GraphConfig::Donut(c) => {
            if c.max_displayed_number == Some(0) {
                return Err(invalid(kind, "maxDisplayedNumber must be at least 1"));
            }
            if c.slices.colors.is_empty() {
                return Err(invalid(kind, "slices.colors must not be empty"));
            }
            Ok(())
        }
        GraphConfig::RangeSlider(c) => match c.interval.step {
            Some(step) if !(step.is_finite() && step > 0.0) => {
                Err(invalid(kind, "interval.step must be a positive number"))
            }
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}
