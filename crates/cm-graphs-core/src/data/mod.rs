//! Data decoration: ids, visual defaults and validation.
//!
//! Raw records are never mutated; every pass builds a fresh decorated copy (children included)
//! and then deserializes it into the typed records of [`model`].

pub mod model;

pub use model::*;

use crate::config::{GraphConfig, deep_merge_value};
use crate::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::hash::{Hash, Hasher};

/// Normalizes raw records and remembers generated ids between passes.
///
/// A record without an explicit `id` keeps the id it was given in the previous pass as long as
/// its content did not change. Ids are matched by content fingerprint and occurrence, so two
/// identical records still receive two distinct ids.
#[derive(Debug, Default, Clone)]
pub struct DataNormalizer {
    remembered: FxHashMap<u64, Vec<String>>,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, config: &GraphConfig, data: &Value) -> Result<ChartData> {
        let mut pass = IdPass::new(&self.remembered, data);
        let out = decorate_all(&mut pass, config, data)?;
        tracing::debug!(
            chart = config.kind().as_str(),
            records = out.len(),
            generated = pass.generated,
            "normalized chart data"
        );
        self.remembered = pass.next;
        Ok(out)
    }
}

/// One-shot normalization without id memory.
pub fn normalize_data(config: &GraphConfig, data: &Value) -> Result<ChartData> {
    DataNormalizer::new().normalize(config, data)
}

struct IdPass<'a> {
    previous: &'a FxHashMap<u64, Vec<String>>,
    next: FxHashMap<u64, Vec<String>>,
    occurrences: FxHashMap<u64, usize>,
    used: FxHashSet<String>,
    generated: usize,
}

impl<'a> IdPass<'a> {
    fn new(previous: &'a FxHashMap<u64, Vec<String>>, data: &Value) -> Self {
        let mut used = FxHashSet::default();
        collect_explicit_ids(data, &mut used);
        Self {
            previous,
            next: FxHashMap::default(),
            occurrences: FxHashMap::default(),
            used,
            generated: 0,
        }
    }

    fn assign(&mut self, record: &Map<String, Value>, path: &str) -> Result<String> {
        match record.get("id") {
            Some(Value::String(id)) => return Ok(id.clone()),
            Some(Value::Number(n)) => return Ok(n.to_string()),
            Some(Value::Null) | None => {}
            Some(_) => {
                return Err(Error::invalid_data(path, "id must be a string or a number"));
            }
        }

        let fingerprint = fingerprint(record);
        let occurrence = self.occurrences.entry(fingerprint).or_insert(0);
        let remembered = self
            .previous
            .get(&fingerprint)
            .and_then(|ids| ids.get(*occurrence))
            .filter(|id| !self.used.contains(*id))
            .cloned();
        *occurrence += 1;

        let id = match remembered {
            Some(id) => id,
            None => loop {
                let candidate = format!("_{}", uuid::Uuid::new_v4().simple());
                if !self.used.contains(&candidate) {
                    self.generated += 1;
                    break candidate;
                }
            },
        };
        self.used.insert(id.clone());
        self.next.entry(fingerprint).or_default().push(id.clone());
        Ok(id)
    }
}

fn collect_explicit_ids(value: &Value, out: &mut FxHashSet<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_explicit_ids(v, out)),
        Value::Object(map) => {
            match map.get("id") {
                Some(Value::String(id)) => {
                    out.insert(id.clone());
                }
                Some(Value::Number(n)) => {
                    out.insert(n.to_string());
                }
                _ => {}
            }
            for key in ["children", "nodes", "edges", "clusters"] {
                if let Some(nested @ Value::Array(_)) = map.get(key) {
                    collect_explicit_ids(nested, out);
                }
            }
        }
        _ => {}
    }
}

/// Hash of a record's own content, children and id excluded.
fn fingerprint(record: &Map<String, Value>) -> u64 {
    let mut own = record.clone();
    own.remove("children");
    own.remove("id");
    let mut hasher = FxHasher::default();
    Value::Object(own).to_string().hash(&mut hasher);
    hasher.finish()
}

fn decorate_all(pass: &mut IdPass<'_>, config: &GraphConfig, data: &Value) -> Result<ChartData> {
    Ok(match config {
        GraphConfig::Histogram(_) | GraphConfig::Line(_) => {
            ChartData::Series(decorate_each(pass, config, records_of(data, "data")?, "data")?)
        }
        GraphConfig::Pie(_) | GraphConfig::Donut(_) => {
            ChartData::Slices(decorate_each(pass, config, records_of(data, "data")?, "data")?)
        }
        GraphConfig::RangeSlider(_) => {
            ChartData::Slider(decorate_each(pass, config, records_of(data, "data")?, "data")?)
        }
        GraphConfig::Tree(_) => {
            ChartData::Tree(decorate_each(pass, config, records_of(data, "data")?, "data")?)
        }
        GraphConfig::BubbleChart(_) => {
            ChartData::Bubble(decorate_each(pass, config, records_of(data, "data")?, "data")?)
        }
        GraphConfig::FlowChart(_) => decorate_flow(pass, config, data)?,
    })
}

fn records_of<'v>(value: &'v Value, path: &str) -> Result<&'v [Value]> {
    match value {
        Value::Array(items) => Ok(items.as_slice()),
        Value::Null => Ok(&[]),
        _ => Err(Error::invalid_data(path, "expected an array of records")),
    }
}

fn decorate_each<T: DeserializeOwned>(
    pass: &mut IdPass<'_>,
    config: &GraphConfig,
    records: &[Value],
    prefix: &str,
) -> Result<Vec<T>> {
    records
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let path = format!("{prefix}[{i}]");
            let decorated = decorate_record(pass, config, raw, i, &path)?;
            typed(decorated, &path)
        })
        .collect()
}

fn typed<T: DeserializeOwned>(value: Value, path: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|err| Error::invalid_data(path, err.to_string()))
}

fn to_value(v: &impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(v)?)
}

/// Merges the record's own `key` object over `defaults` and stores the result.
fn merge_style(out: &mut Map<String, Value>, key: &str, mut defaults: Value) {
    if let Some(own) = out.get(key) {
        deep_merge_value(&mut defaults, own);
    }
    out.insert(key.to_string(), defaults);
}

fn decorate_record(
    pass: &mut IdPass<'_>,
    config: &GraphConfig,
    raw: &Value,
    index: usize,
    path: &str,
) -> Result<Value> {
    let Some(record) = raw.as_object() else {
        return Err(Error::invalid_data(path, "record must be an object"));
    };

    let mut out = record.clone();
    out.remove("children");
    let id = pass.assign(record, path)?;
    out.insert("id".to_string(), Value::String(id));
    if !out.get("extraData").is_some_and(Value::is_object) {
        out.insert("extraData".to_string(), json!({}));
    }

    match config {
        GraphConfig::Histogram(_) | GraphConfig::Line(_) => {
            require_label(&out, path)?;
            require_values(&out, path)?;
        }
        GraphConfig::Pie(c) | GraphConfig::Donut(c) => {
            require_label(&out, path)?;
            require_number(&out, "value", path)?;
            let color = &c.slices.colors[index % c.slices.colors.len()];
            merge_style(&mut out, "slice", json!({ "color": color }));
        }
        GraphConfig::RangeSlider(_) => {
            require_label(&out, path)?;
            require_number(&out, "value", path)?;
        }
        GraphConfig::Tree(c) => {
            require_label(&out, path)?;
            optional_number(&out, "value", path)?;
            let node = NodeStyle {
                shape: c.nodes.shape,
                collapsed_color: c.nodes.collapsed_color.clone(),
                expanded_color: c.nodes.expanded_color.clone(),
                stroke_color: c.nodes.stroke_color.clone(),
                label_color: c.label.color.clone(),
                icon: None,
                circle_radius: c.nodes.circle_radius,
                rectangle_dimensions: c.nodes.rectangle_dimensions,
                square_dimensions: c.nodes.square_dimensions,
                rhombus_dimensions: c.nodes.rhombus_dimensions,
            };
            merge_style(&mut out, "node", to_value(&node)?);
            merge_style(&mut out, "link", json!({ "color": c.links.color }));
            out.insert(
                "children".to_string(),
                decorate_children(pass, config, record, path)?,
            );
        }
        GraphConfig::BubbleChart(c) => {
            require_label(&out, path)?;
            optional_number(&out, "value", path)?;
            merge_style(
                &mut out,
                "node",
                json!({ "strokeColorOnHover": c.nodes.stroke_color_on_hover }),
            );
            out.insert(
                "children".to_string(),
                decorate_children(pass, config, record, path)?,
            );
        }
        GraphConfig::FlowChart(c) => {
            let node = NodeStyle {
                shape: c.nodes.shape,
                collapsed_color: c.nodes.collapsed_color.clone(),
                expanded_color: c.nodes.expanded_color.clone(),
                stroke_color: c.nodes.stroke_color.clone(),
                label_color: c.label.color.clone(),
                icon: c.nodes.icon.clone(),
                circle_radius: c.nodes.circle_radius,
                rectangle_dimensions: c.nodes.rectangle_dimensions,
                square_dimensions: c.nodes.square_dimensions,
                rhombus_dimensions: c.nodes.rhombus_dimensions,
            };
            merge_style(&mut out, "node", to_value(&node)?);
            merge_style(&mut out, "link", json!({ "color": c.links.color }));
            let cluster = ClusterStyle {
                level: 0.0,
                stroke_color: c.clusters.stroke_color.clone(),
                fill_color: c.clusters.fill_color.clone(),
                label: ClusterLabelStyle {
                    color: c.clusters.label.color.clone(),
                    position: c.clusters.label.position,
                    font_size: c.clusters.label.font_size,
                    padding: c.clusters.label.padding,
                },
            };
            merge_style(&mut out, "cluster", to_value(&cluster)?);
        }
    }
    Ok(Value::Object(out))
}

fn decorate_children(
    pass: &mut IdPass<'_>,
    config: &GraphConfig,
    record: &Map<String, Value>,
    path: &str,
) -> Result<Value> {
    let children = match record.get("children") {
        None | Some(Value::Null) => return Ok(Value::Array(Vec::new())),
        Some(Value::Array(children)) => children,
        Some(_) => return Err(Error::invalid_data(path, "children must be an array")),
    };
    let mut out = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        let child_path = format!("{path}.children[{i}]");
        out.push(decorate_record(pass, config, child, i, &child_path)?);
    }
    Ok(Value::Array(out))
}

fn decorate_flow(pass: &mut IdPass<'_>, config: &GraphConfig, data: &Value) -> Result<ChartData> {
    let section = |key: &'static str| data.get(key).map_or(Ok(&[][..]), |v| records_of(v, key));
    if !data.is_object() && !data.is_null() {
        return Err(Error::invalid_data(
            "data",
            "flow chart data must be an object with nodes, edges and clusters",
        ));
    }

    let mut nodes = Vec::new();
    for (i, raw) in section("nodes")?.iter().enumerate() {
        let path = format!("nodes[{i}]");
        let decorated = decorate_record(pass, config, raw, i, &path)?;
        require_label_value(&decorated, &path)?;
        nodes.push(typed::<FlowNodeDatum>(decorated, &path)?);
    }
    let known: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut edges = Vec::new();
    for (i, raw) in section("edges")?.iter().enumerate() {
        let path = format!("edges[{i}]");
        let decorated = decorate_record(pass, config, raw, i, &path)?;
        let edge = typed::<FlowEdgeDatum>(decorated, &path)?;
        for endpoint in [&edge.source, &edge.target] {
            if !known.contains(endpoint.as_str()) {
                return Err(Error::invalid_data(
                    &path,
                    format!("edge references unknown node {endpoint:?}"),
                ));
            }
        }
        edges.push(edge);
    }

    let mut clusters = Vec::new();
    for (i, raw) in section("clusters")?.iter().enumerate() {
        let path = format!("clusters[{i}]");
        let decorated = decorate_record(pass, config, raw, i, &path)?;
        let cluster = typed::<ClusterDatum>(decorated, &path)?;
        if let Some(missing) = cluster.nodes.iter().find(|n| !known.contains(n.as_str())) {
            return Err(Error::invalid_data(
                &path,
                format!("cluster references unknown node {missing:?}"),
            ));
        }
        if !cluster.cluster.level.is_finite() {
            return Err(Error::invalid_data(&path, "cluster.level must be finite"));
        }
        clusters.push(cluster);
    }

    Ok(ChartData::Flow(FlowData {
        nodes,
        edges,
        clusters,
    }))
}

fn require_label_value(record: &Value, path: &str) -> Result<()> {
    match record.as_object() {
        Some(map) => require_label(map, path),
        None => Err(Error::invalid_data(path, "record must be an object")),
    }
}

fn require_label(record: &Map<String, Value>, path: &str) -> Result<()> {
    match record.get("label") {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(Error::invalid_data(path, "label must be a string")),
        None => Err(Error::invalid_data(path, "missing required field `label`")),
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn require_number(record: &Map<String, Value>, key: &str, path: &str) -> Result<()> {
    match record.get(key) {
        None | Some(Value::Null) => Err(Error::invalid_data(
            path,
            format!("missing required field `{key}`"),
        )),
        Some(v) if finite(v).is_some() => Ok(()),
        Some(_) => Err(Error::invalid_data(
            path,
            format!("`{key}` must be a finite number"),
        )),
    }
}

fn optional_number(record: &Map<String, Value>, key: &str, path: &str) -> Result<()> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(v) if finite(v).is_some() => Ok(()),
        Some(_) => Err(Error::invalid_data(
            path,
            format!("`{key}` must be a finite number"),
        )),
    }
}

fn require_values(record: &Map<String, Value>, path: &str) -> Result<()> {
    let Some(values) = record.get("values") else {
        return Err(Error::invalid_data(path, "missing required field `values`"));
    };
    let Some(values) = values.as_array() else {
        return Err(Error::invalid_data(path, "`values` must be an array"));
    };
    match values.iter().position(|v| finite(v).is_none()) {
        Some(i) => Err(Error::invalid_data(
            path,
            format!("values[{i}] must be a finite number"),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_id_and_children() {
        let a = json!({"label": "a", "id": "x", "children": [{"label": "c"}]});
        let b = json!({"label": "a"});
        assert_eq!(
            fingerprint(a.as_object().unwrap()),
            fingerprint(b.as_object().unwrap())
        );
    }

    #[test]
    fn explicit_ids_are_collected_recursively() {
        let mut used = FxHashSet::default();
        collect_explicit_ids(
            &json!([{"id": "a", "children": [{"id": 7}, {"label": "x"}]}]),
            &mut used,
        );
        assert!(used.contains("a"));
        assert!(used.contains("7"));
        assert_eq!(used.len(), 2);
    }
}
