//! Compound directed multigraph container.
//!
//! Nodes and edges keep insertion order, which makes every layout stage deterministic for a given
//! input. Parent links turn the graph into a compound graph: a node with children is a cluster.

use crate::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::hash::{Hash, Hasher};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type OrderedMap<K, V> = IndexMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub multigraph: bool,
    pub compound: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            multigraph: false,
            compound: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>, name: Option<String>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.v == self.w
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v && self.w == other.w && self.name == other.name
    }
}

impl Eq for EdgeKey {}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.hash(state);
        self.w.hash(state);
        self.name.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct Graph<N, E, G> {
    options: GraphOptions,
    label: G,
    nodes: OrderedMap<String, N>,
    edges: OrderedMap<EdgeKey, E>,
    parent: HashMap<String, String>,
    children: HashMap<Option<String>, Vec<String>>,
}

impl<N, E, G: Default> Graph<N, E, G> {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            label: G::default(),
            nodes: OrderedMap::default(),
            edges: OrderedMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
        }
    }
}

impl<N, E, G> Graph<N, E, G> {
    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn set_graph(&mut self, label: G) {
        self.label = label;
    }

    pub fn graph(&self) -> &G {
        &self.label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.label
    }

    /// Inserts a node or replaces the label of an existing one.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) {
        let id = id.into();
        if self.nodes.insert(id.clone(), label).is_none() {
            self.children.entry(None).or_default().push(id);
        }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.nodes.get_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|(id, n)| (id.as_str(), n))
    }

    pub fn for_each_node_mut(&mut self, mut f: impl FnMut(&str, &mut N)) {
        for (id, n) in self.nodes.iter_mut() {
            f(id, n);
        }
    }

    /// Removes a node, its incident edges and its parent link. Children move to the root.
    pub fn remove_node(&mut self, id: &str) -> Option<N> {
        let label = self.nodes.shift_remove(id)?;
        self.edges.retain(|k, _| k.v != id && k.w != id);
        self.detach(id);
        if let Some(kids) = self.children.remove(&Some(id.to_string())) {
            for kid in kids {
                self.parent.remove(&kid);
                self.children.entry(None).or_default().push(kid);
            }
        }
        Some(label)
    }

    fn detach(&mut self, id: &str) {
        let parent = self.parent.remove(id);
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|c| c != id);
        }
    }

    /// Makes `parent` the parent of `id`; `None` moves the node back to the root.
    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<()> {
        if !self.options.compound {
            return Err(Error::NotCompound);
        }
        if !self.has_node(id) {
            return Err(Error::UnknownNode { id: id.to_string() });
        }
        if let Some(p) = parent {
            if !self.has_node(p) {
                return Err(Error::UnknownNode { id: p.to_string() });
            }
            let mut ancestor = Some(p);
            while let Some(a) = ancestor {
                if a == id {
                    return Err(Error::ParentCycle {
                        node: id.to_string(),
                        parent: p.to_string(),
                    });
                }
                ancestor = self.parent(a);
            }
        }

        self.detach(id);
        let key = parent.map(str::to_string);
        if let Some(p) = &key {
            self.parent.insert(id.to_string(), p.clone());
        }
        self.children.entry(key).or_default().push(id.to_string());
        Ok(())
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent.get(id).map(String::as_str)
    }

    /// Direct children of `parent`, or the top level nodes for `None`, in insertion order.
    pub fn children(&self, parent: Option<&str>) -> &[String] {
        self.children
            .get(&parent.map(str::to_string))
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn is_cluster(&self, id: &str) -> bool {
        !self.children(Some(id)).is_empty()
    }

    /// Ancestors of `id` from its parent up to the top level cluster.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p.to_string());
            cur = self.parent(p);
        }
        out
    }

    pub fn set_edge(&mut self, v: &str, w: &str, label: E) -> Result<()> {
        self.set_edge_named(v, w, None, label)
    }

    pub fn set_edge_named(&mut self, v: &str, w: &str, name: Option<String>, label: E) -> Result<()> {
        for id in [v, w] {
            if !self.has_node(id) {
                return Err(Error::UnknownNode { id: id.to_string() });
            }
        }
        let name = if self.options.multigraph { name } else { None };
        self.edges.insert(EdgeKey::new(v, w, name), label);
        Ok(())
    }

    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&E> {
        self.edges.get(key)
    }

    pub fn edge_between(&self, v: &str, w: &str) -> Option<&E> {
        self.edges.get(&EdgeKey::new(v, w, None))
    }

    pub fn edge_mut(&mut self, key: &EdgeKey) -> Option<&mut E> {
        self.edges.get_mut(key)
    }

    pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<E> {
        self.edges.shift_remove(key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.keys().cloned().collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &E)> {
        self.edges.iter()
    }

    pub fn for_each_edge_mut(&mut self, mut f: impl FnMut(&EdgeKey, &mut E)) {
        for (k, e) in self.edges.iter_mut() {
            f(k, e);
        }
    }

    pub fn out_edges<'a>(&'a self, v: &'a str) -> impl Iterator<Item = (&'a EdgeKey, &'a E)> + 'a {
        self.edges.iter().filter(move |(k, _)| k.v == v)
    }

    pub fn in_edges<'a>(&'a self, w: &'a str) -> impl Iterator<Item = (&'a EdgeKey, &'a E)> + 'a {
        self.edges.iter().filter(move |(k, _)| k.w == w)
    }

    /// Builds `node -> [(neighbor, edge label)]` lists for successors, in edge insertion order.
    pub fn successor_lists(&self) -> HashMap<String, Vec<(String, &E)>> {
        let mut out: HashMap<String, Vec<(String, &E)>> = HashMap::default();
        for (k, e) in &self.edges {
            out.entry(k.v.clone()).or_default().push((k.w.clone(), e));
        }
        out
    }

    pub fn predecessor_lists(&self) -> HashMap<String, Vec<(String, &E)>> {
        let mut out: HashMap<String, Vec<(String, &E)>> = HashMap::default();
        for (k, e) in &self.edges {
            out.entry(k.w.clone()).or_default().push((k.v.clone(), e));
        }
        out
    }
}
