//! The validated graph model produced by evaluation.

use crate::value::{merge_attrs, AttrMap, EdgeSpec};
use graphgif_types::ast::AttrValue;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// A finished graph. Immutable once its declaration has been evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub id: String,
    pub directed: bool,
    /// `graph [..]` / `attributes [..]` entries, merged in order.
    pub global_attrs: AttrMap,
    /// `node [..]` defaults. Not baked into individual nodes.
    pub node_defaults: AttrMap,
    /// `edge [..]` defaults. Not baked into individual edges.
    pub edge_defaults: AttrMap,
    /// Nodes in first-mention order with their merged attributes.
    pub nodes: IndexMap<String, AttrMap>,
    pub edges: Vec<EdgeSpec>,
}

impl Graph {
    pub fn new(id: impl Into<String>, directed: bool) -> Self {
        Self {
            id: id.into(),
            directed,
            global_attrs: AttrMap::new(),
            node_defaults: AttrMap::new(),
            edge_defaults: AttrMap::new(),
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Get-or-create: returns the node's attributes, creating the node with
    /// empty attributes if it does not exist yet.
    pub fn node_entry(&mut self, name: &str) -> &mut AttrMap {
        self.nodes.entry(name.to_string()).or_default()
    }

    pub fn node(&self, name: &str) -> Option<&AttrMap> {
        self.nodes.get(name)
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Node defaults overlaid with the node's own attributes.
    pub fn effective_node_attrs(&self, name: &str) -> Option<AttrMap> {
        let own = self.nodes.get(name)?;
        let mut attrs = self.node_defaults.clone();
        merge_attrs(&mut attrs, own);
        Some(attrs)
    }

    /// Edge defaults overlaid with the edge's own attributes.
    pub fn effective_edge_attrs(&self, edge: &EdgeSpec) -> AttrMap {
        let mut attrs = self.edge_defaults.clone();
        merge_attrs(&mut attrs, &edge.attrs);
        attrs
    }

    /// Outgoing neighbours with their effective edge attributes, in edge
    /// order. Undirected edges are followed both ways.
    pub fn neighbors(&self, name: &str) -> Vec<(&str, AttrMap)> {
        let mut out = Vec::new();
        for edge in &self.edges {
            if edge.source == name {
                out.push((edge.target.as_str(), self.effective_edge_attrs(edge)));
            } else if !self.directed && edge.target == name {
                out.push((edge.source.as_str(), self.effective_edge_attrs(edge)));
            }
        }
        out
    }

    /// True when some edge carries a `weight`, directly or via the edge
    /// defaults.
    pub fn is_weighted(&self) -> bool {
        !self.edges.is_empty()
            && (self.edge_defaults.contains_key("weight")
                || self.edges.iter().any(|e| e.attrs.contains_key("weight")))
    }

    /// Weak connectivity: edge direction is ignored. Graphs with fewer than
    /// two nodes are connected.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.nodes.keys().next() else {
            return true;
        };
        let mut adj: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for edge in &self.edges {
            adj.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
            adj.entry(edge.target.as_str()).or_default().push(edge.source.as_str());
        }
        let mut seen: IndexSet<&str> = IndexSet::from([first.as_str()]);
        let mut queue: VecDeque<&str> = VecDeque::from([first.as_str()]);
        while let Some(node) = queue.pop_front() {
            for &next in adj.get(node).map(Vec::as_slice).unwrap_or_default() {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() == self.nodes.len()
    }

    /// Nodes that no edge touches, in declaration order.
    pub fn isolated_nodes(&self) -> Vec<&str> {
        self.node_names()
            .filter(|n| !self.edges.iter().any(|e| e.source == *n || e.target == *n))
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            id: self.id.clone(),
            directed: self.directed,
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            isolated: self.isolated_nodes().into_iter().map(str::to_string).collect(),
            weighted: self.is_weighted(),
            connected: self.is_connected(),
        }
    }
}

/// Structural summary of one graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub id: String,
    pub directed: bool,
    pub nodes: usize,
    pub edges: usize,
    pub isolated: Vec<String>,
    pub weighted: bool,
    pub connected: bool,
}

fn write_attrs(f: &mut fmt::Formatter<'_>, attrs: &AttrMap) -> fmt::Result {
    if attrs.is_empty() {
        return Ok(());
    }
    f.write_str(" [")?;
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}={value}")?;
    }
    f.write_str("]")
}

/// DOT-like rendering, mainly for logs and test failure output.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, op) = if self.directed {
            ("digraph", "->")
        } else {
            ("graph", "--")
        };
        writeln!(f, "{kind} {} {{", self.id)?;
        for (target, attrs) in [
            ("graph", &self.global_attrs),
            ("node", &self.node_defaults),
            ("edge", &self.edge_defaults),
        ] {
            if !attrs.is_empty() {
                write!(f, "  {target}")?;
                write_attrs(f, attrs)?;
                writeln!(f, ";")?;
            }
        }
        for (name, attrs) in &self.nodes {
            write!(f, "  {name}")?;
            write_attrs(f, attrs)?;
            writeln!(f, ";")?;
        }
        for edge in &self.edges {
            write!(f, "  {} {op} {}", edge.source, edge.target)?;
            write_attrs(f, &edge.attrs)?;
            writeln!(f, ";")?;
        }
        f.write_str("}")
    }
}

/// All graphs of a program, by id, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GraphModel {
    graphs: IndexMap<String, Graph>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Graph> {
        self.graphs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.graphs.contains_key(id)
    }

    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Add a finished graph. Duplicate ids are rejected by the builder
    /// before a graph gets here.
    pub(crate) fn insert(&mut self, graph: Graph) {
        self.graphs.insert(graph.id.clone(), graph);
    }

    /// Look up an attribute of a node, falling back to the node defaults.
    pub fn node_attr(&self, graph: &str, node: &str, key: &str) -> Option<&AttrValue> {
        let g = self.graphs.get(graph)?;
        g.nodes
            .get(node)?
            .get(key)
            .or_else(|| g.node_defaults.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphgif_types::ast::EdgeOp;

    fn attrs(pairs: &[(&str, AttrValue)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sample() -> Graph {
        let mut g = Graph::new("g", true);
        g.global_attrs = attrs(&[("color", AttrValue::Identifier("red".into()))]);
        g.node_entry("a");
        g.node_entry("b")
            .insert("label".into(), AttrValue::String("B".into()));
        g.edges.push(
            EdgeSpec::new("a", EdgeOp::Forward, "b")
                .with_attrs(attrs(&[("weight", AttrValue::Number(3.0))])),
        );
        g
    }

    #[test]
    fn node_entry_is_get_or_create() {
        let mut g = Graph::new("g", false);
        g.node_entry("a").insert("k".into(), AttrValue::Number(1.0));
        g.node_entry("a");
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.node("a").map(|a| a.len()), Some(1));
    }

    #[test]
    fn effective_attrs_overlay_defaults() {
        let mut g = sample();
        g.node_defaults = attrs(&[
            ("shape", AttrValue::Identifier("box".into())),
            ("label", AttrValue::String("default".into())),
        ]);
        let b = g.effective_node_attrs("b").unwrap();
        assert_eq!(b["shape"], AttrValue::Identifier("box".into()));
        assert_eq!(b["label"], AttrValue::String("B".into()));
        assert!(g.effective_node_attrs("zz").is_none());
    }

    #[test]
    fn neighbors_respect_direction() {
        let g = sample();
        assert_eq!(g.neighbors("a").len(), 1);
        assert!(g.neighbors("b").is_empty());

        let mut u = sample();
        u.directed = false;
        assert_eq!(u.neighbors("b")[0].0, "a");
    }

    #[test]
    fn display_is_dot_like() {
        let text = sample().to_string();
        assert_eq!(
            text,
            "digraph g {\n  graph [color=red];\n  a;\n  b [label=\"B\"];\n  a -> b [weight=3];\n}"
        );
    }

    #[test]
    fn connectivity_ignores_direction() {
        let mut g = sample();
        assert!(g.is_connected());
        g.node_entry("c");
        assert!(!g.is_connected());
        g.edges.push(EdgeSpec::new("c", EdgeOp::Backward, "b"));
        assert!(g.is_connected());
        assert!(Graph::new("empty", true).is_connected());
    }

    #[test]
    fn stats_summarize_structure() {
        let mut g = sample();
        g.node_entry("lonely");
        let stats = g.stats();
        assert_eq!((stats.nodes, stats.edges), (3, 1));
        assert_eq!(stats.isolated, vec!["lonely"]);
        assert!(stats.weighted && stats.directed);
        assert!(!stats.connected);

        let mut plain = Graph::new("p", false);
        plain.edges.push(EdgeSpec::new("a", EdgeOp::Undirected, "b"));
        assert!(!plain.is_weighted());
        plain.edge_defaults.insert("weight".into(), AttrValue::Number(2.0));
        assert!(plain.is_weighted());
    }

    #[test]
    fn model_lookup() {
        let mut model = GraphModel::new();
        model.insert(sample());
        assert!(model.contains("g"));
        assert_eq!(model.len(), 1);
        assert_eq!(
            model.node_attr("g", "b", "label"),
            Some(&AttrValue::String("B".into()))
        );
        assert_eq!(model.node_attr("g", "a", "label"), None);
        assert_eq!(model.node_attr("h", "a", "label"), None);
    }
}
