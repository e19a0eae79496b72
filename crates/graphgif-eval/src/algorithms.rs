//! Built-in traversal and shortest-path handlers.
//!
//! Each algorithm records one [`Step`] per visited node so a renderer can
//! turn the run into frames. Colours follow one convention throughout:
//! yellow for nodes waiting in the frontier, red for the node being
//! processed, green for visited nodes and blue for the final shortest path.
//!
//! Every algorithm declares its [`Requirements`]; handlers check them
//! before running. The `animate` handler takes the algorithm from an
//! `algorithm=` argument, or infers it from the endpoints it was given.

use crate::dispatch::HandlerRegistry;
use crate::error::HandlerError;
use crate::model::{Graph, GraphModel};
use crate::resolver::{Resolved, ResolvedArg};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgorithmError {
    #[error("Graph has no nodes")]
    EmptyGraph,

    #[error("{algorithm} requires at least {min} nodes, got {found}")]
    TooFewNodes {
        algorithm: &'static str,
        min: usize,
        found: usize,
    },

    #[error("Start node '{0}' not found in graph")]
    StartNotFound(String),

    #[error("Target node '{0}' not found in graph")]
    TargetNotFound(String),

    #[error("negative weight {weight} on edge {from} -> {to}")]
    NegativeWeight { from: String, to: String, weight: f64 },

    #[error("non-numeric weight on edge {from} -> {to}")]
    NonNumericWeight { from: String, to: String },

    #[error("{algorithm} supports at most {max} nodes, got {found}")]
    TooManyNodes {
        algorithm: &'static str,
        max: usize,
        found: usize,
    },

    #[error("{0} requires a directed graph")]
    RequiresDirected(&'static str),

    #[error("{0} requires an undirected graph")]
    RequiresUndirected(&'static str),

    #[error("{0} requires weighted edges")]
    RequiresWeighted(&'static str),

    #[error("{0} requires a connected graph")]
    NotConnected(&'static str),

    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("unknown graph '{0}'")]
    UnknownGraph(String),

    #[error("expected a 'start' node path or a 'graph' argument")]
    MissingGraph,

    #[error("argument '{key}' must be {expected}, found {found}")]
    BadArgument {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

// ══════════════════════════════════════════════════════════════════════════════
// Catalogue
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Traversal,
    ShortestPath,
}

/// What a graph must look like before an algorithm may run on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirements {
    pub name: &'static str,
    pub kind: AlgorithmKind,
    /// `Some(true)` directed only, `Some(false)` undirected only.
    pub requires_directed: Option<bool>,
    pub requires_weighted: bool,
    pub requires_connected: bool,
    pub min_nodes: usize,
    pub max_nodes: Option<usize>,
}

impl Requirements {
    /// First unmet requirement, checked in order: node count,
    /// directedness, weights, connectivity.
    pub fn check(&self, graph: &Graph) -> Result<(), AlgorithmError> {
        let found = graph.nodes.len();
        if found == 0 && self.min_nodes > 0 {
            return Err(AlgorithmError::EmptyGraph);
        }
        if found < self.min_nodes {
            return Err(AlgorithmError::TooFewNodes {
                algorithm: self.name,
                min: self.min_nodes,
                found,
            });
        }
        if let Some(max) = self.max_nodes.filter(|max| found > *max) {
            return Err(AlgorithmError::TooManyNodes {
                algorithm: self.name,
                max,
                found,
            });
        }
        match self.requires_directed {
            Some(true) if !graph.directed => return Err(AlgorithmError::RequiresDirected(self.name)),
            Some(false) if graph.directed => return Err(AlgorithmError::RequiresUndirected(self.name)),
            _ => {}
        }
        if self.requires_weighted && !graph.is_weighted() {
            return Err(AlgorithmError::RequiresWeighted(self.name));
        }
        if self.requires_connected && !graph.is_connected() {
            return Err(AlgorithmError::NotConnected(self.name));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    Dfs,
    Dijkstra,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Dijkstra];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dijkstra => "dijkstra",
        }
    }

    /// Case-insensitive; long-form names are accepted too.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bfs" | "breadth_first" => Some(Algorithm::Bfs),
            "dfs" | "depth_first" => Some(Algorithm::Dfs),
            "dijkstra" | "shortest_path" => Some(Algorithm::Dijkstra),
            _ => None,
        }
    }

    pub fn requirements(self) -> Requirements {
        let (kind, requires_weighted, min_nodes) = match self {
            Algorithm::Bfs | Algorithm::Dfs => (AlgorithmKind::Traversal, false, 1),
            Algorithm::Dijkstra => (AlgorithmKind::ShortestPath, true, 2),
        };
        Requirements {
            name: self.name(),
            kind,
            requires_directed: None,
            requires_weighted,
            requires_connected: false,
            min_nodes,
            max_nodes: None,
        }
    }

    /// Check the requirements, then run. `target` only matters to Dijkstra.
    pub fn run(self, graph: &Graph, start: &str, target: Option<&str>) -> Result<Run, AlgorithmError> {
        self.requirements().check(graph)?;
        match self {
            Algorithm::Bfs => breadth_first(graph, start),
            Algorithm::Dfs => depth_first(graph, start),
            Algorithm::Dijkstra => dijkstra(graph, start, target),
        }
    }
}

/// Whether one algorithm can run on a particular graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suitability {
    pub requirements: Requirements,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn available_algorithms() -> Vec<&'static str> {
    Algorithm::ALL.iter().map(|a| a.name()).collect()
}

pub fn algorithm_info(name: &str) -> Option<Requirements> {
    Algorithm::from_name(name).map(Algorithm::requirements)
}

pub fn validate_algorithm_for_graph(name: &str, graph: &Graph) -> Result<(), AlgorithmError> {
    Algorithm::from_name(name)
        .ok_or_else(|| AlgorithmError::UnknownAlgorithm(name.to_string()))?
        .requirements()
        .check(graph)
}

/// Every known algorithm with its verdict for `graph`.
pub fn algorithms_for_graph(graph: &Graph) -> IndexMap<&'static str, Suitability> {
    Algorithm::ALL
        .iter()
        .map(|a| {
            let requirements = a.requirements();
            let reason = requirements.check(graph).err().map(|e| e.to_string());
            let suitability = Suitability {
                requirements,
                valid: reason.is_none(),
                reason,
            };
            (a.name(), suitability)
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// Run records
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    Yellow,
    Red,
    Green,
    Blue,
}

/// Snapshot of an algorithm after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub step: usize,
    pub description: String,
    pub current: Option<String>,
    /// Visited nodes in visit order.
    pub visited: Vec<String>,
    /// Queue, stack or open set, depending on the algorithm.
    pub frontier: Vec<String>,
    pub colors: IndexMap<String, NodeColor>,
    /// Tentative distances; `None` means unreachable so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<IndexMap<String, Option<f64>>>,
}

/// A complete recorded run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub algorithm: &'static str,
    pub graph: String,
    pub start: String,
    pub steps: Vec<Step>,
    pub result: serde_json::Value,
}

// ══════════════════════════════════════════════════════════════════════════════
// Traversal
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Breadth,
    Depth,
}

impl Order {
    fn name(self) -> &'static str {
        match self {
            Order::Breadth => "bfs",
            Order::Depth => "dfs",
        }
    }

    fn frontier_name(self) -> &'static str {
        match self {
            Order::Breadth => "queue",
            Order::Depth => "stack",
        }
    }
}

fn adjacency(graph: &Graph) -> IndexMap<&str, Vec<&str>> {
    let mut adj: IndexMap<&str, Vec<&str>> =
        graph.node_names().map(|n| (n, Vec::new())).collect();
    for edge in &graph.edges {
        adj.entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        if !graph.directed {
            adj.entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }
    }
    adj
}

fn colors<'a>(
    visited: impl IntoIterator<Item = &'a str>,
    current: Option<&str>,
    frontier: impl IntoIterator<Item = &'a str>,
    visited_set: &IndexSet<&str>,
) -> IndexMap<String, NodeColor> {
    let mut out: IndexMap<String, NodeColor> = visited
        .into_iter()
        .map(|n| (n.to_string(), NodeColor::Green))
        .collect();
    if let Some(current) = current {
        out.insert(current.to_string(), NodeColor::Red);
    }
    for n in frontier {
        if !visited_set.contains(n) {
            out.insert(n.to_string(), NodeColor::Yellow);
        }
    }
    out
}

fn strings<'a, 'b: 'a>(names: impl IntoIterator<Item = &'a &'b str>) -> Vec<String> {
    names.into_iter().map(|n| n.to_string()).collect()
}

fn traverse(graph: &Graph, start: &str, order: Order) -> Result<Run, AlgorithmError> {
    if graph.nodes.is_empty() {
        return Err(AlgorithmError::EmptyGraph);
    }
    if !graph.has_node(start) {
        return Err(AlgorithmError::StartNotFound(start.to_string()));
    }

    let adj = adjacency(graph);
    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut frontier: VecDeque<&str> = VecDeque::from([start]);
    let mut steps = vec![Step {
        step: 0,
        description: format!("Initialize {} from node {start}", order.name().to_uppercase()),
        current: Some(start.to_string()),
        visited: Vec::new(),
        frontier: vec![start.to_string()],
        colors: IndexMap::from([(start.to_string(), NodeColor::Yellow)]),
        distances: None,
    }];

    loop {
        let next = match order {
            Order::Breadth => frontier.pop_front(),
            Order::Depth => frontier.pop_back(),
        };
        let Some(current) = next else { break };
        if !visited.insert(current) {
            continue;
        }

        let neighbors = adj.get(current).map(Vec::as_slice).unwrap_or_default();
        match order {
            Order::Breadth => {
                for &n in neighbors {
                    if !visited.contains(n) && !frontier.contains(&n) {
                        frontier.push_back(n);
                    }
                }
            }
            Order::Depth => {
                for &n in neighbors.iter().rev() {
                    if !visited.contains(n) {
                        frontier.push_back(n);
                    }
                }
            }
        }

        steps.push(Step {
            step: steps.len(),
            description: format!(
                "Visit node {current}, add neighbors to {}",
                order.frontier_name()
            ),
            current: Some(current.to_string()),
            visited: strings(&visited),
            frontier: strings(&frontier),
            colors: colors(visited.iter().copied(), Some(current), frontier.iter().copied(), &visited),
            distances: None,
        });
    }

    steps.push(Step {
        step: steps.len(),
        description: format!("{} completed", order.name().to_uppercase()),
        current: None,
        visited: strings(&visited),
        frontier: Vec::new(),
        colors: colors(visited.iter().copied(), None, [], &visited),
        distances: None,
    });

    let visit_order = strings(&visited);
    Ok(Run {
        algorithm: order.name(),
        graph: graph.id.clone(),
        start: start.to_string(),
        steps,
        result: serde_json::json!({
            "visit_order": visit_order,
            "visited_count": visit_order.len(),
        }),
    })
}

/// Breadth-first traversal from `start`.
pub fn breadth_first(graph: &Graph, start: &str) -> Result<Run, AlgorithmError> {
    traverse(graph, start, Order::Breadth)
}

/// Depth-first traversal from `start`. Neighbours are explored in edge
/// order.
pub fn depth_first(graph: &Graph, start: &str) -> Result<Run, AlgorithmError> {
    traverse(graph, start, Order::Depth)
}

// ══════════════════════════════════════════════════════════════════════════════
// Shortest Path
// ══════════════════════════════════════════════════════════════════════════════

/// Adjacency with numeric weights taken from the effective `weight`
/// attribute, default 1.
fn weighted_adjacency(graph: &Graph) -> Result<IndexMap<&str, Vec<(&str, f64)>>, AlgorithmError> {
    let mut adj: IndexMap<&str, Vec<(&str, f64)>> =
        graph.node_names().map(|n| (n, Vec::new())).collect();
    for edge in &graph.edges {
        let weight = match graph.effective_edge_attrs(edge).get("weight") {
            None => 1.0,
            Some(value) => match value.as_number() {
                Some(w) if w < 0.0 => {
                    return Err(AlgorithmError::NegativeWeight {
                        from: edge.source.clone(),
                        to: edge.target.clone(),
                        weight: w,
                    })
                }
                Some(w) => w,
                None => {
                    return Err(AlgorithmError::NonNumericWeight {
                        from: edge.source.clone(),
                        to: edge.target.clone(),
                    })
                }
            },
        };
        adj.entry(edge.source.as_str())
            .or_default()
            .push((edge.target.as_str(), weight));
        if !graph.directed {
            adj.entry(edge.target.as_str())
                .or_default()
                .push((edge.source.as_str(), weight));
        }
    }
    Ok(adj)
}

fn distance_snapshot(dist: &IndexMap<&str, f64>) -> IndexMap<String, Option<f64>> {
    dist.iter()
        .map(|(n, d)| (n.to_string(), d.is_finite().then_some(*d)))
        .collect()
}

/// Dijkstra's algorithm from `start`. With a `target` the run stops once
/// the target is settled and reports the path to it.
pub fn dijkstra(graph: &Graph, start: &str, target: Option<&str>) -> Result<Run, AlgorithmError> {
    if graph.nodes.len() < 2 {
        return Err(AlgorithmError::TooFewNodes {
            algorithm: "dijkstra",
            min: 2,
            found: graph.nodes.len(),
        });
    }
    if !graph.has_node(start) {
        return Err(AlgorithmError::StartNotFound(start.to_string()));
    }
    if let Some(t) = target.filter(|t| !graph.has_node(t)) {
        return Err(AlgorithmError::TargetNotFound(t.to_string()));
    }

    let adj = weighted_adjacency(graph)?;
    let mut dist: IndexMap<&str, f64> = graph.node_names().map(|n| (n, f64::INFINITY)).collect();
    dist.insert(start, 0.0);
    let mut prev: HashMap<&str, &str> = HashMap::new();
    let mut visited: IndexSet<&str> = IndexSet::new();

    let mut steps = vec![Step {
        step: 0,
        description: format!("Initialize Dijkstra from node {start}"),
        current: Some(start.to_string()),
        visited: Vec::new(),
        frontier: vec![start.to_string()],
        colors: IndexMap::from([(start.to_string(), NodeColor::Yellow)]),
        distances: Some(distance_snapshot(&dist)),
    }];

    loop {
        let next = dist
            .iter()
            .filter(|(n, d)| d.is_finite() && !visited.contains(*n))
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(n, d)| (*n, *d));
        let Some((current, current_dist)) = next else { break };
        visited.insert(current);

        for &(n, w) in adj.get(current).map(Vec::as_slice).unwrap_or_default() {
            if visited.contains(n) {
                continue;
            }
            let candidate = current_dist + w;
            if dist.get(n).is_some_and(|d| candidate < *d) {
                dist.insert(n, candidate);
                prev.insert(n, current);
            }
        }

        let open: Vec<&str> = dist
            .iter()
            .filter(|(n, d)| d.is_finite() && !visited.contains(*n))
            .map(|(n, _)| *n)
            .collect();
        steps.push(Step {
            step: steps.len(),
            description: format!("Process node {current} (distance: {current_dist})"),
            current: Some(current.to_string()),
            visited: strings(&visited),
            frontier: strings(&open),
            colors: colors(visited.iter().copied(), Some(current), open.iter().copied(), &visited),
            distances: Some(distance_snapshot(&dist)),
        });

        if target == Some(current) {
            break;
        }
    }

    let mut path: Vec<&str> = Vec::new();
    if let Some(t) = target.filter(|t| dist.get(t).is_some_and(|d| d.is_finite())) {
        let mut node = t;
        path.push(node);
        while let Some(&p) = prev.get(node) {
            path.push(p);
            node = p;
        }
        path.reverse();
    }

    let mut final_colors = colors(visited.iter().copied(), None, [], &visited);
    for n in &path {
        final_colors.insert(n.to_string(), NodeColor::Blue);
    }
    steps.push(Step {
        step: steps.len(),
        description: "Dijkstra completed".to_string(),
        current: None,
        visited: strings(&visited),
        frontier: Vec::new(),
        colors: final_colors,
        distances: Some(distance_snapshot(&dist)),
    });

    let path_length = target.and_then(|t| dist.get(t).copied()).filter(|d| d.is_finite());
    Ok(Run {
        algorithm: "dijkstra",
        graph: graph.id.clone(),
        start: start.to_string(),
        steps,
        result: serde_json::json!({
            "distances": distance_snapshot(&dist),
            "shortest_path": strings(&path),
            "path_length": path_length,
        }),
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Handlers
// ══════════════════════════════════════════════════════════════════════════════

/// Accepted spellings of the start and target arguments.
const START_KEYS: [&str; 3] = ["start", "start_node", "source"];
const TARGET_KEYS: [&str; 3] = ["target", "target_node", "destination"];

fn arg<'a>(args: &'a [ResolvedArg], keys: &[&str]) -> Option<(&'a str, &'a Resolved)> {
    args.iter()
        .find(|a| keys.contains(&a.key.as_str()))
        .map(|a| (a.key.as_str(), &a.value))
}

/// The graph a command addresses and the explicit start node, if any.
fn select_graph<'m>(
    model: &'m GraphModel,
    args: &[ResolvedArg],
) -> Result<(&'m Graph, Option<String>), AlgorithmError> {
    let (id, start) = match (arg(args, &START_KEYS), arg(args, &["graph"])) {
        (Some((_, Resolved::Node { graph, name, .. })), _) => (graph.clone(), Some(name.clone())),
        (Some((key, other)), _) => {
            return Err(AlgorithmError::BadArgument {
                key: key.into(),
                expected: "a node path such as g.a",
                found: other.kind(),
            })
        }
        (None, Some((_, Resolved::Graph { id }))) => (id.clone(), None),
        (None, Some((key, other))) => {
            return Err(AlgorithmError::BadArgument {
                key: key.into(),
                expected: "a graph id",
                found: other.kind(),
            })
        }
        (None, None) => return Err(AlgorithmError::MissingGraph),
    };
    let graph = model
        .get(&id)
        .ok_or_else(|| AlgorithmError::UnknownGraph(id.clone()))?;
    Ok((graph, start))
}

fn start_node(graph: &Graph, start: Option<String>) -> Result<String, AlgorithmError> {
    match start {
        Some(s) => Ok(s),
        None => graph
            .node_names()
            .next()
            .map(str::to_string)
            .ok_or(AlgorithmError::EmptyGraph),
    }
}

fn target_node<'a>(graph: &Graph, args: &'a [ResolvedArg]) -> Result<Option<&'a str>, AlgorithmError> {
    match arg(args, &TARGET_KEYS) {
        None => Ok(None),
        Some((_, Resolved::Node { graph: g, name, .. })) if *g == graph.id => Ok(Some(name.as_str())),
        Some((key, other)) => Err(AlgorithmError::BadArgument {
            key: key.into(),
            expected: "a node of the start graph",
            found: other.kind(),
        }),
    }
}

/// `algorithm=<name>` when given. Otherwise a start and a target mean a
/// shortest path, anything else a breadth-first traversal.
fn choose_algorithm(args: &[ResolvedArg]) -> Result<Algorithm, AlgorithmError> {
    match arg(args, &["algorithm"]) {
        Some((key, Resolved::Scalar { value })) => {
            let name = value.as_text().ok_or_else(|| AlgorithmError::BadArgument {
                key: key.into(),
                expected: "an algorithm name",
                found: "number",
            })?;
            Algorithm::from_name(name).ok_or_else(|| AlgorithmError::UnknownAlgorithm(name.to_string()))
        }
        Some((key, other)) => Err(AlgorithmError::BadArgument {
            key: key.into(),
            expected: "an algorithm name",
            found: other.kind(),
        }),
        None if arg(args, &START_KEYS).is_some() && arg(args, &TARGET_KEYS).is_some() => {
            Ok(Algorithm::Dijkstra)
        }
        None => Ok(Algorithm::Bfs),
    }
}

fn run_algorithm(
    algorithm: Algorithm,
    model: &GraphModel,
    args: &[ResolvedArg],
) -> Result<serde_json::Value, HandlerError> {
    let (graph, start) = select_graph(model, args)?;
    let start = start_node(graph, start)?;
    let target = match algorithm {
        Algorithm::Dijkstra => target_node(graph, args)?,
        Algorithm::Bfs | Algorithm::Dfs => None,
    };
    debug!(algorithm = algorithm.name(), graph = %graph.id, %start, "run algorithm");
    Ok(serde_json::to_value(algorithm.run(graph, &start, target)?)?)
}

fn bfs_handler(model: &GraphModel, args: &[ResolvedArg]) -> Result<serde_json::Value, HandlerError> {
    run_algorithm(Algorithm::Bfs, model, args)
}

fn dfs_handler(model: &GraphModel, args: &[ResolvedArg]) -> Result<serde_json::Value, HandlerError> {
    run_algorithm(Algorithm::Dfs, model, args)
}

fn dijkstra_handler(
    model: &GraphModel,
    args: &[ResolvedArg],
) -> Result<serde_json::Value, HandlerError> {
    run_algorithm(Algorithm::Dijkstra, model, args)
}

fn animate_handler(
    model: &GraphModel,
    args: &[ResolvedArg],
) -> Result<serde_json::Value, HandlerError> {
    run_algorithm(choose_algorithm(args)?, model, args)
}

/// Install `bfs`, `dfs` and `dijkstra`, their long-form aliases, and
/// `animate`, which picks the algorithm from its arguments.
pub fn register_builtins(registry: &mut HandlerRegistry) {
    registry
        .register("bfs", bfs_handler)
        .register("breadth_first", bfs_handler)
        .register("dfs", dfs_handler)
        .register("depth_first", dfs_handler)
        .register("dijkstra", dijkstra_handler)
        .register("shortest_path", dijkstra_handler)
        .register("animate", animate_handler);
}
