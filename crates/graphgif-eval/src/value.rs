//! Runtime values bound to variables.

use graphgif_types::ast::{AttrValue, EdgeOp, VarType};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Ordered attribute map. Keys keep first-insertion order.
pub type AttrMap = IndexMap<String, AttrValue>;

/// Merge `overlay` into `base`, last write wins per key.
pub fn merge_attrs(base: &mut AttrMap, overlay: &AttrMap) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// An edge with endpoints in canonical `(source, target)` order.
///
/// `a <- b` is stored as source `b`, target `a`; `op` keeps the operator as
/// written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    pub op: EdgeOp,
    pub attrs: AttrMap,
}

impl EdgeSpec {
    pub fn new(from: impl Into<String>, op: EdgeOp, to: impl Into<String>) -> Self {
        let (from, to) = (from.into(), to.into());
        let (source, target) = match op {
            EdgeOp::Backward => (to, from),
            EdgeOp::Forward | EdgeOp::Undirected => (from, to),
        };
        Self {
            source,
            target,
            op,
            attrs: AttrMap::new(),
        }
    }

    pub fn with_attrs(mut self, attrs: AttrMap) -> Self {
        self.attrs = attrs;
        self
    }
}

impl fmt::Display for EdgeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.op.is_directed() { "->" } else { "--" };
        write!(f, "{} {op} {}", self.source, self.target)
    }
}

/// The value of a variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A single node, by name. The node need not exist in any graph yet.
    NodeRef(String),
    /// Ordered node names; duplicates allowed.
    NodeList(Vec<String>),
    EdgeList(Vec<EdgeSpec>),
    AttrList(AttrMap),
}

impl Value {
    /// The declared type this value is compatible with.
    pub fn var_type(&self) -> VarType {
        match self {
            Value::NodeRef(_) | Value::NodeList(_) => VarType::Node,
            Value::EdgeList(_) => VarType::Edge,
            Value::AttrList(_) => VarType::Attributes,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::NodeRef(_) => "node reference",
            Value::NodeList(_) => "node list",
            Value::EdgeList(_) => "edge list",
            Value::AttrList(_) => "attribute list",
        }
    }

    /// Node names denoted by a node value.
    pub fn node_names(&self) -> Option<Vec<String>> {
        match self {
            Value::NodeRef(n) => Some(vec![n.clone()]),
            Value::NodeList(ns) => Some(ns.clone()),
            _ => None,
        }
    }
}

/// A bound variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub declared_type: VarType,
    pub value: Value,
    #[serde(skip)]
    pub span: graphgif_types::Span,
}
