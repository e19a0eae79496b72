//! Path resolver: turns command arguments into concrete values.
//!
//! The first segment of a path names a program variable or, failing that, a
//! graph. Every later segment narrows the previous result:
//!
//! - graph → node (a node of that name, else a node variable that names a
//!   node of the graph)
//! - node → attribute key (own attributes, then the graph's node defaults)
//! - attribute-list variable → attribute key
//!
//! Resolution stops at the first segment that cannot be narrowed. A
//! single-segment path that names neither a variable nor a graph is taken
//! as a bare identifier.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::model::GraphModel;
use crate::value::{AttrMap, Value};
use graphgif_types::ast::{ArgValue, Argument, AttrOp, AttrValue, Ident, Path};
use serde::Serialize;
use tracing::debug;

/// The entity an argument resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolved {
    /// A program variable, by value.
    Variable { name: String, value: Value },
    Graph { id: String },
    /// A node of a graph with its merged attributes.
    Node {
        graph: String,
        name: String,
        attrs: AttrMap,
    },
    /// An attribute value or a literal argument.
    Scalar { value: AttrValue },
}

impl Resolved {
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Variable { .. } => "variable",
            Resolved::Graph { .. } => "graph",
            Resolved::Node { .. } => "node",
            Resolved::Scalar { .. } => "scalar",
        }
    }

    pub fn as_scalar(&self) -> Option<&AttrValue> {
        match self {
            Resolved::Scalar { value } => Some(value),
            _ => None,
        }
    }
}

/// `key op value` after resolution. The operator is passed through as
/// written; its meaning belongs to the handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedArg {
    pub key: String,
    pub op: AttrOp,
    pub value: Resolved,
}

pub struct PathResolver<'a> {
    env: &'a Environment,
    model: &'a GraphModel,
}

impl<'a> PathResolver<'a> {
    pub fn new(env: &'a Environment, model: &'a GraphModel) -> Self {
        Self { env, model }
    }

    pub fn resolve_arg(&self, arg: &Argument) -> EvalResult<ResolvedArg> {
        let value = match &arg.value {
            ArgValue::Path(path) => self.resolve_path(path)?,
            ArgValue::Literal(value) => Resolved::Scalar {
                value: value.clone(),
            },
        };
        debug!(key = %arg.key.name, op = %arg.op, resolved = value.kind(), "resolve argument");
        Ok(ResolvedArg {
            key: arg.key.name.clone(),
            op: arg.op,
            value,
        })
    }

    pub fn resolve_path(&self, path: &Path) -> EvalResult<Resolved> {
        let Some((first, rest)) = path.segments.split_first() else {
            return Err(EvalError::PathResolution {
                path: Vec::new(),
                failing_segment: String::new(),
                span: path.span,
            });
        };

        // A lone word that names nothing is a bare identifier, as in
        // `algorithm=bfs`. Longer paths must resolve from the root.
        if rest.is_empty() {
            return Ok(self.resolve_root(first).unwrap_or_else(|| Resolved::Scalar {
                value: AttrValue::Identifier(first.name.clone()),
            }));
        }

        let mut current = self
            .resolve_root(first)
            .ok_or_else(|| failure(path, first))?;
        for segment in rest {
            current = self
                .narrow(current, segment)
                .ok_or_else(|| failure(path, segment))?;
        }
        Ok(current)
    }

    fn resolve_root(&self, segment: &Ident) -> Option<Resolved> {
        if let Some(var) = self.env.get(&segment.name) {
            return Some(Resolved::Variable {
                name: var.name.clone(),
                value: var.value.clone(),
            });
        }
        self.model.get(&segment.name).map(|g| Resolved::Graph { id: g.id.clone() })
    }

    fn narrow(&self, current: Resolved, segment: &Ident) -> Option<Resolved> {
        let key = segment.name.as_str();
        match current {
            Resolved::Graph { id } => {
                let graph = self.model.get(&id)?;
                let name = if graph.has_node(key) {
                    key.to_string()
                } else {
                    match self.env.get(key).map(|v| &v.value) {
                        Some(Value::NodeRef(n)) if graph.has_node(n) => n.clone(),
                        _ => return None,
                    }
                };
                let attrs = graph.node(&name)?.clone();
                Some(Resolved::Node {
                    graph: id,
                    name,
                    attrs,
                })
            }
            Resolved::Node { graph, name, attrs } => attrs
                .get(key)
                .or_else(|| self.model.node_attr(&graph, &name, key))
                .map(|value| Resolved::Scalar {
                    value: value.clone(),
                }),
            Resolved::Variable {
                value: Value::AttrList(map),
                ..
            } => map.get(key).map(|value| Resolved::Scalar {
                value: value.clone(),
            }),
            Resolved::Variable { .. } | Resolved::Scalar { .. } => None,
        }
    }
}

fn failure(path: &Path, segment: &Ident) -> EvalError {
    EvalError::PathResolution {
        path: path.names(),
        failing_segment: segment.name.clone(),
        span: segment.span,
    }
}
