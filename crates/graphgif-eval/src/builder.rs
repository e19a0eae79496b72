//! Graph model builder and declaration evaluation.
//!
//! References (`$name`, node identifiers bound to node variables) are
//! resolved eagerly against the active scope chain when a declaration or
//! statement is evaluated, so stored values never point at other variables.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::model::{Graph, GraphModel};
use crate::value::{merge_attrs, AttrMap, EdgeSpec, Value};
use graphgif_types::ast::*;
use graphgif_types::Span;
use indexmap::IndexMap;
use tracing::{debug, info};

// ══════════════════════════════════════════════════════════════════════════════
// Variables
// ══════════════════════════════════════════════════════════════════════════════

/// Evaluate a `var` declaration into the innermost scope of `env`.
pub(crate) fn declare_var(env: &mut Environment, decl: &VarDecl) -> EvalResult<()> {
    env.check_unbound_here(&decl.name.name, decl.name.span)?;
    let value = eval_var_value(env, decl)?;
    env.declare(&decl.name.name, decl.var_type, value, decl.name.span)
}

fn eval_var_value(env: &Environment, decl: &VarDecl) -> EvalResult<Value> {
    match (&decl.value, decl.var_type) {
        // An unbound `$a` in a node declaration names node `a` itself.
        (VarValue::Ref(r), VarType::Node) if env.get(&r.name).is_none() => {
            Ok(Value::NodeRef(r.name.clone()))
        }
        (VarValue::Ref(r), expected) => {
            let var = env.lookup(&r.name, r.span)?;
            if var.declared_type != expected {
                return Err(type_mismatch(&r.name, expected, var.value.kind(), r.span));
            }
            Ok(var.value.clone())
        }
        (VarValue::Nodes(ids), VarType::Node) => {
            let mut names = resolve_node_list(env, ids)?;
            if ids.len() == 1 && names.len() == 1 {
                Ok(Value::NodeRef(names.remove(0)))
            } else {
                Ok(Value::NodeList(names))
            }
        }
        (VarValue::Edges(decls), VarType::Edge) => decls
            .iter()
            .map(|e| resolve_edge(env, e))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::EdgeList),
        (VarValue::Attrs(list), VarType::Attributes) => attr_list_to_map(list).map(Value::AttrList),
        (other, expected) => Err(type_mismatch(
            &decl.name.name,
            expected,
            other.kind(),
            decl.span,
        )),
    }
}

fn type_mismatch(name: &str, expected: VarType, found: &str, span: Span) -> EvalError {
    EvalError::TypeMismatch {
        name: name.to_string(),
        expected: format!("a {expected} value"),
        found: found.to_string(),
        span,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Shared resolution
// ══════════════════════════════════════════════════════════════════════════════

/// Convert an inline attribute list, rejecting duplicate keys.
pub(crate) fn attr_list_to_map(list: &AttrList) -> EvalResult<AttrMap> {
    let mut map = AttrMap::with_capacity(list.attrs.len());
    for attr in &list.attrs {
        if map.contains_key(&attr.key.name) {
            return Err(EvalError::AttributeKeyConflict {
                key: attr.key.name.clone(),
                span: attr.key.span,
            });
        }
        map.insert(attr.key.name.clone(), attr.value.clone());
    }
    Ok(map)
}

/// Resolve `[..]` or `$name` to an attribute map.
pub(crate) fn resolve_attr_source(env: &Environment, source: &AttrSource) -> EvalResult<AttrMap> {
    match source {
        AttrSource::List(list) => attr_list_to_map(list),
        AttrSource::Ref(r) => match &env.lookup(&r.name, r.span)?.value {
            Value::AttrList(map) => Ok(map.clone()),
            other => Err(type_mismatch(
                &r.name,
                VarType::Attributes,
                other.kind(),
                r.span,
            )),
        },
    }
}

fn resolve_optional_attrs(env: &Environment, source: Option<&AttrSource>) -> EvalResult<AttrMap> {
    source.map_or_else(|| Ok(AttrMap::new()), |s| resolve_attr_source(env, s))
}

/// A single node identifier: a node variable holding one node denotes that
/// node, anything else is a literal node name.
pub(crate) fn resolve_node_name(env: &Environment, ident: &Ident) -> EvalResult<String> {
    match env.get(&ident.name).map(|v| &v.value) {
        Some(Value::NodeRef(name)) => Ok(name.clone()),
        Some(Value::NodeList(_)) => Err(EvalError::TypeMismatch {
            name: ident.name.clone(),
            expected: "a single node".to_string(),
            found: "node list".to_string(),
            span: ident.span,
        }),
        _ => Ok(ident.name.clone()),
    }
}

/// Node identifiers in a list; node-list variables expand in place.
pub(crate) fn resolve_node_list(env: &Environment, idents: &[Ident]) -> EvalResult<Vec<String>> {
    let mut names = Vec::with_capacity(idents.len());
    for ident in idents {
        match env.get(&ident.name).map(|v| &v.value) {
            Some(Value::NodeList(list)) => names.extend(list.iter().cloned()),
            _ => names.push(resolve_node_name(env, ident)?),
        }
    }
    Ok(names)
}

/// Resolve an edge declaration to a normalized [`EdgeSpec`].
pub(crate) fn resolve_edge(env: &Environment, decl: &EdgeDecl) -> EvalResult<EdgeSpec> {
    let from = resolve_node_name(env, &decl.from)?;
    let to = resolve_node_name(env, &decl.to)?;
    let attrs = resolve_optional_attrs(env, decl.attrs.as_ref())?;
    Ok(EdgeSpec::new(from, decl.op, to).with_attrs(attrs))
}

// ══════════════════════════════════════════════════════════════════════════════
// Graphs
// ══════════════════════════════════════════════════════════════════════════════

/// Accumulates finished graphs into a [`GraphModel`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: GraphModel,
    declared_at: IndexMap<String, Span>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one graph declaration. Graph-local variables live in a
    /// graph scope that is discarded on return, including on error.
    pub fn build(&mut self, env: &mut Environment, decl: &GraphDecl) -> EvalResult<()> {
        let id = &decl.name.name;
        if let Some(previous) = self.declared_at.get(id) {
            return Err(EvalError::DuplicateGraph {
                graph: id.clone(),
                span: decl.name.span,
                previous: *previous,
            });
        }
        self.declared_at.insert(id.clone(), decl.name.span);
        debug!(graph = %id, direction = %decl.direction, "build graph");

        let mut graph = Graph::new(id.clone(), decl.direction.is_directed());
        let mut scope = env.graph_scope(id);

        for global in &decl.globals {
            let attrs = resolve_attr_source(&scope, &global.source)?;
            let target = match global.target {
                GlobalTarget::Graph => &mut graph.global_attrs,
                GlobalTarget::Node => &mut graph.node_defaults,
                GlobalTarget::Edge => &mut graph.edge_defaults,
            };
            merge_attrs(target, &attrs);
        }

        for stmt in &decl.body {
            match stmt {
                Stmt::Var(var) => declare_var(&mut scope, var)?,
                Stmt::Node(node) => apply_node_stmt(&scope, &mut graph, decl.direction, node)?,
                Stmt::Edge(edge) => {
                    let resolved = resolve_edge(&scope, edge)?;
                    add_edge(&mut graph, decl.direction, resolved, edge.span)?;
                }
            }
        }
        drop(scope);

        info!(
            graph = %graph.id,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "graph finalized"
        );
        self.model.insert(graph);
        Ok(())
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn finish(self) -> GraphModel {
        self.model
    }
}

fn apply_node_stmt(
    env: &Environment,
    graph: &mut Graph,
    direction: Direction,
    stmt: &NodeStmt,
) -> EvalResult<()> {
    let attrs = resolve_optional_attrs(env, stmt.attrs.as_ref())?;
    let names = match &stmt.target {
        NodeTarget::List(idents) => resolve_node_list(env, idents)?,
        NodeTarget::Ref(r) => match &env.lookup(&r.name, r.span)?.value {
            Value::NodeRef(name) => vec![name.clone()],
            Value::NodeList(list) => list.clone(),
            Value::EdgeList(edges) => {
                debug!(var = %r.name, edges = edges.len(), "splice edge variable");
                for edge in edges {
                    let mut spliced = edge.clone();
                    merge_attrs(&mut spliced.attrs, &attrs);
                    add_edge(graph, direction, spliced, stmt.span)?;
                }
                return Ok(());
            }
            Value::AttrList(_) => {
                return Err(EvalError::TypeMismatch {
                    name: r.name.clone(),
                    expected: "a node or edge variable".to_string(),
                    found: "attribute list".to_string(),
                    span: r.span,
                })
            }
        },
    };

    debug!(nodes = ?names, attrs = attrs.len(), "node statement");
    for name in &names {
        merge_attrs(graph.node_entry(name), &attrs);
    }
    Ok(())
}

fn add_edge(graph: &mut Graph, direction: Direction, edge: EdgeSpec, span: Span) -> EvalResult<()> {
    if edge.op.is_directed() != direction.is_directed() {
        return Err(EvalError::DirectednessMismatch {
            graph: graph.id.clone(),
            direction,
            op: edge.op,
            span,
        });
    }
    debug!(source = %edge.source, target = %edge.target, op = %edge.op, "edge statement");
    // Endpoints appear in the order they were written, before normalisation.
    let (first, second) = match edge.op {
        EdgeOp::Backward => (&edge.target, &edge.source),
        _ => (&edge.source, &edge.target),
    };
    graph.node_entry(first);
    graph.node_entry(second);
    graph.edges.push(edge);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Ident {
        Ident::new(name, Span::default())
    }

    fn attr(key: &str, value: AttrValue) -> Attribute {
        Attribute {
            key: ident(key),
            op: AttrOp::Assign,
            value,
            span: Span::default(),
        }
    }

    fn list(attrs: Vec<Attribute>) -> AttrList {
        AttrList {
            attrs,
            span: Span::default(),
        }
    }

    #[test]
    fn duplicate_keys_conflict() {
        let l = list(vec![
            attr("color", AttrValue::Identifier("red".into())),
            attr("color", AttrValue::Identifier("blue".into())),
        ]);
        assert!(matches!(
            attr_list_to_map(&l),
            Err(EvalError::AttributeKeyConflict { key, .. }) if key == "color"
        ));
    }

    #[test]
    fn node_names_resolve_through_variables() {
        let mut env = Environment::new();
        env.declare("x", VarType::Node, Value::NodeRef("a".into()), Span::default())
            .unwrap();
        env.declare(
            "xs",
            VarType::Node,
            Value::NodeList(vec!["p".into(), "q".into()]),
            Span::default(),
        )
        .unwrap();

        assert_eq!(resolve_node_name(&env, &ident("x")).unwrap(), "a");
        assert_eq!(resolve_node_name(&env, &ident("free")).unwrap(), "free");
        assert!(matches!(
            resolve_node_name(&env, &ident("xs")),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert_eq!(
            resolve_node_list(&env, &[ident("x"), ident("xs"), ident("z")]).unwrap(),
            vec!["a", "p", "q", "z"]
        );
    }

    #[test]
    fn backward_edge_is_normalized_on_insert() {
        let env = Environment::new();
        let decl = EdgeDecl {
            from: ident("a"),
            op: EdgeOp::Backward,
            to: ident("b"),
            attrs: None,
            span: Span::default(),
        };
        let edge = resolve_edge(&env, &decl).unwrap();
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("b", "a"));
    }

    #[test]
    fn backward_edge_endpoints_keep_written_order() {
        let mut graph = Graph::new("g", true);
        let edge = EdgeSpec::new("c", EdgeOp::Backward, "d");
        add_edge(&mut graph, Direction::Directed, edge, Span::default()).unwrap();
        assert_eq!(graph.node_names().collect::<Vec<_>>(), vec!["c", "d"]);
        assert_eq!(graph.edges[0].source, "d");
    }

    #[test]
    fn duplicate_graph_is_rejected() {
        let mut env = Environment::new();
        let mut builder = ModelBuilder::new();
        let decl = GraphDecl {
            direction: Direction::Directed,
            name: Ident::new("g", Span::point(1, 16)),
            globals: vec![],
            body: vec![],
            span: Span::default(),
        };
        builder.build(&mut env, &decl).unwrap();
        let err = builder.build(&mut env, &decl).unwrap_err();
        assert!(matches!(
            err,
            EvalError::DuplicateGraph { graph, previous, .. }
                if graph == "g" && previous == Span::point(1, 16)
        ));
        assert_eq!(builder.finish().len(), 1);
    }
}
