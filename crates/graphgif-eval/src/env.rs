//! Scoped variable environment.
//!
//! Two levels: the program scope, always present, and at most one graph
//! scope while a graph body is being evaluated. Graph scopes are entered
//! through [`Environment::graph_scope`], whose guard pops the scope on every
//! exit path.

use crate::error::{EvalError, EvalResult};
use crate::value::{Value, Variable};
use graphgif_types::ast::VarType;
use graphgif_types::Span;
use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Graph(String),
}

#[derive(Debug, Clone)]
struct Scope {
    kind: ScopeKind,
    bindings: IndexMap<String, Variable>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            bindings: IndexMap::new(),
        }
    }
}

/// Scoped variable environment.
///
/// Lookups search from the innermost scope outward. Declarations always go
/// into the innermost scope and are single-assignment there.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Program)],
        }
    }

    /// Bind `name` in the innermost scope.
    ///
    /// Fails if `name` is already bound in that same scope. Shadowing a
    /// name from an outer scope is allowed.
    pub fn declare(
        &mut self,
        name: &str,
        declared_type: VarType,
        value: Value,
        span: Span,
    ) -> EvalResult<()> {
        self.check_unbound_here(name, span)?;
        if value.var_type() != declared_type {
            return Err(EvalError::TypeMismatch {
                name: name.to_string(),
                expected: format!("a {declared_type} value"),
                found: value.kind().to_string(),
                span,
            });
        }
        let scope = self.innermost_mut();
        debug!(var = name, %declared_type, kind = value.kind(), scope = ?scope.kind, "declare variable");
        scope.bindings.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                declared_type,
                value,
                span,
            },
        );
        Ok(())
    }

    /// Fail with `Redeclaration` if `name` is bound in the innermost scope.
    pub fn check_unbound_here(&self, name: &str, span: Span) -> EvalResult<()> {
        match self.innermost().bindings.get(name) {
            Some(existing) => Err(EvalError::Redeclaration {
                name: name.to_string(),
                span,
                previous: existing.span,
            }),
            None => Ok(()),
        }
    }

    /// Look up a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    /// Like [`get`](Self::get) but fails with `UnboundName`.
    pub fn lookup(&self, name: &str, span: Span) -> EvalResult<&Variable> {
        self.get(name).ok_or_else(|| EvalError::UnboundName {
            name: name.to_string(),
            span,
        })
    }

    /// Enter a graph scope. The scope is discarded when the guard drops.
    pub fn graph_scope(&mut self, graph: &str) -> GraphScope<'_> {
        self.scopes.push(Scope::new(ScopeKind::Graph(graph.to_string())));
        GraphScope { env: self }
    }

    /// The kind of the innermost scope.
    pub fn current_scope(&self) -> &ScopeKind {
        &self.innermost().kind
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Variables of the program scope, in declaration order.
    pub fn program_bindings(&self) -> &IndexMap<String, Variable> {
        &self.scopes[0].bindings
    }

    /// Consume the environment, keeping only the program scope.
    pub fn into_program_bindings(mut self) -> IndexMap<String, Variable> {
        self.scopes.truncate(1);
        self.scopes
            .pop()
            .map(|scope| scope.bindings)
            .unwrap_or_default()
    }

    fn innermost(&self) -> &Scope {
        let last = self.scopes.len() - 1;
        &self.scopes[last]
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                debug!(scope = ?scope.kind, bindings = scope.bindings.len(), "leave scope");
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for an active graph scope. Derefs to the [`Environment`].
pub struct GraphScope<'env> {
    env: &'env mut Environment,
}

impl Deref for GraphScope<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        self.env
    }
}

impl DerefMut for GraphScope<'_> {
    fn deref_mut(&mut self) -> &mut Environment {
        self.env
    }
}

impl Drop for GraphScope<'_> {
    fn drop(&mut self) {
        self.env.pop_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> Value {
        Value::NodeRef(name.to_string())
    }

    #[test]
    fn declare_and_lookup() {
        let mut env = Environment::new();
        env.declare("x", VarType::Node, node("a"), Span::default()).unwrap();
        assert_eq!(env.get("x").map(|v| &v.value), Some(&node("a")));
        assert!(env.get("y").is_none());
        assert!(matches!(
            env.lookup("y", Span::default()),
            Err(EvalError::UnboundName { name, .. }) if name == "y"
        ));
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut env = Environment::new();
        env.declare("x", VarType::Node, node("a"), Span::point(1, 1)).unwrap();
        let err = env
            .declare("x", VarType::Node, node("b"), Span::point(2, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::Redeclaration { previous, .. } if previous == Span::point(1, 1)
        ));
    }

    #[test]
    fn graph_scope_shadows_and_is_discarded() {
        let mut env = Environment::new();
        env.declare("x", VarType::Node, node("a"), Span::default()).unwrap();
        {
            let mut scope = env.graph_scope("g");
            assert_eq!(scope.current_scope(), &ScopeKind::Graph("g".into()));
            scope.declare("x", VarType::Node, node("b"), Span::default()).unwrap();
            scope.declare("y", VarType::Node, node("c"), Span::default()).unwrap();
            assert_eq!(scope.get("x").map(|v| &v.value), Some(&node("b")));
        }
        assert_eq!(env.depth(), 1);
        assert_eq!(env.get("x").map(|v| &v.value), Some(&node("a")));
        assert!(env.get("y").is_none());
    }

    #[test]
    fn graph_scope_is_discarded_on_error_exit() {
        fn failing(env: &mut Environment) -> EvalResult<()> {
            let mut scope = env.graph_scope("g");
            scope.declare("tmp", VarType::Node, node("a"), Span::default())?;
            scope.declare("tmp", VarType::Node, node("b"), Span::default())?;
            Ok(())
        }

        let mut env = Environment::new();
        assert!(failing(&mut env).is_err());
        assert_eq!(env.depth(), 1);
        assert!(env.get("tmp").is_none());
    }

    #[test]
    fn declared_type_must_match_value() {
        let mut env = Environment::new();
        let err = env
            .declare("e", VarType::Edge, node("a"), Span::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
    }

    #[test]
    fn program_scope_cannot_be_popped() {
        let mut env = Environment::new();
        env.pop_scope();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.current_scope(), &ScopeKind::Program);
    }
}
