//! AST node types for GraphGif programs.
//!
//! Every node carries a [`Span`] for error reporting. Sequences keep source
//! order; duplicate attribute keys are preserved here and rejected later by
//! the engine.

use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: variables, then graphs, then commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub vars: Vec<VarDecl>,
    pub graphs: Vec<GraphDecl>,
    pub commands: Vec<Command>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Variables
// ══════════════════════════════════════════════════════════════════════════════

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Node,
    Edge,
    Attributes,
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VarType::Node => "node",
            VarType::Edge => "edge",
            VarType::Attributes => "attributes",
        })
    }
}

/// `var <type> name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub var_type: VarType,
    pub name: Ident,
    pub value: VarValue,
    pub span: Span,
}

/// Right-hand side of a variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// `$name`
    Ref(Ident),
    /// `a, b, c`
    Nodes(Vec<Ident>),
    /// `a -> b [..], b -> c`
    Edges(Vec<EdgeDecl>),
    /// `[k = v, ...]`
    Attrs(AttrList),
}

impl VarValue {
    /// Short name of the value form, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            VarValue::Ref(_) => "reference",
            VarValue::Nodes(_) => "node list",
            VarValue::Edges(_) => "edge list",
            VarValue::Attrs(_) => "attribute list",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Graphs
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Directed,
    Undirected,
}

impl Direction {
    pub fn is_directed(self) -> bool {
        matches!(self, Direction::Directed)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Directed => "directed",
            Direction::Undirected => "undirected",
        })
    }
}

/// `directed graph g { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDecl {
    pub direction: Direction,
    pub name: Ident,
    pub globals: Vec<GlobalAttrDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Which defaults a global attribute declaration feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalTarget {
    /// `graph [..]` or `attributes [..]`
    Graph,
    /// `node [..]`
    Node,
    /// `edge [..]`
    Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalAttrDecl {
    pub target: GlobalTarget,
    pub source: AttrSource,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var(VarDecl),
    Node(NodeStmt),
    Edge(EdgeDecl),
}

/// Target of a node statement.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTarget {
    /// `a, b, c`
    List(Vec<Ident>),
    /// `$name`, a node or edge variable.
    Ref(Ident),
}

/// `a, b [color = red]` or `$x [..]`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStmt {
    pub target: NodeTarget,
    pub attrs: Option<AttrSource>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeOp {
    /// `--`
    Undirected,
    /// `->`
    Forward,
    /// `<-`
    Backward,
}

impl EdgeOp {
    pub fn is_directed(self) -> bool {
        !matches!(self, EdgeOp::Undirected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeOp::Undirected => "--",
            EdgeOp::Forward => "->",
            EdgeOp::Backward => "<-",
        }
    }
}

impl fmt::Display for EdgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `from op to [attrs]?`, as written in source (not yet normalized).
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDecl {
    pub from: Ident,
    pub op: EdgeOp,
    pub to: Ident,
    pub attrs: Option<AttrSource>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Attributes
// ══════════════════════════════════════════════════════════════════════════════

/// An attribute list written inline or a reference to an attributes variable.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrSource {
    List(AttrList),
    Ref(Ident),
}

impl AttrSource {
    pub fn span(&self) -> Span {
        match self {
            AttrSource::List(list) => list.span,
            AttrSource::Ref(id) => id.span,
        }
    }
}

/// `[k = v, k2: v2]`
#[derive(Debug, Clone, PartialEq)]
pub struct AttrList {
    pub attrs: Vec<Attribute>,
    pub span: Span,
}

/// Separator between a key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrOp {
    /// `=`
    Assign,
    /// `:`
    Typed,
}

impl fmt::Display for AttrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttrOp::Assign => "=",
            AttrOp::Typed => ":",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: Ident,
    pub op: AttrOp,
    pub value: AttrValue,
    pub span: Span,
}

/// A scalar attribute or argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrValue {
    Identifier(String),
    Number(f64),
    String(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text of an identifier or string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Identifier(s) | AttrValue::String(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Identifier(s) => f.write_str(s),
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════════════════════

/// `run name with (args)`
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: Ident,
    pub args: Vec<Argument>,
    pub span: Span,
}

/// `key = path`, `key: path` or `key = literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub key: Ident,
    pub op: AttrOp,
    pub value: ArgValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Path(Path),
    Literal(AttrValue),
}

/// `a.b.c`, at least one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl Path {
    pub fn names(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.name.clone()).collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&seg.name)?;
        }
        Ok(())
    }
}
