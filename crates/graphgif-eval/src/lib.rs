//! GraphGif evaluation engine.
//!
//! Consumes a parsed [`Program`](graphgif_types::ast::Program) and produces a
//! validated [`GraphModel`] plus the ordered record of command invocations.
//! Commands are executed by handlers registered in a [`HandlerRegistry`];
//! [`HandlerRegistry::with_builtins`] installs BFS, DFS and Dijkstra.
//!
//! ```ignore
//! let program = Parser::new(tokens, &source).parse().ok()?;
//! let evaluation = Engine::new(HandlerRegistry::with_builtins()).evaluate(&program)?;
//! ```

pub mod algorithms;
pub mod builder;
pub mod dispatch;
pub mod engine;
pub mod env;
pub mod error;
pub mod model;
pub mod resolver;
pub mod value;

pub use dispatch::{CommandHandler, Dispatcher, HandlerRegistry, Invocation};
pub use engine::{Engine, Evaluation, Summary};
pub use env::{Environment, GraphScope, ScopeKind};
pub use error::{EvalError, EvalResult, HandlerError};
pub use model::{Graph, GraphModel, GraphStats};
pub use resolver::{PathResolver, Resolved, ResolvedArg};
pub use value::{merge_attrs, AttrMap, EdgeSpec, Value, Variable};
