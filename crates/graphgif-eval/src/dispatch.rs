//! Command dispatch.
//!
//! Handlers are registered by name in a [`HandlerRegistry`] supplied by the
//! host. Each command resolves its arguments, then its handler runs to
//! completion against the finished, read-only [`GraphModel`] before the next
//! command starts.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult, HandlerError};
use crate::model::GraphModel;
use crate::resolver::{PathResolver, ResolvedArg};
use graphgif_types::ast::Command;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// A named command implementation.
///
/// Functions and closures with the matching signature implement this trait
/// and can be passed to [`HandlerRegistry::register`] directly.
pub trait CommandHandler: Send + Sync {
    fn invoke(
        &self,
        model: &GraphModel,
        args: &[ResolvedArg],
    ) -> Result<serde_json::Value, HandlerError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&GraphModel, &[ResolvedArg]) -> Result<serde_json::Value, HandlerError> + Send + Sync,
{
    fn invoke(
        &self,
        model: &GraphModel,
        args: &[ResolvedArg],
    ) -> Result<serde_json::Value, HandlerError> {
        self(model, args)
    }
}

/// Command name → handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: IndexMap<String, Box<dyn CommandHandler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the traversal and shortest-path handlers installed.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::algorithms::register_builtins(&mut registry);
        registry
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: CommandHandler + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One executed command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<ResolvedArg>,
    /// Whatever the handler returned.
    pub output: serde_json::Value,
}

pub struct Dispatcher<'a> {
    registry: &'a HandlerRegistry,
    resolver: PathResolver<'a>,
    model: &'a GraphModel,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a HandlerRegistry, env: &'a Environment, model: &'a GraphModel) -> Self {
        Self {
            registry,
            resolver: PathResolver::new(env, model),
            model,
        }
    }

    /// Resolve arguments, look up the handler, invoke it.
    pub fn dispatch(&self, command: &Command) -> EvalResult<Invocation> {
        let args = command
            .args
            .iter()
            .map(|arg| self.resolver.resolve_arg(arg))
            .collect::<EvalResult<Vec<_>>>()?;

        let name = &command.name.name;
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| EvalError::UnknownCommand {
                command: name.clone(),
                span: command.name.span,
            })?;

        info!(command = %name, args = args.len(), "dispatch command");
        let output = handler
            .invoke(self.model, &args)
            .map_err(|source| EvalError::Handler {
                command: name.clone(),
                span: command.span,
                source,
            })?;

        Ok(Invocation {
            command: name.clone(),
            args,
            output,
        })
    }
}
