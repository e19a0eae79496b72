//! Evaluation engine: runs a parsed program in three phases.
//!
//! 1. program-scope `var` declarations, in order
//! 2. graph declarations, each finalized before the next starts
//! 3. commands, in order, against the finished model
//!
//! The first error aborts evaluation; nothing partial is returned.

use crate::builder::{declare_var, ModelBuilder};
use crate::dispatch::{Dispatcher, HandlerRegistry, Invocation};
use crate::env::Environment;
use crate::error::EvalResult;
use crate::model::{GraphModel, GraphStats};
use crate::value::Variable;
use graphgif_types::ast::Program;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

/// Final state of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub model: GraphModel,
    /// Program-scope variables in declaration order.
    pub variables: IndexMap<String, Variable>,
    /// Executed commands in source order.
    pub invocations: Vec<Invocation>,
}

impl Evaluation {
    pub fn summary(&self) -> Summary {
        let per_graph: Vec<GraphStats> = self.model.graphs().map(|g| g.stats()).collect();
        Summary {
            graphs: per_graph.len(),
            variables: self.variables.len(),
            commands: self.invocations.len(),
            nodes: per_graph.iter().map(|g| g.nodes).sum(),
            edges: per_graph.iter().map(|g| g.edges).sum(),
            per_graph,
        }
    }
}

/// Program-wide counts. `variables` counts program-scope bindings only;
/// graph-local variables do not outlive their graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub graphs: usize,
    pub variables: usize,
    pub commands: usize,
    pub nodes: usize,
    pub edges: usize,
    pub per_graph: Vec<GraphStats>,
}

/// Evaluates programs against a fixed set of command handlers.
///
/// Every call to [`evaluate`](Self::evaluate) starts from a fresh
/// environment and model, so one engine can evaluate any number of
/// independent programs.
#[derive(Debug, Default)]
pub struct Engine {
    registry: HandlerRegistry,
}

impl Engine {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(
            vars = program.vars.len(),
            graphs = program.graphs.len(),
            commands = program.commands.len()
        )
    )]
    pub fn evaluate(&self, program: &Program) -> EvalResult<Evaluation> {
        let mut env = Environment::new();
        for var in &program.vars {
            declare_var(&mut env, var)?;
        }
        debug!(bindings = env.program_bindings().len(), "program scope ready");

        let mut builder = ModelBuilder::new();
        for graph in &program.graphs {
            builder.build(&mut env, graph)?;
        }
        let model = builder.finish();

        let dispatcher = Dispatcher::new(&self.registry, &env, &model);
        let invocations = program
            .commands
            .iter()
            .map(|command| dispatcher.dispatch(command))
            .collect::<EvalResult<Vec<_>>>()?;

        let evaluation = Evaluation {
            model,
            variables: env.into_program_bindings(),
            invocations,
        };
        let summary = evaluation.summary();
        info!(
            graphs = summary.graphs,
            nodes = summary.nodes,
            edges = summary.edges,
            commands = summary.commands,
            "evaluation complete"
        );
        Ok(evaluation)
    }
}
