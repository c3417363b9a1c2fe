//! StateGraph builder API for constructing workflows
//!
//! [`StateGraph`] collects nodes, edges and the state schema, then
//! [`compile`](StateGraph::compile)s them into an executable
//! [`CompiledGraph`]. All structural checks run at compile time; a graph that
//! compiles never raises a configuration error during a run.
//!
//! ```rust,no_run
//! use stepflow_core::{MergeClass, RunConfig, StateGraph, StateSchema, END, START};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut schema = StateSchema::new();
//! schema.add_field("log", MergeClass::Append);
//!
//! let mut graph = StateGraph::new(schema);
//! graph.add_node("a", |_state| async { Ok(json!({"log": ["a"]})) });
//! graph.add_node("b", |_state| async { Ok(json!({"log": ["b"]})) });
//! graph.add_edge(START, "a");
//! graph.add_edge("a", "b");
//! graph.add_edge("b", END);
//!
//! let compiled = graph.compile()?;
//! let state = compiled.invoke(json!({}), RunConfig::default()).await?;
//! assert_eq!(state["log"], json!(["a", "b"]));
//! # Ok(())
//! # }
//! ```
//!
//! # Conditional routing
//!
//! A router inspects the state after the source node's delta is merged and
//! returns a route key; the key is looked up in the target map. Keys missing
//! from the map fail the run with a routing error.
//!
//! ```rust,ignore
//! graph.add_conditional_edges(
//!     "confirm_mail",
//!     |state| state["confirmation"].as_str().unwrap_or("no").to_string(),
//!     [("yes", "send_mail"), ("no", "draft_mail")],
//! );
//! ```

use crate::compiled::{CompiledGraph, DEFAULT_MAX_STEPS};
use crate::error::{GraphError, NodeError, Result};
use crate::graph::{Graph, NodeExecutor, NodeId, NodeSpec, END, START};
use crate::state::StateSchema;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Builder for a stateful workflow graph
pub struct StateGraph {
    graph: Graph,
    schema: StateSchema,
    max_steps: usize,
    conflicts: Vec<String>,
}

impl StateGraph {
    /// Start a graph over the given state schema
    pub fn new(schema: StateSchema) -> Self {
        Self {
            graph: Graph::new(),
            schema,
            max_steps: DEFAULT_MAX_STEPS,
            conflicts: Vec::new(),
        }
    }

    /// Add a node whose body is an async closure
    ///
    /// The body receives a snapshot of the current state and returns the
    /// delta to merge. Returning `Err(NodeError)` records the message in the
    /// error field; the run continues.
    pub fn add_node<F, Fut>(&mut self, id: impl Into<NodeId>, body: F) -> &mut Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, NodeError>> + Send + 'static,
    {
        let executor: NodeExecutor = Arc::new(move |state| Box::pin(body(state)));
        self.add_node_with_executor(id, executor)
    }

    /// Add a node with a pre-built executor
    pub fn add_node_with_executor(
        &mut self,
        id: impl Into<NodeId>,
        executor: NodeExecutor,
    ) -> &mut Self {
        let id = id.into();
        self.graph.add_node(
            id.clone(),
            NodeSpec {
                name: id,
                executor,
            },
        );
        self
    }

    /// Add an unconditional edge
    ///
    /// An edge from [`START`] sets the entry point.
    pub fn add_edge(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> &mut Self {
        let from = from.into();
        let to = to.into();
        if from == START {
            return self.set_entry(to);
        }
        self.graph.add_edge(from, to);
        self
    }

    /// Add a conditional edge routing on the merged state
    ///
    /// `targets` maps each route key to a node name or [`END`].
    pub fn add_conditional_edges<F, I, K, T>(
        &mut self,
        from: impl Into<NodeId>,
        router: F,
        targets: I,
    ) -> &mut Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<NodeId>,
    {
        let from = from.into();
        if from == START {
            self.conflicts
                .push("Conditional entry edges are not supported".to_string());
            return self;
        }

        let branches: HashMap<String, NodeId> = targets
            .into_iter()
            .map(|(key, target)| (key.into(), target.into()))
            .collect();
        self.graph
            .add_conditional_edge(from, Arc::new(router), branches);
        self
    }

    /// Conditional edge whose route keys are the target names themselves
    pub fn add_conditional_edges_to<F, I, T>(
        &mut self,
        from: impl Into<NodeId>,
        router: F,
        targets: I,
    ) -> &mut Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let targets: Vec<(String, NodeId)> = targets
            .into_iter()
            .map(|t| {
                let t = t.into();
                (t.clone(), t)
            })
            .collect();
        self.add_conditional_edges(from, router, targets)
    }

    /// Set the entry point of the graph
    pub fn set_entry(&mut self, node: impl Into<NodeId>) -> &mut Self {
        let node = node.into();
        match &self.graph.entry {
            Some(existing) if *existing != node => self.conflicts.push(format!(
                "Entry point set more than once ('{existing}' and '{node}')"
            )),
            _ => self.graph.set_entry(node),
        }
        self
    }

    /// Add a finish point (edge to END)
    pub fn add_finish(&mut self, node: impl Into<NodeId>) -> &mut Self {
        self.graph.add_edge(node.into(), END.to_string());
        self
    }

    /// Default step bound for runs of the compiled graph
    pub fn with_max_steps(&mut self, max_steps: usize) -> &mut Self {
        self.max_steps = max_steps;
        self
    }

    /// Get a reference to the underlying graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Get the state schema
    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    /// Validate and compile the graph
    ///
    /// # Errors
    ///
    /// [`GraphError::Configuration`] if the schema or the graph structure is
    /// invalid, or the step bound is zero.
    pub fn compile(self) -> Result<CompiledGraph> {
        if let Some(conflict) = self.conflicts.into_iter().next() {
            return Err(GraphError::Configuration(conflict));
        }
        if self.max_steps == 0 {
            return Err(GraphError::Configuration(
                "max_steps must be at least 1".to_string(),
            ));
        }

        self.schema.check().map_err(GraphError::Configuration)?;
        self.graph.validate().map_err(GraphError::Configuration)?;

        tracing::debug!(
            nodes = self.graph.nodes.len(),
            entry = ?self.graph.entry,
            max_steps = self.max_steps,
            "Graph compiled"
        );
        Ok(CompiledGraph::new(self.graph, self.schema, self.max_steps))
    }
}
