//! Step loop shared by invoke and stream, plus the blocking entry point

use super::locks::ThreadGuard;
use super::types::{RunConfig, StepSnapshot};
use super::CompiledGraph;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, NodeId, END};
use crate::state::StateSchema;
use serde_json::Value;
use std::sync::Arc;
use stepflow_checkpoint::{CheckpointMetadata, CheckpointSaver, CheckpointSource};
use tracing::{debug, error, warn};

struct Persistence {
    saver: Arc<dyn CheckpointSaver>,
    thread_id: String,
    _guard: ThreadGuard,
}

/// In-flight state of one run
///
/// Owns the run's state exclusively; nothing else can observe it until a
/// snapshot is handed out.
pub(crate) struct Execution {
    graph: Arc<Graph>,
    schema: Arc<StateSchema>,
    persistence: Option<Persistence>,
    state: Value,
    current: Option<NodeId>,
    step: usize,
    max_steps: usize,
}

impl Execution {
    /// Load the thread (under its lock), merge the caller's input and point
    /// at the entry node
    pub(crate) async fn start(
        compiled: &CompiledGraph,
        input: Value,
        config: &RunConfig,
    ) -> Result<Self> {
        let entry = compiled
            .graph
            .entry
            .clone()
            .ok_or_else(|| GraphError::Configuration("No entry point set".to_string()))?;

        let persistence = match (&compiled.checkpoint_saver, &config.thread_id) {
            (Some(saver), Some(thread_id)) => Some(Persistence {
                saver: saver.clone(),
                thread_id: thread_id.clone(),
                _guard: compiled.thread_locks.acquire(thread_id).await,
            }),
            (None, Some(thread_id)) => {
                debug!(thread_id = %thread_id, "No checkpointer configured; running statelessly");
                None
            }
            _ => None,
        };

        let base = match &persistence {
            Some(p) => match p.saver.load(&p.thread_id).await? {
                Some(checkpoint) => {
                    debug!(
                        thread_id = %p.thread_id,
                        version = checkpoint.version,
                        "Resuming from checkpoint"
                    );
                    checkpoint.state
                }
                None => compiled.schema.defaults(),
            },
            None => compiled.schema.defaults(),
        };

        let state = compiled.schema.merge(&base, &input)?;

        Ok(Self {
            graph: compiled.graph.clone(),
            schema: compiled.schema.clone(),
            persistence,
            state,
            current: Some(entry),
            step: 0,
            max_steps: config.max_steps.unwrap_or(compiled.max_steps).max(1),
        })
    }

    /// Run the next node; `None` once the run has reached the terminal marker
    pub(crate) async fn step(&mut self) -> Result<Option<StepSnapshot>> {
        let Some(node) = self.current.take() else {
            return Ok(None);
        };

        if self.step >= self.max_steps {
            error!(limit = self.max_steps, node = %node, "Step limit exceeded");
            return Err(GraphError::StepLimitExceeded {
                limit: self.max_steps,
            });
        }
        self.step += 1;

        let spec = self.graph.nodes.get(&node).ok_or_else(|| {
            GraphError::Configuration(format!("Node '{node}' does not exist"))
        })?;

        debug!(step = self.step, node = %node, "Executing node");
        let delta = match (spec.executor)(self.state.clone()).await {
            Ok(delta) => delta,
            Err(err) => {
                warn!(node = %node, error = %err, "Node failed; recording error in state");
                self.schema.error_delta(err.message())
            }
        };

        self.state = self
            .schema
            .merge(&self.state, &delta)
            .map_err(|e| GraphError::node_state(&node, e))?;

        if let Some(p) = &self.persistence {
            let metadata = CheckpointMetadata::new()
                .with_source(CheckpointSource::Loop)
                .with_step(self.step)
                .with_node(node.as_str());
            p.saver
                .save(&p.thread_id, self.state.clone(), metadata)
                .await?;
        }

        let next = self.resolve_next(&node)?;
        self.current = next.clone();

        Ok(Some(StepSnapshot {
            step: self.step,
            node,
            next,
            state: self.state.clone(),
        }))
    }

    fn resolve_next(&self, node: &str) -> Result<Option<NodeId>> {
        let edge = self.graph.edge_from(node).ok_or_else(|| {
            GraphError::Configuration(format!("Node '{node}' has no outgoing edge"))
        })?;

        let target = match edge {
            Edge::Direct(to) => to.clone(),
            Edge::Conditional { router, branches } => {
                let key = router(&self.state);
                match branches.get(&key) {
                    Some(to) => to.clone(),
                    None => {
                        error!(node, key = %key, "Router returned an unmapped key");
                        return Err(GraphError::routing(node, key));
                    }
                }
            }
        };

        Ok((target != END).then_some(target))
    }

    pub(crate) fn into_state(self) -> Value {
        self.state
    }
}

impl CompiledGraph {
    /// Run the graph to completion and return the final state
    ///
    /// Node failures do not fail the call; they show up in the error field
    /// of the returned state. Configuration, routing, step-limit, checkpoint
    /// and malformed-state errors do.
    ///
    /// ```rust,ignore
    /// let checkpointer = Arc::new(InMemoryCheckpointSaver::new());
    /// let compiled = graph.compile()?.with_checkpointer(checkpointer);
    ///
    /// // Turn 1
    /// compiled.invoke(json!({"messages": ["Hello"]}), RunConfig::thread("chat-1")).await?;
    /// // Turn 2 resumes from turn 1's checkpoint
    /// let state = compiled.invoke(json!({"messages": ["More"]}), RunConfig::thread("chat-1")).await?;
    /// ```
    #[tracing::instrument(
        skip(self, input, config),
        fields(thread_id = ?config.thread_id, node_count = self.graph.nodes.len())
    )]
    pub async fn invoke(&self, input: Value, config: RunConfig) -> Result<Value> {
        debug!("Starting graph execution");
        let mut execution = Execution::start(self, input, &config).await?;

        while let Some(snapshot) = execution.step().await? {
            if snapshot.is_final() {
                debug!(steps = snapshot.step, "Graph execution completed");
            }
        }

        Ok(execution.into_state())
    }
}
