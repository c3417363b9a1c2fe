//! CompiledGraph struct and builder methods

use super::locks::ThreadLocks;
use crate::graph::Graph;
use crate::state::StateSchema;
use stepflow_checkpoint::CheckpointSaver;
use std::sync::Arc;

/// Compiled graph ready for execution
///
/// Clones share the graph, schema, checkpointer and lock registry.
#[derive(Clone)]
pub struct CompiledGraph {
    pub(crate) graph: Arc<Graph>,
    pub(crate) schema: Arc<StateSchema>,
    pub(crate) checkpoint_saver: Option<Arc<dyn CheckpointSaver>>,
    pub(crate) thread_locks: ThreadLocks,
    pub(crate) max_steps: usize,
}

impl CompiledGraph {
    pub(crate) fn new(graph: Graph, schema: StateSchema, max_steps: usize) -> Self {
        Self {
            graph: Arc::new(graph),
            schema: Arc::new(schema),
            checkpoint_saver: None,
            thread_locks: ThreadLocks::new(),
            max_steps,
        }
    }

    /// Set the checkpoint saver
    ///
    /// Without one, every run is stateless regardless of its thread id.
    pub fn with_checkpointer(mut self, saver: Arc<dyn CheckpointSaver>) -> Self {
        self.checkpoint_saver = Some(saver);
        self
    }

    /// Share a lock registry with other graphs using the same checkpointer
    pub fn with_thread_locks(mut self, locks: ThreadLocks) -> Self {
        self.thread_locks = locks;
        self
    }

    /// Override the default step bound
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
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

    /// Get the checkpoint saver
    pub fn checkpointer(&self) -> Option<&Arc<dyn CheckpointSaver>> {
        self.checkpoint_saver.as_ref()
    }

    /// Default step bound for runs
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Lock registry used for per-thread exclusion
    pub fn thread_locks(&self) -> &ThreadLocks {
        &self.thread_locks
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("nodes", &self.graph.node_names())
            .field("entry", &self.graph.entry)
            .field("checkpointer", &self.checkpoint_saver.is_some())
            .field("max_steps", &self.max_steps)
            .finish()
    }
}
