//! Run configuration and step snapshot types

use crate::error::Result;
use crate::graph::NodeId;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

/// Step bound used when neither the graph nor the run sets one
pub const DEFAULT_MAX_STEPS: usize = 25;

/// Per-run options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Thread to load from and checkpoint into; `None` runs statelessly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Overrides the graph's step bound for this run; zero counts as one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config for a run on `thread_id`
    pub fn thread(thread_id: impl Into<String>) -> Self {
        Self::new().with_thread_id(thread_id)
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// Full state after one completed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    /// 1-based step number within the run
    pub step: usize,
    /// Node that just ran
    pub node: NodeId,
    /// Node that runs next, `None` when the run has ended
    pub next: Option<NodeId>,
    /// Complete merged state (never a diff)
    pub state: Value,
}

impl StepSnapshot {
    /// Whether this is the last snapshot of the run
    pub fn is_final(&self) -> bool {
        self.next.is_none()
    }
}

/// Lazy, pull-driven sequence of step snapshots
///
/// Ends after the terminal step, or after yielding one `Err` for a fatal
/// error.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<StepSnapshot>> + Send>>;
