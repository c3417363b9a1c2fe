//! Checkpoint record and metadata types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Identifies one logical conversation/run lineage
pub type ThreadId = String;

/// What caused a checkpoint to be written
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointSource {
    /// Written by the execution loop after a node completed
    Loop,
    /// Written by a manual state update outside of a run
    Update,
}

/// Metadata associated with a checkpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CheckpointMetadata {
    /// The source of the checkpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CheckpointSource>,

    /// Step number within the run that produced it (1-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,

    /// Node whose delta was merged last
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Additional custom metadata
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CheckpointMetadata {
    /// Create a new checkpoint metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source
    pub fn with_source(mut self, source: CheckpointSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the step number
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the node name
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Add custom metadata
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Latest persisted state of a thread
///
/// Stores keep one checkpoint per thread; every save replaces the previous
/// one and bumps `version`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    /// Owning thread
    pub thread_id: ThreadId,

    /// Store-assigned, strictly increasing per thread (first save is 1)
    pub version: u64,

    /// When the checkpoint was written
    pub ts: DateTime<Utc>,

    /// Full state snapshot (a JSON object)
    pub state: Value,

    /// Provenance of this checkpoint
    #[serde(default)]
    pub metadata: CheckpointMetadata,
}

impl Checkpoint {
    /// Create a checkpoint stamped with the current time
    pub fn new(
        thread_id: impl Into<ThreadId>,
        version: u64,
        state: Value,
        metadata: CheckpointMetadata,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            version,
            ts: Utc::now(),
            state,
            metadata,
        }
    }

    /// Version the next save of this thread must carry
    pub fn next_version(&self) -> u64 {
        self.version + 1
    }
}
