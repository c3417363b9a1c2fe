//! In-memory checkpoint storage for development and testing
//!
//! [`InMemoryCheckpointSaver`] keeps the latest checkpoint of every thread in
//! an `Arc<RwLock<HashMap>>`. Clones share the same storage, so a single
//! instance can back several compiled graphs. Data is lost when the process
//! exits; use [`FileCheckpointSaver`](crate::FileCheckpointSaver) when runs
//! must survive a restart.
//!
//! ```rust,ignore
//! use stepflow_checkpoint::InMemoryCheckpointSaver;
//!
//! let saver = Arc::new(InMemoryCheckpointSaver::new());
//! let graph = builder.compile()?.with_checkpointer(saver.clone());
//!
//! graph.invoke(json!({"video_url": url}), RunConfig::thread("run-1")).await?;
//! assert_eq!(saver.thread_count().await, 1);
//! ```

use crate::{
    checkpoint::{Checkpoint, CheckpointMetadata},
    error::{CheckpointError, Result},
    traits::CheckpointSaver,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory checkpoint storage
type CheckpointStorage = Arc<RwLock<HashMap<String, Checkpoint>>>;

/// In-memory checkpoint saver implementation
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointSaver {
    storage: CheckpointStorage,
}

impl InMemoryCheckpointSaver {
    /// Create a new in-memory checkpoint saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of threads being tracked
    pub async fn thread_count(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Clear all checkpoints (useful for testing)
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl CheckpointSaver for InMemoryCheckpointSaver {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.storage.read().await.get(thread_id).cloned())
    }

    async fn save(
        &self,
        thread_id: &str,
        state: Value,
        metadata: CheckpointMetadata,
    ) -> Result<Checkpoint> {
        if thread_id.is_empty() {
            return Err(CheckpointError::Invalid(
                "thread_id must not be empty".to_string(),
            ));
        }

        let mut storage = self.storage.write().await;
        let version = storage
            .get(thread_id)
            .map(Checkpoint::next_version)
            .unwrap_or(1);

        let checkpoint = Checkpoint::new(thread_id, version, state, metadata);
        storage.insert(thread_id.to_string(), checkpoint.clone());
        Ok(checkpoint)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.storage.write().await.remove(thread_id);
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        let mut threads: Vec<String> = self.storage.read().await.keys().cloned().collect();
        threads.sort();
        Ok(threads)
    }
}
