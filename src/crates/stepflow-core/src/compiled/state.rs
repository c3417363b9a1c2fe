//! Thread state inspection and manual updates

use super::CompiledGraph;
use crate::error::{GraphError, Result};
use serde_json::Value;
use std::sync::Arc;
use stepflow_checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSaver, CheckpointSource};

impl CompiledGraph {
    fn require_checkpointer(&self) -> Result<&Arc<dyn CheckpointSaver>> {
        self.checkpoint_saver.as_ref().ok_or_else(|| {
            GraphError::Configuration("No checkpointer configured for this graph".to_string())
        })
    }

    /// Latest checkpoint of a thread
    pub async fn get_state(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.require_checkpointer()?.load(thread_id).await?)
    }

    /// Merge `delta` into a thread's state outside of a run
    ///
    /// Uses the same merge policy as node deltas. A thread with no
    /// checkpoint starts from the schema defaults. Waits for any run on the
    /// thread to finish first.
    pub async fn update_state(&self, thread_id: &str, delta: Value) -> Result<Checkpoint> {
        let saver = self.require_checkpointer()?;
        let _guard = self.thread_locks.acquire(thread_id).await;

        let base = match saver.load(thread_id).await? {
            Some(checkpoint) => checkpoint.state,
            None => self.schema.defaults(),
        };
        let state = self.schema.merge(&base, &delta)?;

        let metadata = CheckpointMetadata::new().with_source(CheckpointSource::Update);
        let checkpoint = saver.save(thread_id, state, metadata).await?;
        tracing::info!(thread_id, version = checkpoint.version, "Thread state updated");
        Ok(checkpoint)
    }

    /// Evict a thread's checkpoint once no run holds it
    pub async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let saver = self.require_checkpointer()?;
        let _guard = self.thread_locks.acquire(thread_id).await;
        saver.delete_thread(thread_id).await?;
        tracing::info!(thread_id, "Thread deleted");
        Ok(())
    }
}
