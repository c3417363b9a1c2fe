//! Storage trait for checkpoint backends
//!
//! The engine talks to persistence only through [`CheckpointSaver`]. A
//! backend keeps the latest [`Checkpoint`] of each thread and assigns
//! versions; the engine guarantees that at most one run writes a given
//! thread at a time, so backends only need to be safe for concurrent access
//! across *different* threads.
//!
//! # Implementing a backend
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use stepflow_checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSaver, Result};
//!
//! struct RedisSaver { /* connection */ }
//!
//! #[async_trait]
//! impl CheckpointSaver for RedisSaver {
//!     async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
//!         // GET thread key, deserialize
//!         todo!()
//!     }
//!
//!     async fn save(
//!         &self,
//!         thread_id: &str,
//!         state: serde_json::Value,
//!         metadata: CheckpointMetadata,
//!     ) -> Result<Checkpoint> {
//!         // INCR version, SET thread key
//!         todo!()
//!     }
//!
//!     async fn delete_thread(&self, thread_id: &str) -> Result<()> { todo!() }
//!     async fn list_threads(&self) -> Result<Vec<String>> { todo!() }
//! }
//! ```

use crate::checkpoint::{Checkpoint, CheckpointMetadata};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Persistence backend for thread checkpoints
#[async_trait]
pub trait CheckpointSaver: Send + Sync {
    /// Latest checkpoint of a thread, `None` if the thread was never saved
    /// (or was deleted).
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    /// Persist `state` as the thread's latest checkpoint.
    ///
    /// The returned checkpoint carries the version the store assigned, which
    /// is strictly greater than any version previously returned for the
    /// thread.
    async fn save(
        &self,
        thread_id: &str,
        state: Value,
        metadata: CheckpointMetadata,
    ) -> Result<Checkpoint>;

    /// Remove everything stored for a thread. Deleting an unknown thread is
    /// not an error.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Ids of all threads with a stored checkpoint, sorted.
    async fn list_threads(&self) -> Result<Vec<String>>;
}
