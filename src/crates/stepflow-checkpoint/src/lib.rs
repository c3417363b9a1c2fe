//! # stepflow-checkpoint - State Persistence for Workflow Runs
//!
//! Trait-based checkpoint storage for the stepflow execution engine. After
//! every completed step the engine hands the thread's full state to a
//! [`CheckpointSaver`]; the next run on the same thread resumes from it.
//!
//! ## Core Types
//!
//! - [`CheckpointSaver`] - async storage trait (`load`, `save`, `delete_thread`, `list_threads`)
//! - [`Checkpoint`] - latest state of a thread plus a store-assigned version
//! - [`CheckpointMetadata`] - step, node and [`CheckpointSource`] of a checkpoint
//! - [`InMemoryCheckpointSaver`] - process-local store for tests and development
//! - [`FileCheckpointSaver`] - one file per thread, atomic replace on save
//! - [`SerializerProtocol`] - encoding seam for persistent stores
//!
//! ## Semantics
//!
//! Stores keep exactly one checkpoint per thread. `save` overwrites it and
//! returns the new version; versions of a thread strictly increase until the
//! thread is deleted. Thread eviction is caller-driven through
//! [`CheckpointSaver::delete_thread`].
//!
//! ```rust,ignore
//! use stepflow_checkpoint::{CheckpointMetadata, CheckpointSaver, InMemoryCheckpointSaver};
//!
//! let saver = InMemoryCheckpointSaver::new();
//! let cp = saver.save("thread-1", json!({"x": 1}), CheckpointMetadata::new()).await?;
//! assert_eq!(cp.version, 1);
//! ```

pub mod checkpoint;
pub mod error;
pub mod file;
pub mod memory;
pub mod serializer;
pub mod traits;

// Re-export main types
pub use checkpoint::{Checkpoint, CheckpointMetadata, CheckpointSource, ThreadId};
pub use error::{CheckpointError, Result};
pub use file::FileCheckpointSaver;
pub use memory::InMemoryCheckpointSaver;
pub use serializer::{JsonSerializer, SerializerProtocol};
pub use traits::CheckpointSaver;
