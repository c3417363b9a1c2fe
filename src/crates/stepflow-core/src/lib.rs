//! # stepflow-core - Stateful Workflow Graph Engine
//!
//! A small state-machine runtime: a shared, schema-checked JSON state record,
//! named async steps (nodes) connected by static or data-dependent edges,
//! per-field merge policies for folding each step's output into the state,
//! per-thread checkpointing, and a lazy stream of snapshots after every step.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stepflow_core::{MergeClass, RunConfig, StateGraph, StateSchema, END};
//! use stepflow_checkpoint::InMemoryCheckpointSaver;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut schema = StateSchema::new();
//! schema.add_field("messages", MergeClass::Append);
//! schema.add_field("report", MergeClass::Overwrite);
//!
//! let mut graph = StateGraph::new(schema);
//! graph.add_node("summarize", |state| async move {
//!     let n = state["messages"].as_array().map(Vec::len).unwrap_or(0);
//!     Ok(json!({"report": format!("{n} messages")}))
//! });
//! graph.set_entry("summarize").add_edge("summarize", END);
//!
//! let compiled = graph
//!     .compile()?
//!     .with_checkpointer(Arc::new(InMemoryCheckpointSaver::new()));
//!
//! let state = compiled
//!     .invoke(json!({"messages": ["hi"]}), RunConfig::thread("session-1"))
//!     .await?;
//! assert_eq!(state["report"], "1 messages");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`state`] - [`StateSchema`], [`MergeClass`] and the pure merge function
//! - [`graph`] - nodes, edges, [`START`]/[`END`] and structural validation
//! - [`builder`] - the [`StateGraph`] builder
//! - [`compiled`] - [`CompiledGraph`]: `invoke`, `stream`, thread state helpers
//! - [`error`] - [`GraphError`] (fatal) and [`NodeError`] (recorded in state)

pub mod builder;
pub mod compiled;
pub mod error;
pub mod graph;
pub mod state;

pub use builder::StateGraph;
pub use compiled::{CompiledGraph, RunConfig, SnapshotStream, StepSnapshot, ThreadLocks, DEFAULT_MAX_STEPS};
pub use error::{GraphError, NodeError, Result};
pub use graph::{Edge, Graph, NodeExecutor, NodeId, NodeSpec, Router, END, START};
pub use state::{MergeClass, StateError, StateSchema};

// Re-export checkpoint types callers need alongside the engine
pub use stepflow_checkpoint::{Checkpoint, CheckpointSaver, FileCheckpointSaver, InMemoryCheckpointSaver};
