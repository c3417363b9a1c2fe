//! CompiledGraph execution engine
//!
//! A [`CompiledGraph`] is an immutable, cheaply clonable handle on a
//! validated graph. It runs in two forms sharing one step loop:
//!
//! - [`invoke`](CompiledGraph::invoke) drives the loop to completion and
//!   returns the final state.
//! - [`stream`](CompiledGraph::stream) returns a lazy [`SnapshotStream`] that
//!   executes one step per poll and yields a [`StepSnapshot`] after each.
//!
//! # Step loop
//!
//! ```text
//! load checkpoint (or schema defaults) ─► merge caller input ─► current := entry
//!        ┌──────────────────────────────────────────────────────────┘
//!        ▼
//!   step limit? ─► run node body ─► merge delta (or error field) ─► save checkpoint
//!        ▲                                                          │
//!        └──────── current := next ◄── resolve edge ◄───────────────┘
//!                                           │ next == END
//!                                           ▼
//!                                         done
//! ```
//!
//! Runs that name a thread on a graph with a checkpointer hold that thread's
//! lock from the checkpoint load until the run ends, so two runs on the same
//! thread never interleave. A dropped stream ends its run once the node in
//! flight has returned and been checkpointed.

mod execution;
mod graph;
mod locks;
mod state;
mod streaming;
mod types;

pub use graph::CompiledGraph;
pub use locks::ThreadLocks;
pub use types::{RunConfig, SnapshotStream, StepSnapshot, DEFAULT_MAX_STEPS};
