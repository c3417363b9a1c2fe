//! Error types for graph construction and execution
//!
//! Two distinct kinds of failure exist in a run:
//!
//! - [`GraphError`] is *fatal*. It aborts the run (or rejects the graph at
//!   compile time) and surfaces to the caller.
//! - [`NodeError`] is *data*. A node body that fails returns one; the engine
//!   records its message in the state's error field and keeps going, so a
//!   later node (or the caller) can react to it.
//!
//! ```text
//! GraphError
//! ├── Configuration      - invalid graph definition, raised by compile()
//! ├── Routing            - router returned a key with no mapped target
//! ├── StepLimitExceeded  - run exceeded its step bound
//! ├── Checkpoint         - load/save failed
//! ├── State              - malformed input or node delta
//! └── Serialization      - JSON errors
//! ```

use crate::state::StateError;
use thiserror::Error;

/// Convenience result type using [`GraphError`]
pub type Result<T> = std::result::Result<T, GraphError>;

/// Fatal error for graph construction or a run
#[derive(Error, Debug)]
pub enum GraphError {
    /// Graph definition is invalid
    ///
    /// Only ever produced by [`StateGraph::compile`](crate::StateGraph::compile),
    /// never during a run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A conditional edge's router produced a key that its target map does
    /// not contain
    #[error("Routing error at node '{node}': no target mapped for route key '{key}'")]
    Routing {
        /// Node whose outgoing edge was being resolved
        node: String,
        /// Key returned by the router
        key: String,
    },

    /// The run executed `limit` steps without reaching the terminal marker
    #[error("Step limit of {limit} exceeded")]
    StepLimitExceeded {
        /// Configured bound for the run
        limit: usize,
    },

    /// Checkpoint persistence error
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] stepflow_checkpoint::CheckpointError),

    /// Caller input or a node delta could not be merged into the state
    #[error("State error{}: {source}", node.as_ref().map(|n| format!(" in node '{n}'")).unwrap_or_default())]
    State {
        /// Node whose delta was rejected, `None` for caller input
        node: Option<String>,
        /// Underlying merge failure
        #[source]
        source: StateError,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Routing error for `node` and the unmapped `key`
    pub fn routing(node: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Routing {
            node: node.into(),
            key: key.into(),
        }
    }

    /// State error attributed to a node delta
    pub fn node_state(node: impl Into<String>, source: StateError) -> Self {
        Self::State {
            node: Some(node.into()),
            source,
        }
    }

    /// Short machine-readable category name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Routing { .. } => "routing",
            Self::StepLimitExceeded { .. } => "step_limit_exceeded",
            Self::Checkpoint(_) => "checkpoint",
            Self::State { .. } => "state",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<StateError> for GraphError {
    fn from(source: StateError) -> Self {
        Self::State { node: None, source }
    }
}

/// Recoverable failure raised by a node body
///
/// The message ends up verbatim in the state's error field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NodeError {
    message: String,
}

impl NodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message recorded in the error field
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for NodeError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for NodeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}
