//! HTTP server for stepflow workflows
//!
//! - [`config`] - `stepflow.toml` loading with environment overrides
//! - [`registry`] - builds the bundled workflows over one shared checkpoint
//!   store
//! - [`api`] - axum router: invoke, server-sent event streaming, thread
//!   inspection and eviction

pub mod api;
pub mod config;
pub mod registry;

pub use config::{ServerConfig, ServerConfigError};
pub use registry::{RegistryError, WorkflowRegistry};
