//! REST API layer for stepflow-server
//!
//! Provides HTTP endpoints to:
//! - list the registered workflows
//! - run a workflow to completion or stream its steps as server-sent events
//! - inspect, patch and evict thread checkpoints
//! - stream the YouTube publishing workflow

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod sse;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use middleware::cors_layer;
pub use routes::{create_router, AppState};
