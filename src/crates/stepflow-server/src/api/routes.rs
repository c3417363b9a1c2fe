//! API route definitions

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::{handlers, middleware::cors_layer};
use crate::registry::WorkflowRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WorkflowRegistry>,
}

impl AppState {
    pub fn new(registry: WorkflowRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Build the complete API router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // Workflow endpoints
        .route("/api/workflows", get(handlers::list_workflows))
        .route("/api/workflows/:name/invoke", post(handlers::invoke_workflow))
        .route("/api/workflows/:name/stream", post(handlers::stream_workflow))
        // Thread endpoints
        .route("/api/threads", get(handlers::list_threads))
        .route(
            "/api/threads/:thread_id",
            get(handlers::get_thread).delete(handlers::delete_thread),
        )
        .route(
            "/api/threads/:thread_id/:workflow",
            patch(handlers::update_thread),
        )
        // Ideation endpoints
        .route("/api/generate-ideas", post(handlers::generate_ideas))
        .route("/api/draft-post", post(handlers::draft_post))
        .route("/api/publish", post(handlers::publish_content))
        // Publishing compatibility endpoint
        .route("/api/youtube/publish", post(handlers::youtube_publish))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
