//! Thread inspection, manual updates and eviction

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use stepflow_core::Checkpoint;

use crate::api::{
    error::{ApiError, ApiResult},
    handlers::workflows::lookup,
    models::ThreadList,
    routes::AppState,
};

/// Handler for GET /api/threads
pub async fn list_threads(State(state): State<AppState>) -> ApiResult<Json<ThreadList>> {
    let threads = state.registry.checkpointer().list_threads().await?;
    Ok(Json(ThreadList { threads }))
}

/// Handler for GET /api/threads/:thread_id
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Checkpoint>> {
    state
        .registry
        .checkpointer()
        .load(&thread_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::thread_not_found(&thread_id))
}

/// Handler for PATCH /api/threads/:thread_id/:workflow
///
/// Merges the body into the thread's state with the workflow's merge
/// policy. The body must be a JSON object naming declared fields.
pub async fn update_thread(
    State(state): State<AppState>,
    Path((thread_id, workflow)): Path<(String, String)>,
    Json(delta): Json<Value>,
) -> ApiResult<Json<Checkpoint>> {
    let graph = lookup(&state, &workflow)?;
    let checkpoint = graph.update_state(&thread_id, delta).await?;
    Ok(Json(checkpoint))
}

/// Handler for DELETE /api/threads/:thread_id
///
/// Waits for any run on the thread to finish before evicting it.
pub async fn delete_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    let registry = &state.registry;
    let _guard = registry.locks().acquire(&thread_id).await;

    let saver = registry.checkpointer();
    if saver.load(&thread_id).await?.is_none() {
        return Err(ApiError::thread_not_found(&thread_id));
    }
    saver.delete_thread(&thread_id).await?;

    tracing::info!(thread_id = %thread_id, "Thread deleted");
    Ok(StatusCode::NO_CONTENT)
}
