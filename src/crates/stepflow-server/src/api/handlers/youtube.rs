//! YouTube publishing endpoint
//!
//! Streams the publishing workflow with data-only SSE frames, one
//! `{"<node>": <state>}` object per completed step.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde_json::json;
use stepflow_core::RunConfig;
use stepflow_workflows::PUBLISHING;

use crate::api::{
    error::{ApiError, ApiResult},
    models::YouTubePublishRequest,
    routes::AppState,
    sse,
};

/// Handler for POST /api/youtube/publish
pub async fn youtube_publish(
    State(state): State<AppState>,
    Json(request): Json<YouTubePublishRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let graph = state
        .registry
        .get(PUBLISHING)
        .cloned()
        .ok_or_else(|| ApiError::Unavailable("YouTube publishing workflow not available".into()))?;

    if request.video_link.trim().is_empty() {
        return Err(ApiError::BadRequest("video_link must not be empty".into()));
    }

    tracing::info!(video = %request.video_link, clips = request.is_clip, "Starting YouTube publishing");
    let input = json!({
        "video_url": request.video_link,
        "user_wants_clips": request.is_clip,
    });
    let snapshots = graph.stream(input, RunConfig::new());

    Ok(Sse::new(sse::node_update_events(snapshots)).keep_alive(KeepAlive::default()))
}
