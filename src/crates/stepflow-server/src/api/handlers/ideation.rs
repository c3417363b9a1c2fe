//! Content ideation endpoints
//!
//! Each request is one stateless run of the ideation workflow. The graph
//! picks the stage from the input: a bare niche generates ideas, a selected
//! idea drafts, `publish_requested` publishes.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use stepflow_core::{CompiledGraph, RunConfig};
use stepflow_workflows::{ContentIdea, Platform, IDEATION};

use crate::api::{
    error::{ApiError, ApiResult},
    models::{
        IdeationRequest, IdeationResponse, PostDraftRequest, PostDraftResponse, PublishRequest,
        PublishResponse,
    },
    routes::AppState,
};

/// Handler for POST /api/generate-ideas
pub async fn generate_ideas(
    State(state): State<AppState>,
    Json(request): Json<IdeationRequest>,
) -> ApiResult<Json<IdeationResponse>> {
    let graph = ideation_graph(&state)?;
    let platform = parse_platform(&request.platform_choice)?;
    if request.user_niche.trim().is_empty() {
        return Err(ApiError::BadRequest("user_niche must not be empty".into()));
    }

    tracing::info!(niche = %request.user_niche, %platform, "Generating content ideas");
    let input = json!({
        "user_niche": request.user_niche,
        "platform_choice": platform.as_str(),
        "media_url": request.media_url,
    });
    let result = run(&graph, input, "Error generating ideas").await?;

    let ideas: Vec<ContentIdea> = serde_json::from_value(result["content_ideas"].clone())
        .map_err(|e| ApiError::InternalError(format!("Error generating ideas: {e}")))?;
    Ok(Json(IdeationResponse {
        ideas,
        platform: platform.to_string(),
        niche: request.user_niche,
    }))
}

/// Handler for POST /api/draft-post
///
/// LinkedIn gets a post, YouTube a video script; both come back as
/// `post_draft`.
pub async fn draft_post(
    State(state): State<AppState>,
    Json(request): Json<PostDraftRequest>,
) -> ApiResult<Json<PostDraftResponse>> {
    let graph = ideation_graph(&state)?;
    let platform = parse_platform(&request.platform)?;

    tracing::info!(title = %request.selected_idea.title, %platform, "Drafting content");
    let input = json!({
        "user_niche": request.niche,
        "platform_choice": platform.as_str(),
        "selected_idea": request.selected_idea,
        "media_url": request.media_url,
    });
    let result = run(&graph, input, "Error drafting post").await?;

    let field = match platform {
        Platform::LinkedIn => "post_draft",
        Platform::YouTube => "script_draft",
    };
    Ok(Json(PostDraftResponse {
        post_draft: result[field].as_str().unwrap_or_default().to_string(),
        platform: platform.to_string(),
    }))
}

/// Handler for POST /api/publish
pub async fn publish_content(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let graph = ideation_graph(&state)?;
    let platform = parse_platform(&request.platform)?;

    tracing::info!(%platform, media = request.media_url.is_some(), "Publishing content");
    let input = json!({
        "platform_choice": platform.as_str(),
        "post_draft": request.post_draft,
        "media_url": request.media_url,
        "publish_requested": true,
    });
    let result = run(&graph, input, "Error publishing content").await?;

    Ok(Json(PublishResponse {
        success: true,
        message: result["publish_message"].as_str().unwrap_or_default().to_string(),
        post_id: result["post_id"].as_str().map(String::from),
    }))
}

fn ideation_graph(state: &AppState) -> ApiResult<CompiledGraph> {
    state
        .registry
        .get(IDEATION)
        .cloned()
        .ok_or_else(|| ApiError::Unavailable("Content ideation workflow not available".into()))
}

fn parse_platform(raw: &str) -> ApiResult<Platform> {
    Platform::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Unsupported platform '{raw}'. Use 'linkedin' or 'youtube'."
        ))
    })
}

/// Stateless run; an error recorded in the final state becomes a 500
async fn run(graph: &CompiledGraph, input: Value, context: &str) -> ApiResult<Value> {
    let result = graph.invoke(input, RunConfig::new()).await?;
    match result["error"].as_str() {
        Some(message) if !message.is_empty() => {
            Err(ApiError::InternalError(format!("{context}: {message}")))
        }
        _ => Ok(result),
    }
}
