//! Request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stepflow_workflows::ContentIdea;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "stepflow".to_string(),
        }
    }
}

/// Body of the invoke and stream endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Initial delta merged before the first step
    #[serde(default)]
    pub input: Value,
    /// Thread to resume or start; the run is stateless when absent
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Step bound for this run, at least 1
    #[serde(default)]
    pub max_steps: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub name: String,
    pub nodes: Vec<String>,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowList {
    pub workflows: Vec<WorkflowSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadList {
    pub threads: Vec<String>,
}

/// Body of `POST /api/youtube/publish`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouTubePublishRequest {
    pub video_link: String,
    /// Generate and publish short clips
    pub is_clip: bool,
}

/// Body of `POST /api/generate-ideas`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeationRequest {
    pub user_niche: String,
    pub platform_choice: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeationResponse {
    pub ideas: Vec<ContentIdea>,
    pub platform: String,
    pub niche: String,
}

/// Body of `POST /api/draft-post`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDraftRequest {
    pub selected_idea: ContentIdea,
    pub platform: String,
    pub niche: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDraftResponse {
    pub post_draft: String,
    pub platform: String,
}

/// Body of `POST /api/publish`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub post_draft: String,
    pub platform: String,
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub post_id: Option<String>,
}
