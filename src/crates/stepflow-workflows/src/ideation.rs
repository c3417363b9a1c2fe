//! Content ideation workflow
//!
//! One graph serves the three stages of a creator session. `dispatch`
//! checks the platform, clears any error left by an earlier run, and routes
//! on what the state already holds:
//!
//! - `publish_requested`: `upload_media → publish_post → END` for LinkedIn,
//!   `prepare_script → END` for YouTube
//! - a `selected_idea`: `draft_linkedin_post` or `draft_youtube_script`
//! - otherwise: `generate_ideas`
//!
//! On a thread the session is resumable: generate ideas, update the state
//! with the chosen idea, then run again with `publish_requested` set.

use crate::collaborators::{LanguageModel, LinkedInPost, LinkedInPublisher};
use crate::prompts;
use crate::support::{has_error, json_object_span, no_change, str_field};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use stepflow_core::{CompiledGraph, MergeClass, NodeError, Result, StateGraph, StateSchema, END};
use tracing::{info, warn};

/// Registry name of the workflow
pub const IDEATION: &str = "ideation";

/// Ideas kept from one generation
pub const IDEA_COUNT: usize = 5;

pub const LINKEDIN_PUBLISHED: &str = "Successfully published to LinkedIn";
pub const YOUTUBE_SCRIPT_READY: &str = "YouTube script prepared (no direct publish integration)";

const IDEAS_FAILED: &str = "Idea generation failed.";
const DRAFT_FAILED: &str = "LLM drafting failed.";
const MEDIA_UPLOAD_FAILED: &str = "LinkedIn media upload failed.";
const LINKEDIN_FAILED: &str = "LinkedIn publishing failed.";

/// Target platform of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    YouTube,
}

impl Platform {
    /// Case-insensitive parse of `linkedin` / `youtube`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Some(Self::LinkedIn),
            "youtube" => Some(Self::YouTube),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkedIn => "linkedin",
            Self::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    pub summary: String,
}

#[derive(Deserialize)]
struct IdeasList {
    ideas: Vec<ContentIdea>,
}

pub struct IdeationServices {
    pub model: Arc<dyn LanguageModel>,
    pub linkedin: Arc<dyn LinkedInPublisher>,
}

/// Builder for the ideation graph
pub struct IdeationWorkflow {
    services: IdeationServices,
}

impl IdeationWorkflow {
    pub fn new(services: IdeationServices) -> Self {
        Self { services }
    }

    pub fn schema() -> StateSchema {
        let mut schema = StateSchema::new();
        for field in [
            "user_niche",
            "platform_choice",
            "media_url",
            "content_ideas",
            "selected_idea",
            "post_draft",
            "script_draft",
            "media_asset_urn",
            "post_id",
            "publish_message",
        ] {
            schema.add_field_with_default(field, MergeClass::Overwrite, Value::Null);
        }
        schema.add_field_with_default("publish_requested", MergeClass::Overwrite, json!(false));
        schema
    }

    pub fn build(self) -> Result<CompiledGraph> {
        let ctx = Arc::new(self.services);
        let mut graph = StateGraph::new(Self::schema());

        graph.add_node("dispatch", |state| async move { dispatch(state) });
        let c = ctx.clone();
        graph.add_node("generate_ideas", move |state| generate_ideas(c.clone(), state));
        let c = ctx.clone();
        graph.add_node("draft_linkedin_post", move |state| {
            draft(c.clone(), state, Platform::LinkedIn)
        });
        let c = ctx.clone();
        graph.add_node("draft_youtube_script", move |state| {
            draft(c.clone(), state, Platform::YouTube)
        });
        let c = ctx.clone();
        graph.add_node("upload_media", move |state| upload_media(c.clone(), state));
        let c = ctx;
        graph.add_node("publish_post", move |state| publish_post(c.clone(), state));
        graph.add_node("prepare_script", |state| async move { prepare_script(state) });

        graph.set_entry("dispatch");
        graph.add_conditional_edges(
            "dispatch",
            |state| next_stage(state).to_string(),
            [
                ("abort", END),
                ("ideas", "generate_ideas"),
                ("linkedin_draft", "draft_linkedin_post"),
                ("youtube_draft", "draft_youtube_script"),
                ("linkedin_publish", "upload_media"),
                ("youtube_publish", "prepare_script"),
            ],
        );
        graph.add_edge("generate_ideas", END);
        graph.add_edge("draft_linkedin_post", END);
        graph.add_edge("draft_youtube_script", END);
        graph.add_edge("upload_media", "publish_post");
        graph.add_edge("publish_post", END);
        graph.add_edge("prepare_script", END);

        graph.compile()
    }
}

fn platform_of(state: &Value) -> Option<Platform> {
    Platform::parse(str_field(state, "platform_choice"))
}

fn dispatch(state: Value) -> std::result::Result<Value, NodeError> {
    let raw = str_field(&state, "platform_choice");
    let platform = Platform::parse(raw).ok_or_else(|| {
        NodeError::new(format!(
            "Unsupported platform '{raw}'. Use 'linkedin' or 'youtube'."
        ))
    })?;
    Ok(json!({"platform_choice": platform.as_str(), "error": null}))
}

fn next_stage(state: &Value) -> &'static str {
    if has_error(state) {
        return "abort";
    }
    let publish = state["publish_requested"].as_bool().unwrap_or(false);
    let selected = !state["selected_idea"].is_null();

    match (platform_of(state), publish, selected) {
        (None, _, _) => "abort",
        (Some(Platform::LinkedIn), true, _) => "linkedin_publish",
        (Some(Platform::YouTube), true, _) => "youtube_publish",
        (Some(Platform::LinkedIn), false, true) => "linkedin_draft",
        (Some(Platform::YouTube), false, true) => "youtube_draft",
        (Some(_), false, false) => "ideas",
    }
}

async fn generate_ideas(
    ctx: Arc<IdeationServices>,
    state: Value,
) -> std::result::Result<Value, NodeError> {
    let niche = str_field(&state, "user_niche").trim();
    if niche.is_empty() {
        return Err(NodeError::new("No niche provided."));
    }
    let platform = str_field(&state, "platform_choice");

    let reply = ctx
        .model
        .complete(&prompts::content_ideas(niche, platform))
        .await
        .map_err(|e| {
            warn!(error = %e, "Idea generation model call failed");
            NodeError::new(IDEAS_FAILED)
        })?;
    let ideas = parse_ideas(&reply).map_err(|e| {
        warn!(error = %e, "Model reply was not an idea list");
        NodeError::new(IDEAS_FAILED)
    })?;

    info!(count = ideas.len(), niche, platform, "Content ideas generated");
    Ok(json!({"content_ideas": ideas}))
}

fn parse_ideas(reply: &str) -> std::result::Result<Vec<ContentIdea>, String> {
    let span = json_object_span(reply).ok_or_else(|| "no JSON object in reply".to_string())?;
    let mut parsed: IdeasList = serde_json::from_str(span).map_err(|e| e.to_string())?;
    if parsed.ideas.is_empty() {
        return Err("reply holds no ideas".to_string());
    }
    parsed.ideas.truncate(IDEA_COUNT);
    Ok(parsed.ideas)
}

async fn draft(
    ctx: Arc<IdeationServices>,
    state: Value,
    platform: Platform,
) -> std::result::Result<Value, NodeError> {
    let idea: ContentIdea = serde_json::from_value(state["selected_idea"].clone())
        .map_err(|_| NodeError::new("Selected idea must have a title and a summary."))?;
    let niche = str_field(&state, "user_niche");

    let prompt = match platform {
        Platform::LinkedIn => prompts::linkedin_post(niche, &idea.title, &idea.summary),
        Platform::YouTube => prompts::youtube_script(niche, &idea.title, &idea.summary),
    };
    let text = ctx.model.complete(&prompt).await.map_err(|e| {
        warn!(error = %e, %platform, "Drafting model call failed");
        NodeError::new(DRAFT_FAILED)
    })?;
    let text = text.trim();

    info!(%platform, title = %idea.title, chars = text.chars().count(), "Draft written");
    Ok(match platform {
        Platform::LinkedIn => json!({"post_draft": text}),
        Platform::YouTube => json!({"script_draft": text}),
    })
}

async fn upload_media(
    ctx: Arc<IdeationServices>,
    state: Value,
) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let media_url = str_field(&state, "media_url").trim();
    if media_url.is_empty() {
        return Ok(json!({"media_asset_urn": null}));
    }

    let urn = ctx.linkedin.upload_media(media_url).await.map_err(|e| {
        warn!(error = %e, media_url, "Media upload failed");
        NodeError::new(MEDIA_UPLOAD_FAILED)
    })?;
    Ok(json!({"media_asset_urn": urn}))
}

async fn publish_post(
    ctx: Arc<IdeationServices>,
    state: Value,
) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let text = str_field(&state, "post_draft").trim();
    if text.is_empty() {
        return Err(NodeError::new("No post draft to publish."));
    }

    let post = LinkedInPost {
        text: text.to_string(),
        media_asset: state["media_asset_urn"].as_str().map(String::from),
    };
    let post_id = ctx.linkedin.publish_post(&post).await.map_err(|e| {
        warn!(error = %e, "LinkedIn publish failed");
        NodeError::new(LINKEDIN_FAILED)
    })?;

    info!(post_id = %post_id, "Published to LinkedIn");
    Ok(json!({
        "post_id": post_id,
        "publish_message": LINKEDIN_PUBLISHED,
        "publish_requested": false,
    }))
}

fn prepare_script(state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    Ok(json!({
        "post_id": null,
        "publish_message": YOUTUBE_SCRIPT_READY,
        "publish_requested": false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        assert_eq!(Platform::parse(" LinkedIn "), Some(Platform::LinkedIn));
        assert_eq!(Platform::parse("youtube"), Some(Platform::YouTube));
        assert_eq!(Platform::parse("tiktok"), None);
        assert_eq!(serde_json::to_value(Platform::YouTube).unwrap(), json!("youtube"));
    }

    #[test]
    fn test_parse_ideas_keeps_at_most_five() {
        let ideas: Vec<Value> = (1..=7)
            .map(|n| json!({"title": format!("Idea {n}"), "summary": "s"}))
            .collect();
        let reply = format!("Here you go: {}", json!({"ideas": ideas}));

        let parsed = parse_ideas(&reply).unwrap();
        assert_eq!(parsed.len(), IDEA_COUNT);
        assert_eq!(parsed[0].title, "Idea 1");
    }

    #[test]
    fn test_parse_ideas_rejects_empty_and_prose() {
        assert!(parse_ideas(r#"{"ideas": []}"#).is_err());
        assert!(parse_ideas("I could not think of anything").is_err());
    }

    #[test]
    fn test_next_stage() {
        let base = json!({"platform_choice": "linkedin", "publish_requested": false, "selected_idea": null});
        assert_eq!(next_stage(&base), "ideas");

        let mut selected = base.clone();
        selected["selected_idea"] = json!({"title": "t", "summary": "s"});
        assert_eq!(next_stage(&selected), "linkedin_draft");

        let mut publish = selected.clone();
        publish["publish_requested"] = json!(true);
        assert_eq!(next_stage(&publish), "linkedin_publish");
        publish["platform_choice"] = json!("youtube");
        assert_eq!(next_stage(&publish), "youtube_publish");

        let mut failed = base;
        failed["error"] = json!("Unsupported platform");
        assert_eq!(next_stage(&failed), "abort");
    }

    #[test]
    fn test_dispatch_normalizes_and_clears_error() {
        let delta = dispatch(json!({"platform_choice": "YouTube", "error": "stale"})).unwrap();
        assert_eq!(delta, json!({"platform_choice": "youtube", "error": null}));

        let err = dispatch(json!({"platform_choice": "myspace"})).unwrap_err();
        assert!(err.message().contains("Unsupported platform 'myspace'"));
    }
}
