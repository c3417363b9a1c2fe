//! Comment analysis workflow
//!
//! `fetch_comments → analyze_comments → generate_report → END`
//!
//! Fetches up to [`DEFAULT_MAX_COMMENTS`] top-level comments of a YouTube
//! video, has the model break down their sentiment, then turns the
//! breakdown into a client-facing report. The report is also appended to
//! `messages`.

use crate::collaborators::{CommentSource, LanguageModel};
use crate::prompts;
use crate::support::{has_error, message, no_change, str_field};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use stepflow_core::{CompiledGraph, MergeClass, NodeError, Result, StateGraph, StateSchema, END};
use tracing::{info, warn};

/// Registry name of the workflow
pub const ANALYSIS: &str = "analysis";

pub const DEFAULT_MAX_COMMENTS: usize = 25;

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v=([a-zA-Z0-9_-]{11})").expect("valid video id pattern"));

/// Extract the 11-character video id from a watch URL
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Builder for the analysis graph
pub struct AnalysisWorkflow {
    model: Arc<dyn LanguageModel>,
    comments: Arc<dyn CommentSource>,
    max_comments: usize,
}

struct Context {
    model: Arc<dyn LanguageModel>,
    comments: Arc<dyn CommentSource>,
    max_comments: usize,
}

impl AnalysisWorkflow {
    pub fn new(model: Arc<dyn LanguageModel>, comments: Arc<dyn CommentSource>) -> Self {
        Self {
            model,
            comments,
            max_comments: DEFAULT_MAX_COMMENTS,
        }
    }

    pub fn with_max_comments(mut self, max_comments: usize) -> Self {
        self.max_comments = max_comments;
        self
    }

    pub fn schema() -> StateSchema {
        let mut schema = StateSchema::new();
        schema
            .add_field("messages", MergeClass::Append)
            .add_field_with_default("video_url", MergeClass::Overwrite, Value::Null)
            .add_field_with_default("comments", MergeClass::Overwrite, Value::Null)
            .add_field_with_default("analysis", MergeClass::Overwrite, Value::Null)
            .add_field_with_default("report", MergeClass::Overwrite, Value::Null);
        schema
    }

    pub fn build(self) -> Result<CompiledGraph> {
        let ctx = Arc::new(Context {
            model: self.model,
            comments: self.comments,
            max_comments: self.max_comments,
        });

        let mut graph = StateGraph::new(Self::schema());

        let c = ctx.clone();
        graph.add_node("fetch_comments", move |state| fetch_comments(c.clone(), state));
        let c = ctx.clone();
        graph.add_node("analyze_comments", move |state| analyze_comments(c.clone(), state));
        let c = ctx;
        graph.add_node("generate_report", move |state| generate_report(c.clone(), state));

        graph.set_entry("fetch_comments");
        graph.add_edge("fetch_comments", "analyze_comments");
        graph.add_edge("analyze_comments", "generate_report");
        graph.add_edge("generate_report", END);

        graph.compile()
    }
}

async fn fetch_comments(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let url = str_field(&state, "video_url");
    let video_id = extract_video_id(url).ok_or("Invalid YouTube video URL.")?;

    info!(video_id, "Fetching comments");
    let comments = ctx
        .comments
        .fetch_comments(video_id, ctx.max_comments)
        .await
        .map_err(|e| {
            warn!(error = %e, video_id, "Comment fetch failed");
            NodeError::new(format!("Comment fetch failed: {e}"))
        })?;

    Ok(json!({"comments": format_comments(url, &comments)}))
}

fn format_comments(url: &str, comments: &[String]) -> String {
    if comments.is_empty() {
        return "No comments found for this video.".to_string();
    }
    let lines: Vec<String> = comments.iter().map(|c| format!("- {c}")).collect();
    format!("Comments from the video at {url}:\n{}", lines.join("\n"))
}

async fn analyze_comments(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let prompt = prompts::comment_analysis(str_field(&state, "comments"));
    let analysis = ctx.model.complete(&prompt).await?;
    info!("Comment analysis complete");
    Ok(json!({"analysis": analysis}))
}

async fn generate_report(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let prompt = prompts::comment_report(
        str_field(&state, "video_url"),
        str_field(&state, "analysis"),
    );
    let report = ctx.model.complete(&prompt).await?;
    info!("Report generated");
    Ok(json!({
        "report": report,
        "messages": [message("assistant", report.clone())],
    }))
}
