//! Video publishing workflow
//!
//! Downloads a video, optionally asks a language model for short viral
//! clips, and publishes the raw video and/or the clips.
//!
//! ```text
//! download → get_validation ─┬─(user_wants_clips)→ clip_agent → validate_clips ─┐
//!                            └─(otherwise)────────────────────────────────────→ publish_to_youtube → END
//! ```
//!
//! Every node that touches a collaborator skips its work once `error` is
//! set, so a failed download flows straight through to the end of the run
//! with the failure message preserved.

use crate::collaborators::{
    ClipCutter, ClipSegment, LanguageModel, Transcriber, VideoDownloader, VideoPublisher,
    VideoUpload,
};
use crate::prompts;
use crate::support::{has_error, json_object_span, no_change, str_field, truncate_chars};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stepflow_core::{CompiledGraph, MergeClass, NodeError, Result, StateGraph, StateSchema, END};
use tracing::{info, warn};
use uuid::Uuid;

/// Registry name of the workflow
pub const PUBLISHING: &str = "publishing";

/// Default number of transcript characters sent to the model
pub const DEFAULT_TRANSCRIPT_LIMIT: usize = 1000;

const DOWNLOAD_FAILED: &str = "Video download failed.";
const DOWNLOADER_MISSING: &str = "Download executable not found.";
const TRANSCRIPTION_FAILED: &str = "Transcription failed.";
const CLIPPING_FAILED: &str = "LLM clipping agent failed.";
const PUBLISHING_FAILED: &str = "YouTube publishing failed.";

/// Collaborators used by the publishing workflow
#[derive(Clone)]
pub struct PublishingServices {
    pub model: Arc<dyn LanguageModel>,
    pub downloader: Arc<dyn VideoDownloader>,
    pub transcriber: Arc<dyn Transcriber>,
    pub cutter: Arc<dyn ClipCutter>,
    pub publisher: Arc<dyn VideoPublisher>,
}

/// Builder for the publishing graph
pub struct PublishingWorkflow {
    services: PublishingServices,
    work_dir: PathBuf,
    transcript_limit: usize,
}

struct Context {
    services: PublishingServices,
    work_dir: PathBuf,
    transcript_limit: usize,
}

#[derive(Deserialize)]
struct ViralClips {
    clips: Vec<ClipSegment>,
}

impl PublishingWorkflow {
    pub fn new(services: PublishingServices) -> Self {
        Self {
            services,
            work_dir: std::env::temp_dir().join("stepflow"),
            transcript_limit: DEFAULT_TRANSCRIPT_LIMIT,
        }
    }

    /// Directory for downloaded videos and cut clips
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_transcript_limit(mut self, limit: usize) -> Self {
        self.transcript_limit = limit;
        self
    }

    /// State fields of the workflow
    pub fn schema() -> StateSchema {
        let mut schema = StateSchema::new();
        schema
            .add_field_with_default("video_url", MergeClass::Overwrite, Value::Null)
            .add_field_with_default("video_file_path", MergeClass::Overwrite, Value::Null)
            .add_field_with_default("transcript", MergeClass::Overwrite, Value::Null)
            .add_field_with_default("clips", MergeClass::Overwrite, json!([]))
            .add_field_with_default("validation_passed", MergeClass::Overwrite, json!(false))
            .add_field_with_default("publish_clips", MergeClass::Overwrite, json!(true))
            .add_field_with_default("user_wants_clips", MergeClass::Overwrite, json!(false))
            .add_field("uploaded", MergeClass::Append);
        schema
    }

    pub fn build(self) -> Result<CompiledGraph> {
        let ctx = Arc::new(Context {
            services: self.services,
            work_dir: self.work_dir,
            transcript_limit: self.transcript_limit,
        });

        let mut graph = StateGraph::new(Self::schema());

        let c = ctx.clone();
        graph.add_node("download", move |state| download(c.clone(), state));
        graph.add_node("get_validation", |state| async move { get_validation(state) });
        let c = ctx.clone();
        graph.add_node("clip_agent", move |state| clip_agent(c.clone(), state));
        graph.add_node("validate_clips", |state| async move { validate_clips(state) });
        let c = ctx;
        graph.add_node("publish_to_youtube", move |state| publish(c.clone(), state));

        graph.set_entry("download");
        graph.add_edge("download", "get_validation");
        graph.add_conditional_edges(
            "get_validation",
            |state| {
                if wants_clips(state) {
                    "clip_agent".to_string()
                } else {
                    "publish_to_youtube".to_string()
                }
            },
            [
                ("clip_agent", "clip_agent"),
                ("publish_to_youtube", "publish_to_youtube"),
            ],
        );
        graph.add_edge("clip_agent", "validate_clips");
        graph.add_edge("validate_clips", "publish_to_youtube");
        graph.add_edge("publish_to_youtube", END);

        graph.compile()
    }
}

fn wants_clips(state: &Value) -> bool {
    state["user_wants_clips"].as_bool().unwrap_or(false)
}

fn clips_of(state: &Value) -> std::result::Result<Vec<ClipSegment>, serde_json::Error> {
    match &state["clips"] {
        Value::Null => Ok(Vec::new()),
        clips => serde_json::from_value(clips.clone()),
    }
}

async fn download(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let url = str_field(&state, "video_url");
    if url.is_empty() {
        return Err(NodeError::new("No video URL provided."));
    }

    let output = ctx.work_dir.join(format!("{}.mp4", Uuid::new_v4()));
    match ctx.services.downloader.download(url, &output).await {
        Ok(path) => {
            info!(url, path = %path.display(), "Video downloaded");
            Ok(json!({"video_file_path": path.display().to_string()}))
        }
        Err(e) if e.is_missing_executable() => {
            warn!(error = %e, "Downloader is not installed");
            Err(NodeError::new(DOWNLOADER_MISSING))
        }
        Err(e) => {
            warn!(error = %e, url, "Video download failed");
            Err(NodeError::new(DOWNLOAD_FAILED))
        }
    }
}

fn get_validation(state: Value) -> std::result::Result<Value, NodeError> {
    let decision = wants_clips(&state);
    info!(user_wants_clips = decision, "User decision recorded");
    Ok(json!({"user_wants_clips": decision}))
}

async fn clip_agent(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }
    let video = PathBuf::from(str_field(&state, "video_file_path"));

    let transcript = ctx.services.transcriber.transcribe(&video).await.map_err(|e| {
        warn!(error = %e, "Transcription failed");
        NodeError::new(TRANSCRIPTION_FAILED)
    })?;

    let prompt = prompts::viral_clips(truncate_chars(&transcript, ctx.transcript_limit));
    let clips = match ctx.services.model.complete(&prompt).await {
        Ok(reply) => parse_clips(&reply).map_err(|e| {
            warn!(error = %e, "Model reply was not a clip list");
            NodeError::new(CLIPPING_FAILED)
        })?,
        Err(e) => {
            warn!(error = %e, "Clipping model call failed");
            return Err(NodeError::new(CLIPPING_FAILED));
        }
    };

    info!(count = clips.len(), "Clips generated");
    Ok(json!({"transcript": transcript, "clips": clips}))
}

fn parse_clips(reply: &str) -> std::result::Result<Vec<ClipSegment>, String> {
    let span = json_object_span(reply).ok_or_else(|| "no JSON object in reply".to_string())?;
    let parsed: ViralClips = serde_json::from_str(span).map_err(|e| e.to_string())?;
    Ok(parsed.clips)
}

fn validate_clips(state: Value) -> std::result::Result<Value, NodeError> {
    let passed = state["clips"].as_array().is_some_and(|clips| !clips.is_empty());
    if passed {
        info!("Clips validated");
    } else {
        warn!("Clip validation failed, no clips to publish");
    }
    Ok(json!({"validation_passed": passed}))
}

async fn publish(ctx: Arc<Context>, state: Value) -> std::result::Result<Value, NodeError> {
    if has_error(&state) {
        return Ok(no_change());
    }

    let wants = wants_clips(&state);
    let clips = clips_of(&state).map_err(|e| {
        warn!(error = %e, "Stored clips are malformed");
        NodeError::new(PUBLISHING_FAILED)
    })?;
    let video = PathBuf::from(str_field(&state, "video_file_path"));

    publish_all(&ctx, &video, wants, &clips).await.map_err(|e| {
        warn!(error = %e, "Publishing failed");
        NodeError::new(PUBLISHING_FAILED)
    })
}

async fn publish_all(
    ctx: &Context,
    video: &Path,
    wants_clips: bool,
    clips: &[ClipSegment],
) -> crate::error::Result<Value> {
    let mut uploaded = Vec::new();

    // Clips requested but none produced: nothing is published.
    if !wants_clips || !clips.is_empty() {
        let upload = VideoUpload::new(video, "Raw Video Upload")
            .with_description("This is a raw video uploaded directly from the workflow.")
            .with_tags(["raw", "video", "upload", "automation"]);
        let id = ctx.services.publisher.publish(&upload).await?;
        uploaded.push(json!({"kind": "raw", "video_id": id, "title": upload.title}));
    }

    if wants_clips {
        for (i, clip) in clips.iter().enumerate() {
            let n = i + 1;
            let output = clip_path(video, n);
            let file = ctx.services.cutter.cut(video, clip, &output).await?;

            let upload = VideoUpload::new(file, format!("Viral Clip #{n} - {}", clip.caption))
                .with_description(
                    "This short clip was automatically generated. \n\n#Shorts #YouTubeShorts #Viral",
                )
                .with_tags(["viral", "shorts", "ai", "content creation"]);
            let id = ctx.services.publisher.publish(&upload).await?;
            uploaded.push(json!({"kind": "clip", "video_id": id, "title": upload.title}));
        }
    }

    Ok(json!({"uploaded": uploaded}))
}

fn clip_path(video: &Path, n: usize) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    video.with_file_name(format!("{stem}_clip_{n}_vertical.mp4"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clips_from_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"clips\": [{\"start_sec\": 10, \"duration_sec\": 25, \"caption\": \"Hook\"}]}\n```";
        let clips = parse_clips(reply).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].caption, "Hook");
    }

    #[test]
    fn test_parse_clips_rejects_prose() {
        assert!(parse_clips("I could not find any good clips.").is_err());
        assert!(parse_clips("{\"segments\": []}").is_err());
    }

    #[test]
    fn test_clip_path_next_to_video() {
        let path = clip_path(Path::new("/work/abc.mp4"), 2);
        assert_eq!(path, PathBuf::from("/work/abc_clip_2_vertical.mp4"));
    }

    #[test]
    fn test_validate_clips() {
        let passed = validate_clips(json!({"clips": [{"start_sec": 0}]})).unwrap();
        assert_eq!(passed, json!({"validation_passed": true}));
        let failed = validate_clips(json!({"clips": []})).unwrap();
        assert_eq!(failed, json!({"validation_passed": false}));
    }

    #[test]
    fn test_schema_compiles_with_defaults() {
        let schema = PublishingWorkflow::schema();
        assert!(schema.check().is_ok());
        let defaults = schema.defaults();
        assert_eq!(defaults["uploaded"], json!([]));
        assert_eq!(defaults["user_wants_clips"], json!(false));
        assert_eq!(defaults["publish_clips"], json!(true));
    }
}
