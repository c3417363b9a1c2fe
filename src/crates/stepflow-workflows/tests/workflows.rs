//! End-to-end runs of the bundled workflows against fake collaborators

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stepflow_core::{GraphError, InMemoryCheckpointSaver, RunConfig};
use stepflow_workflows::adapters::{AutoConfirmer, LoggingLinkedIn, LoggingMailer, LoggingPublisher};
use stepflow_workflows::{
    AnalysisWorkflow, ClipCutter, ClipSegment, CollaboratorError, CommentSource, Confirmer,
    IdeationServices, IdeationWorkflow, InfluencerProfile, LanguageModel, PublishingServices,
    PublishingWorkflow, Result, SponsorDirectory, SponsorshipServices, SponsorshipWorkflow,
    Transcriber, VideoDownloader,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Replies with queued answers, then repeats the fallback
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn always(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            fallback: reply.to_string(),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

struct FakeDownloader {
    fail: bool,
}

#[async_trait]
impl VideoDownloader for FakeDownloader {
    async fn download(&self, _url: &str, output: &Path) -> Result<PathBuf> {
        if self.fail {
            return Err(CollaboratorError::process("yt-dlp", "HTTP Error 404"));
        }
        Ok(output.to_path_buf())
    }
}

struct FakeTranscriber(String);

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _video: &Path) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct CountingCutter {
    cuts: AtomicUsize,
}

#[async_trait]
impl ClipCutter for CountingCutter {
    async fn cut(&self, _video: &Path, _clip: &ClipSegment, output: &Path) -> Result<PathBuf> {
        self.cuts.fetch_add(1, Ordering::SeqCst);
        Ok(output.to_path_buf())
    }
}

struct Fixture {
    model: Arc<ScriptedModel>,
    publisher: LoggingPublisher,
    cutter: Arc<CountingCutter>,
    services: PublishingServices,
}

fn publishing_fixture(model: Arc<ScriptedModel>, download_fails: bool) -> Fixture {
    let publisher = LoggingPublisher::new();
    let cutter = Arc::new(CountingCutter::default());
    let services = PublishingServices {
        model: model.clone(),
        downloader: Arc::new(FakeDownloader {
            fail: download_fails,
        }),
        transcriber: Arc::new(FakeTranscriber("word ".repeat(500))),
        cutter: cutter.clone(),
        publisher: Arc::new(publisher.clone()),
    };
    Fixture {
        model,
        publisher,
        cutter,
        services,
    }
}

const TWO_CLIPS: &str = r#"```json
{"clips": [
  {"start_sec": 5, "duration_sec": 25, "caption": "The hook"},
  {"start_sec": 60, "duration_sec": 30, "caption": "The payoff"}
]}
```"#;

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_publishing_raw_video_skips_clip_agent() {
    let fx = publishing_fixture(ScriptedModel::always(TWO_CLIPS), false);
    let graph = PublishingWorkflow::new(fx.services).with_work_dir("/tmp/stepflow-test").build().unwrap();

    let snapshots: Vec<_> = graph
        .stream(
            json!({"video_url": "https://example.com/v.mp4", "user_wants_clips": false}),
            RunConfig::new(),
        )
        .collect()
        .await;

    let nodes: Vec<String> = snapshots
        .iter()
        .map(|s| s.as_ref().unwrap().node.clone())
        .collect();
    assert_eq!(nodes, vec!["download", "get_validation", "publish_to_youtube"]);

    let last = snapshots.last().unwrap().as_ref().unwrap();
    assert!(last.is_final());
    assert_eq!(last.state["uploaded"].as_array().unwrap().len(), 1);
    assert_eq!(last.state["uploaded"][0]["kind"], json!("raw"));
    assert_eq!(fx.model.calls(), 0);
    assert_eq!(fx.publisher.uploads()[0].title, "Raw Video Upload");
}

#[tokio::test]
async fn test_publishing_with_clips_uploads_raw_and_each_clip() {
    let fx = publishing_fixture(ScriptedModel::always(TWO_CLIPS), false);
    let graph = PublishingWorkflow::new(fx.services).build().unwrap();

    let state = graph
        .invoke(
            json!({"video_url": "https://example.com/v.mp4", "user_wants_clips": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();

    assert_eq!(state["error"], Value::Null);
    assert_eq!(state["validation_passed"], json!(true));
    assert_eq!(state["clips"].as_array().unwrap().len(), 2);
    assert_eq!(fx.cutter.cuts.load(Ordering::SeqCst), 2);

    let titles: Vec<String> = fx.publisher.uploads().into_iter().map(|u| u.title).collect();
    assert_eq!(
        titles,
        vec![
            "Raw Video Upload",
            "Viral Clip #1 - The hook",
            "Viral Clip #2 - The payoff"
        ]
    );
    assert_eq!(state["uploaded"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_publishing_prompt_uses_truncated_transcript() {
    let fx = publishing_fixture(ScriptedModel::always(TWO_CLIPS), false);
    let graph = PublishingWorkflow::new(fx.services)
        .with_transcript_limit(100)
        .build()
        .unwrap();

    let state = graph
        .invoke(
            json!({"video_url": "https://example.com/v.mp4", "user_wants_clips": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();

    // Full transcript is stored; only the prefix is sent to the model.
    assert_eq!(state["transcript"].as_str().unwrap().len(), 2500);
    let prompt = fx.model.prompts.lock()[0].clone();
    let sent = prompt.split("Transcript: ").nth(1).unwrap();
    assert_eq!(sent.chars().count(), 100);
}

#[tokio::test]
async fn test_publishing_download_failure_is_recorded_and_nothing_published() {
    let fx = publishing_fixture(ScriptedModel::always(TWO_CLIPS), true);
    let graph = PublishingWorkflow::new(fx.services).build().unwrap();

    let state = graph
        .invoke(
            json!({"video_url": "https://example.com/missing.mp4", "user_wants_clips": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();

    assert_eq!(state["error"], json!("Video download failed."));
    assert!(fx.publisher.uploads().is_empty());
    assert_eq!(fx.model.calls(), 0);
    assert_eq!(state["uploaded"], json!([]));
}

#[tokio::test]
async fn test_publishing_unparseable_model_reply_fails_clipping() {
    let fx = publishing_fixture(ScriptedModel::always("Sorry, I can't help with that."), false);
    let graph = PublishingWorkflow::new(fx.services).build().unwrap();

    let state = graph
        .invoke(
            json!({"video_url": "https://example.com/v.mp4", "user_wants_clips": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();

    assert_eq!(state["error"], json!("LLM clipping agent failed."));
    assert!(fx.publisher.uploads().is_empty());
}

#[tokio::test]
async fn test_publishing_requested_clips_but_none_found_publishes_nothing() {
    let fx = publishing_fixture(ScriptedModel::always(r#"{"clips": []}"#), false);
    let graph = PublishingWorkflow::new(fx.services).build().unwrap();

    let state = graph
        .invoke(
            json!({"video_url": "https://example.com/v.mp4", "user_wants_clips": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();

    assert_eq!(state["validation_passed"], json!(false));
    assert_eq!(state["error"], Value::Null);
    assert!(fx.publisher.uploads().is_empty());
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeComments {
    requests: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl CommentSource for FakeComments {
    async fn fetch_comments(&self, video_id: &str, max: usize) -> Result<Vec<String>> {
        self.requests.lock().push((video_id.to_string(), max));
        Ok(vec!["Loved it".to_string(), "Too long".to_string()])
    }
}

#[tokio::test]
async fn test_analysis_produces_report_and_message() {
    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(VecDeque::from(["mostly positive".to_string()])),
        fallback: "Final report".to_string(),
        ..Default::default()
    });
    let comments = Arc::new(FakeComments::default());
    let graph = AnalysisWorkflow::new(model.clone(), comments.clone())
        .build()
        .unwrap()
        .with_checkpointer(Arc::new(InMemoryCheckpointSaver::new()));

    let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    let state = graph
        .invoke(json!({"video_url": url}), RunConfig::thread("analysis-1"))
        .await
        .unwrap();

    assert_eq!(
        comments.requests.lock().clone(),
        vec![("dQw4w9WgXcQ".to_string(), 25)]
    );
    assert!(state["comments"].as_str().unwrap().contains("- Loved it"));
    assert_eq!(state["analysis"], json!("mostly positive"));
    assert_eq!(state["report"], json!("Final report"));
    assert_eq!(
        state["messages"],
        json!([{"role": "assistant", "content": "Final report"}])
    );

    let checkpoint = graph.get_state("analysis-1").await.unwrap().unwrap();
    assert_eq!(checkpoint.state, state);
    assert_eq!(checkpoint.metadata.node.as_deref(), Some("generate_report"));
}

#[tokio::test]
async fn test_analysis_invalid_url_skips_model() {
    let model = ScriptedModel::always("unused");
    let graph = AnalysisWorkflow::new(model.clone(), Arc::new(FakeComments::default()))
        .build()
        .unwrap();

    let state = graph
        .invoke(json!({"video_url": "https://youtu.be/abc"}), RunConfig::new())
        .await
        .unwrap();

    assert_eq!(state["error"], json!("Invalid YouTube video URL."));
    assert_eq!(model.calls(), 0);
    assert_eq!(state["report"], Value::Null);
}

// ---------------------------------------------------------------------------
// Sponsorship
// ---------------------------------------------------------------------------

struct FixedDirectory(Vec<String>);

#[async_trait]
impl SponsorDirectory for FixedDirectory {
    async fn marketing_contacts(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

struct ScriptedConfirmer(Mutex<VecDeque<bool>>);

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, _draft: &str) -> Result<bool> {
        Ok(self.0.lock().pop_front().unwrap_or(true))
    }
}

fn profile() -> InfluencerProfile {
    InfluencerProfile {
        niche: Some("tech reviews".into()),
        youtube_subscribers: Some(55_000),
        insta_followers: Some(15_000),
        linkedin_followers: Some(8_000),
        youtube_url: Some("youtube.com/mytechchannel".into()),
        insta_url: Some("instagram.com/mytechchannel".into()),
        linkedin_url: Some("linkedin.com/in/mytechchannel".into()),
    }
}

#[tokio::test]
async fn test_sponsorship_redrafts_after_rejection_then_sends() {
    let model = ScriptedModel::always("Dear team, ... Best regards,");
    let mailer = LoggingMailer::new();
    let services = SponsorshipServices {
        model: model.clone(),
        directory: Arc::new(FixedDirectory(vec![
            "ads@brand.example".into(),
            "partners@other.example".into(),
        ])),
        confirmer: Arc::new(ScriptedConfirmer(Mutex::new(VecDeque::from([false, true])))),
        mailer: Arc::new(mailer.clone()),
    };
    let graph = SponsorshipWorkflow::new(services).with_profile(profile()).build().unwrap();

    let nodes: Vec<String> = graph
        .stream(json!({}), RunConfig::new())
        .map(|s| s.unwrap().node)
        .collect()
        .await;

    assert_eq!(
        nodes,
        vec![
            "collect_data",
            "draft_mail",
            "search_companies",
            "confirm_mail",
            "draft_mail",
            "search_companies",
            "confirm_mail",
            "send_mail"
        ]
    );
    assert_eq!(model.calls(), 2);
    assert!(model.prompts.lock()[0].contains("- YouTube Subscribers: 55000"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Sponsorship Inquiry");
    assert_eq!(sent[0].recipients, vec!["ads@brand.example", "partners@other.example"]);
}

#[tokio::test]
async fn test_sponsorship_without_contacts_sends_nothing() {
    let mailer = LoggingMailer::new();
    let services = SponsorshipServices {
        model: ScriptedModel::always("draft"),
        directory: Arc::new(FixedDirectory(Vec::new())),
        confirmer: Arc::new(AutoConfirmer::approve()),
        mailer: Arc::new(mailer.clone()),
    };
    let graph = SponsorshipWorkflow::new(services).with_profile(profile()).build().unwrap();

    let state = graph.invoke(json!({}), RunConfig::new()).await.unwrap();

    assert!(mailer.sent().is_empty());
    assert_eq!(state["companies_found"], json!("No recipients found."));
    assert_eq!(
        state["messages"][0]["content"],
        json!("Agent completed. No emails were found, so no messages were sent.")
    );
}

#[tokio::test]
async fn test_sponsorship_endless_rejection_hits_step_limit() {
    let services = SponsorshipServices {
        model: ScriptedModel::always("draft"),
        directory: Arc::new(FixedDirectory(vec!["a@b.io".into()])),
        confirmer: Arc::new(AutoConfirmer::reject()),
        mailer: Arc::new(LoggingMailer::new()),
    };
    let graph = SponsorshipWorkflow::new(services).with_profile(profile()).build().unwrap();

    let err = graph
        .invoke(json!({}), RunConfig::new().with_max_steps(10))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::StepLimitExceeded { limit: 10 }));
}

#[tokio::test]
async fn test_sponsorship_missing_niche_aborts_cleanly() {
    let mailer = LoggingMailer::new();
    let model = ScriptedModel::always("draft");
    let services = SponsorshipServices {
        model: model.clone(),
        directory: Arc::new(FixedDirectory(vec!["a@b.io".into()])),
        confirmer: Arc::new(AutoConfirmer::approve()),
        mailer: Arc::new(mailer.clone()),
    };
    let graph = SponsorshipWorkflow::new(services).build().unwrap();

    let state = graph.invoke(json!({}), RunConfig::new()).await.unwrap();

    assert_eq!(state["error"], json!("No influencer niche provided."));
    assert_eq!(model.calls(), 0);
    assert!(mailer.sent().is_empty());
}

// ---------------------------------------------------------------------------
// Ideation
// ---------------------------------------------------------------------------

const FIVE_IDEAS: &str = r#"{"ideas": [
  {"title": "Meal prep in 20 minutes", "summary": "Batch cooking for busy weeks"},
  {"title": "Pantry staples", "summary": "Ten items that rescue any dinner"},
  {"title": "Knife skills", "summary": "Three cuts every cook needs"},
  {"title": "One-pan dinners", "summary": "Less washing up"},
  {"title": "Budget brunch", "summary": "Weekend treats under five dollars"}
]}"#;

fn ideation_graph(
    model: Arc<ScriptedModel>,
    linkedin: &LoggingLinkedIn,
) -> stepflow_core::CompiledGraph {
    IdeationWorkflow::new(IdeationServices {
        model,
        linkedin: Arc::new(linkedin.clone()),
    })
    .build()
    .unwrap()
    .with_checkpointer(Arc::new(InMemoryCheckpointSaver::new()))
}

#[tokio::test]
async fn test_ideation_session_on_a_thread() {
    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(VecDeque::from([
            FIVE_IDEAS.to_string(),
            "  Batch cooking changed my week. #mealprep  ".to_string(),
        ])),
        fallback: "unused".to_string(),
        ..Default::default()
    });
    let linkedin = LoggingLinkedIn::new();
    let graph = ideation_graph(model.clone(), &linkedin);

    // Stage 1: ideas
    let state = graph
        .invoke(
            json!({"user_niche": "home cooking", "platform_choice": "LinkedIn"}),
            RunConfig::thread("creator"),
        )
        .await
        .unwrap();
    assert!(state["error"].is_null());
    assert_eq!(state["platform_choice"], "linkedin");
    let ideas = state["content_ideas"].as_array().unwrap();
    assert_eq!(ideas.len(), 5);

    // Stage 2: draft from the chosen idea
    let state = graph
        .invoke(
            json!({"selected_idea": ideas[0].clone()}),
            RunConfig::thread("creator"),
        )
        .await
        .unwrap();
    assert_eq!(state["post_draft"], "Batch cooking changed my week. #mealprep");
    assert!(model.prompts.lock()[1].contains("Idea: Meal prep in 20 minutes"));

    // Stage 3: publish with media
    let state = graph
        .invoke(
            json!({"publish_requested": true, "media_url": "https://cdn.example.com/bowl.jpg"}),
            RunConfig::thread("creator"),
        )
        .await
        .unwrap();
    assert_eq!(state["post_id"], "urn:li:share:dry-run-1");
    assert_eq!(state["publish_message"], "Successfully published to LinkedIn");
    assert_eq!(state["publish_requested"], false);

    let posts = linkedin.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "Batch cooking changed my week. #mealprep");
    assert_eq!(
        posts[0].media_asset.as_deref(),
        Some("urn:li:digitalmediaAsset:dry-run-1")
    );
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_ideation_youtube_drafts_script_and_skips_publishing() {
    let linkedin = LoggingLinkedIn::new();
    let graph = ideation_graph(ScriptedModel::always("HOOK: ..."), &linkedin);
    let idea = json!({"title": "Knife skills", "summary": "Three cuts"});

    let state = graph
        .invoke(
            json!({"user_niche": "cooking", "platform_choice": "youtube", "selected_idea": idea}),
            RunConfig::new(),
        )
        .await
        .unwrap();
    assert_eq!(state["script_draft"], "HOOK: ...");
    assert!(state["post_draft"].is_null());

    let state = graph
        .invoke(
            json!({"platform_choice": "youtube", "post_draft": "HOOK: ...", "publish_requested": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();
    assert_eq!(
        state["publish_message"],
        "YouTube script prepared (no direct publish integration)"
    );
    assert!(linkedin.posts().is_empty());
}

#[tokio::test]
async fn test_ideation_unsupported_platform_runs_no_model() {
    let model = ScriptedModel::always(FIVE_IDEAS);
    let graph = ideation_graph(model.clone(), &LoggingLinkedIn::new());

    let nodes: Vec<String> = graph
        .stream(
            json!({"user_niche": "cooking", "platform_choice": "myspace"}),
            RunConfig::new(),
        )
        .map(|item| item.unwrap().node)
        .collect()
        .await;
    assert_eq!(nodes, vec!["dispatch"]);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_ideation_stale_error_is_cleared_on_next_run() {
    let model = Arc::new(ScriptedModel {
        replies: Mutex::new(VecDeque::from(["no ideas today".to_string()])),
        fallback: FIVE_IDEAS.to_string(),
        ..Default::default()
    });
    let graph = ideation_graph(model, &LoggingLinkedIn::new());
    let input = json!({"user_niche": "cooking", "platform_choice": "linkedin"});

    let failed = graph.invoke(input.clone(), RunConfig::thread("retry")).await.unwrap();
    assert_eq!(failed["error"], "Idea generation failed.");

    let retried = graph.invoke(input, RunConfig::thread("retry")).await.unwrap();
    assert!(retried["error"].is_null());
    assert_eq!(retried["content_ideas"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_ideation_publish_without_draft_fails() {
    let linkedin = LoggingLinkedIn::new();
    let graph = ideation_graph(ScriptedModel::always("x"), &linkedin);

    let state = graph
        .invoke(
            json!({"platform_choice": "linkedin", "publish_requested": true}),
            RunConfig::new(),
        )
        .await
        .unwrap();
    assert_eq!(state["error"], "No post draft to publish.");
    assert!(linkedin.posts().is_empty());
}
