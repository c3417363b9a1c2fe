//! Named, compiled workflows sharing one checkpoint store
//!
//! Every graph registered here is attached to the same checkpointer and the
//! same [`ThreadLocks`], so a thread id is serialized across workflows as
//! well as within one.

use crate::config::{CheckpointBackend, ServerConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use stepflow_core::{
    CheckpointSaver, CompiledGraph, FileCheckpointSaver, GraphError, InMemoryCheckpointSaver,
    ThreadLocks,
};
use stepflow_workflows::adapters::{
    AutoConfirmer, ChatCompletionsConfig, ChatCompletionsModel, CommandTranscriber,
    FfmpegClipCutter, JsonSponsorDirectory, LoggingLinkedIn, LoggingMailer, LoggingPublisher,
    YouTubeCommentSource, YtDlpDownloader,
};
use stepflow_workflows::{
    AnalysisWorkflow, CollaboratorError, IdeationServices, IdeationWorkflow, LanguageModel,
    PublishingServices, PublishingWorkflow, SponsorshipServices, SponsorshipWorkflow, ANALYSIS,
    IDEATION, PUBLISHING, SPONSORSHIP,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Checkpoint store unavailable: {0}")]
    Checkpoint(#[from] stepflow_checkpoint::CheckpointError),

    #[error("Collaborator setup failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Workflow failed to compile: {0}")]
    Graph(#[from] GraphError),
}

/// Workflows served by the API
pub struct WorkflowRegistry {
    workflows: BTreeMap<String, CompiledGraph>,
    checkpointer: Arc<dyn CheckpointSaver>,
    locks: ThreadLocks,
    max_steps: usize,
}

impl WorkflowRegistry {
    pub fn new(checkpointer: Arc<dyn CheckpointSaver>, max_steps: usize) -> Self {
        Self {
            workflows: BTreeMap::new(),
            checkpointer,
            locks: ThreadLocks::new(),
            max_steps,
        }
    }

    /// Register `graph` under `name`, attaching the shared store and locks
    pub fn register(&mut self, name: impl Into<String>, graph: CompiledGraph) -> &mut Self {
        let graph = graph
            .with_checkpointer(self.checkpointer.clone())
            .with_thread_locks(self.locks.clone())
            .with_max_steps(self.max_steps);
        self.workflows.insert(name.into(), graph);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CompiledGraph> {
        self.workflows.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.workflows.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompiledGraph)> {
        self.workflows.iter().map(|(name, graph)| (name.as_str(), graph))
    }

    pub fn checkpointer(&self) -> &Arc<dyn CheckpointSaver> {
        &self.checkpointer
    }

    pub fn locks(&self) -> &ThreadLocks {
        &self.locks
    }

    /// Build the bundled workflows from configuration
    ///
    /// Comment analysis is only registered when a YouTube API key is set.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, RegistryError> {
        let checkpointer: Arc<dyn CheckpointSaver> = match config.checkpoint.backend {
            CheckpointBackend::Memory => Arc::new(InMemoryCheckpointSaver::new()),
            CheckpointBackend::File => {
                Arc::new(FileCheckpointSaver::open(&config.checkpoint.directory).await?)
            }
        };
        tracing::info!(backend = ?config.checkpoint.backend, "Checkpoint store ready");

        let mut registry = Self::new(checkpointer, config.engine.max_steps);
        let model = language_model(config)?;

        let media = &config.media;
        let publishing = PublishingWorkflow::new(PublishingServices {
            model: model.clone(),
            downloader: Arc::new(YtDlpDownloader::with_program(&media.yt_dlp)),
            transcriber: Arc::new(
                CommandTranscriber::new(&media.transcriber).with_args(media.transcriber_args.clone()),
            ),
            cutter: Arc::new(FfmpegClipCutter::with_program(&media.ffmpeg).with_aspect(media.clip_aspect)),
            publisher: Arc::new(LoggingPublisher::new()),
        })
        .with_work_dir(&media.work_dir)
        .with_transcript_limit(media.transcript_limit)
        .build()?;
        registry.register(PUBLISHING, publishing);

        match config.youtube.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                let comments = YouTubeCommentSource::new(key)?;
                let analysis = AnalysisWorkflow::new(model.clone(), Arc::new(comments))
                    .with_max_comments(config.youtube.max_comments)
                    .build()?;
                registry.register(ANALYSIS, analysis);
            }
            None => tracing::warn!("YOUTUBE_API_KEY not set, comment analysis disabled"),
        }

        let ideation = IdeationWorkflow::new(IdeationServices {
            model: model.clone(),
            linkedin: Arc::new(LoggingLinkedIn::new()),
        })
        .build()?;
        registry.register(IDEATION, ideation);

        let sponsorship = SponsorshipWorkflow::new(SponsorshipServices {
            model,
            directory: Arc::new(JsonSponsorDirectory::new(&config.sponsorship.assets_path)),
            confirmer: Arc::new(AutoConfirmer::approve()),
            mailer: Arc::new(LoggingMailer::new()),
        })
        .with_profile(config.sponsorship.profile.clone())
        .build()?;
        registry.register(SPONSORSHIP, sponsorship);

        tracing::info!(workflows = ?registry.names(), "Workflows registered");
        Ok(registry)
    }
}

fn language_model(config: &ServerConfig) -> Result<Arc<dyn LanguageModel>, CollaboratorError> {
    let llm = &config.llm;
    let mut settings = ChatCompletionsConfig::new(&llm.base_url, &llm.model)
        .with_timeout(Duration::from_secs(llm.timeout_secs));
    if let Some(temperature) = llm.temperature {
        settings = settings.with_temperature(temperature);
    }
    match &llm.api_key {
        Some(key) => settings = settings.with_api_key(key),
        None => tracing::warn!(base_url = %llm.base_url, "LLM_API_KEY not set, calling model without credentials"),
    }
    Ok(Arc::new(ChatCompletionsModel::new(settings)?))
}
