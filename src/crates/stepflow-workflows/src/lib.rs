//! # stepflow-workflows - Content Automation Workflows
//!
//! Ready-made graphs built on [`stepflow_core`]:
//!
//! - **[Video publishing](publishing)** - download, clip with a language
//!   model, publish raw video and clips
//! - **[Comment analysis](analysis)** - fetch YouTube comments, analyze
//!   sentiment, write a report
//! - **[Sponsorship outreach](sponsorship)** - draft a sponsorship mail,
//!   look up sponsor contacts, confirm, send
//! - **[Content ideation](ideation)** - generate post ideas for a niche, draft
//!   a LinkedIn post or YouTube script, publish
//!
//! Every side effect goes through a [collaborator trait](collaborators)
//! passed in at construction. [`adapters`] provides implementations backed by
//! HTTP APIs, command-line tools and dry-run sinks.
//!
//! Collaborator failures never abort a run: nodes record a message in the
//! `error` field and later nodes skip their work.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stepflow_core::{InMemoryCheckpointSaver, RunConfig};
//! use stepflow_workflows::adapters::*;
//! use stepflow_workflows::analysis::AnalysisWorkflow;
//!
//! let model = Arc::new(ChatCompletionsModel::new(
//!     ChatCompletionsConfig::new("https://api.groq.com/openai/v1", "llama3-8b-8192")
//!         .with_api_key(llm_key),
//! )?);
//! let comments = Arc::new(YouTubeCommentSource::new(youtube_key)?);
//!
//! let graph = AnalysisWorkflow::new(model, comments)
//!     .build()?
//!     .with_checkpointer(Arc::new(InMemoryCheckpointSaver::new()));
//!
//! let state = graph
//!     .invoke(
//!         json!({"video_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}),
//!         RunConfig::thread("report-1"),
//!     )
//!     .await?;
//! println!("{}", state["report"]);
//! ```

pub mod adapters;
pub mod analysis;
pub mod collaborators;
pub mod error;
pub mod ideation;
pub mod publishing;
pub mod sponsorship;

mod prompts;
mod support;

pub use analysis::{AnalysisWorkflow, ANALYSIS};
pub use collaborators::{
    ClipCutter, ClipSegment, CommentSource, Confirmer, LanguageModel, LinkedInPost,
    LinkedInPublisher, Mailer, OutgoingMail, SponsorDirectory, Transcriber, VideoDownloader,
    VideoPublisher, VideoUpload,
};
pub use error::{CollaboratorError, Result};
pub use ideation::{ContentIdea, IdeationServices, IdeationWorkflow, Platform, IDEATION};
pub use publishing::{PublishingServices, PublishingWorkflow, PUBLISHING};
pub use sponsorship::{InfluencerProfile, SponsorshipServices, SponsorshipWorkflow, SPONSORSHIP};
