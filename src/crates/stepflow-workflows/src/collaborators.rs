//! Collaborator traits injected into workflow nodes
//!
//! Every side effect a workflow performs goes through one of these traits.
//! Workflows receive them as `Arc<dyn Trait>` at construction time, so tests
//! substitute fakes and deployments pick adapters from configuration.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Text completion backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single-turn prompt and return the reply text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Fetches a remote video to a local file
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn download(&self, url: &str, output: &Path) -> Result<PathBuf>;
}

/// Speech-to-text over a local video file
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, video: &Path) -> Result<String>;
}

/// Cuts a segment out of a local video
#[async_trait]
pub trait ClipCutter: Send + Sync {
    async fn cut(&self, video: &Path, clip: &ClipSegment, output: &Path) -> Result<PathBuf>;
}

/// Uploads a video and returns the remote video id
#[async_trait]
pub trait VideoPublisher: Send + Sync {
    async fn publish(&self, upload: &VideoUpload) -> Result<String>;
}

/// Source of top-level comments for a video
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch at most `max` comments for the given video id
    async fn fetch_comments(&self, video_id: &str, max: usize) -> Result<Vec<String>>;
}

/// Directory of sponsor marketing contacts
#[async_trait]
pub trait SponsorDirectory: Send + Sync {
    async fn marketing_contacts(&self) -> Result<Vec<String>>;
}

/// Outgoing mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Professional network publishing (media upload, then post)
#[async_trait]
pub trait LinkedInPublisher: Send + Sync {
    /// Register the media at `media_url` and return its asset URN
    async fn upload_media(&self, media_url: &str) -> Result<String>;

    /// Publish a post and return its id
    async fn publish_post(&self, post: &LinkedInPost) -> Result<String>;
}

/// Human-in-the-loop approval of a drafted mail
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, draft: &str) -> Result<bool>;
}

/// Segment of a video proposed for a short clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSegment {
    pub start_sec: f64,
    pub duration_sec: f64,
    pub caption: String,
}

impl ClipSegment {
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }
}

/// Video upload request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoUpload {
    pub file: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub privacy_status: String,
}

impl VideoUpload {
    pub fn new(file: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            privacy_status: "public".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Mail handed to a [`Mailer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Post handed to a [`LinkedInPublisher`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInPost {
    pub text: String,
    /// Asset URN returned by [`LinkedInPublisher::upload_media`]
    pub media_asset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_segment_end() {
        let clip = ClipSegment {
            start_sec: 12.5,
            duration_sec: 30.0,
            caption: "hook".into(),
        };
        assert_eq!(clip.end_sec(), 42.5);
    }

    #[test]
    fn test_clip_segment_deserializes_from_llm_shape() {
        let clip: ClipSegment =
            serde_json::from_str(r#"{"start_sec": 5, "duration_sec": 25.5, "caption": "wow"}"#)
                .unwrap();
        assert_eq!(clip.start_sec, 5.0);
        assert_eq!(clip.caption, "wow");
    }

    #[test]
    fn test_upload_builder_defaults_public() {
        let upload = VideoUpload::new("clip.mp4", "Clip").with_tags(["shorts", "viral"]);
        assert_eq!(upload.privacy_status, "public");
        assert_eq!(upload.tags, vec!["shorts", "viral"]);
        assert!(upload.description.is_empty());
    }
}
