//! Dry-run sinks and the automatic confirmer
//!
//! [`LoggingPublisher`], [`LoggingLinkedIn`] and [`LoggingMailer`] record
//! what would have been uploaded, posted or sent through `tracing` and keep
//! an in-memory log, so workflows can run end to end without external
//! accounts.

use crate::collaborators::{
    Confirmer, LinkedInPost, LinkedInPublisher, Mailer, OutgoingMail, VideoPublisher, VideoUpload,
};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records uploads instead of publishing them
#[derive(Debug, Clone, Default)]
pub struct LoggingPublisher {
    uploads: Arc<Mutex<Vec<VideoUpload>>>,
}

impl LoggingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads recorded so far
    pub fn uploads(&self) -> Vec<VideoUpload> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl VideoPublisher for LoggingPublisher {
    async fn publish(&self, upload: &VideoUpload) -> Result<String> {
        let mut uploads = self.uploads.lock();
        uploads.push(upload.clone());
        let id = format!("dry-run-{}", uploads.len());
        tracing::info!(
            video_id = %id,
            file = %upload.file.display(),
            title = %upload.title,
            "Dry-run upload recorded"
        );
        Ok(id)
    }
}

/// Records LinkedIn media uploads and posts instead of publishing them
#[derive(Debug, Clone, Default)]
pub struct LoggingLinkedIn {
    media: Arc<Mutex<Vec<String>>>,
    posts: Arc<Mutex<Vec<LinkedInPost>>>,
}

impl LoggingLinkedIn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Media URLs registered so far
    pub fn media(&self) -> Vec<String> {
        self.media.lock().clone()
    }

    pub fn posts(&self) -> Vec<LinkedInPost> {
        self.posts.lock().clone()
    }
}

#[async_trait]
impl LinkedInPublisher for LoggingLinkedIn {
    async fn upload_media(&self, media_url: &str) -> Result<String> {
        let mut media = self.media.lock();
        media.push(media_url.to_string());
        let urn = format!("urn:li:digitalmediaAsset:dry-run-{}", media.len());
        tracing::info!(asset = %urn, media_url, "Dry-run media upload recorded");
        Ok(urn)
    }

    async fn publish_post(&self, post: &LinkedInPost) -> Result<String> {
        let mut posts = self.posts.lock();
        posts.push(post.clone());
        let id = format!("urn:li:share:dry-run-{}", posts.len());
        tracing::info!(
            post_id = %id,
            media = ?post.media_asset,
            chars = post.text.chars().count(),
            "Dry-run post recorded"
        );
        Ok(id)
    }
}

/// Records mails instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LoggingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl LoggingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        tracing::info!(
            subject = %mail.subject,
            recipients = %mail.recipients.join(", "),
            "Dry-run mail recorded"
        );
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

/// Confirmer with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirmer {
    approve: bool,
}

impl AutoConfirmer {
    pub fn approve() -> Self {
        Self { approve: true }
    }

    pub fn reject() -> Self {
        Self { approve: false }
    }
}

impl Default for AutoConfirmer {
    fn default() -> Self {
        Self::approve()
    }
}

#[async_trait]
impl Confirmer for AutoConfirmer {
    async fn confirm(&self, draft: &str) -> Result<bool> {
        tracing::debug!(approve = self.approve, draft_len = draft.len(), "Auto-confirming draft");
        Ok(self.approve)
    }
}
