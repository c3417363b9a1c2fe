//! YouTube Data API comment source

use crate::collaborators::CommentSource;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: usize = 100;

/// Fetches top-level comments through `commentThreads.list`
#[derive(Clone)]
pub struct YouTubeCommentSource {
    api_key: String,
    api_base: String,
    client: Client,
}

impl YouTubeCommentSource {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CollaboratorError::NotConfigured(
                "YouTube API key is empty".to_string(),
            ));
        }
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        })
    }

    /// Point at a different API host (proxies, test servers)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn fetch_page(&self, video_id: &str, page_token: Option<&str>) -> Result<CommentPage> {
        let page_size = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(format!("{}/commentThreads", self.api_base))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CommentSource for YouTubeCommentSource {
    async fn fetch_comments(&self, video_id: &str, max: usize) -> Result<Vec<String>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max {
            let page = self.fetch_page(video_id, page_token.as_deref()).await?;
            comments.extend(page.texts().take(max - comments.len()));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(video_id, count = comments.len(), "Fetched comments");
        Ok(comments)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentPage {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

impl CommentPage {
    fn texts(&self) -> impl Iterator<Item = String> + '_ {
        self.items
            .iter()
            .map(|item| item.snippet.top_level_comment.snippet.text_display.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            YouTubeCommentSource::new("  "),
            Err(CollaboratorError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_page_parsing() {
        let page: CommentPage = serde_json::from_value(json!({
            "items": [
                {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "great video"}}}},
                {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "meh"}}}}
            ],
            "nextPageToken": "abc"
        }))
        .unwrap();

        assert_eq!(page.texts().collect::<Vec<_>>(), vec!["great video", "meh"]);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_last_page_has_no_token() {
        let page: CommentPage = serde_json::from_value(json!({"items": []})).unwrap();
        assert!(page.next_page_token.is_none());
        assert_eq!(page.texts().count(), 0);
    }
}
