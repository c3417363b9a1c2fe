//! JSON-file sponsor directory

use crate::collaborators::SponsorDirectory;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Reads marketing contacts from the `marketing_mails` array of a JSON file
///
/// ```json
/// { "marketing_mails": ["partners@brand.example", "ads@other.example"] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonSponsorDirectory {
    path: PathBuf,
}

#[derive(Deserialize)]
struct Assets {
    #[serde(default)]
    marketing_mails: Vec<String>,
}

impl JsonSponsorDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SponsorDirectory for JsonSponsorDirectory {
    async fn marketing_contacts(&self) -> Result<Vec<String>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CollaboratorError::NotConfigured(format!(
                    "sponsor directory {} not found",
                    self.path.display()
                ))
            } else {
                CollaboratorError::Io(e)
            }
        })?;

        let assets: Assets = serde_json::from_str(&raw).map_err(|e| {
            CollaboratorError::Parse(format!("could not decode {}: {e}", self.path.display()))
        })?;
        Ok(assets.marketing_mails)
    }
}
