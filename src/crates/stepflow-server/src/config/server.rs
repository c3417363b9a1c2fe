//! Server configuration for stepflow-server
//!
//! Loads `stepflow.toml`: listener, engine limits, checkpoint backend and the
//! collaborator settings the bundled workflows are built from. Every section
//! is optional; missing values fall back to defaults. Credentials are only
//! read from the file or the environment and have no built-in values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stepflow_core::DEFAULT_MAX_STEPS;
use stepflow_workflows::adapters::AspectRatio;
use stepflow_workflows::InfluencerProfile;
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "STEPFLOW_CONFIG";

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `"*"` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Engine limits shared by all workflows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Checkpoint backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// Process-local, lost on restart
    #[default]
    Memory,
    /// One JSON file per thread
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub backend: CheckpointBackend,
    pub directory: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::Memory,
            directory: PathBuf::from("data/checkpoints"),
        }
    }
}

/// OpenAI-compatible model endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Overridden by `LLM_API_KEY`
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            api_key: None,
            temperature: Some(0.3),
            timeout_secs: 60,
        }
    }
}

/// External media tools used by the publishing workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub work_dir: PathBuf,
    pub yt_dlp: String,
    pub ffmpeg: String,
    /// Speech-to-text command; receives the video path as its last argument
    pub transcriber: String,
    pub transcriber_args: Vec<String>,
    pub clip_aspect: AspectRatio,
    pub transcript_limit: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("data/media"),
            yt_dlp: "yt-dlp".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            transcriber: "whisper-transcribe".to_string(),
            transcriber_args: Vec::new(),
            clip_aspect: AspectRatio::Vertical,
            transcript_limit: stepflow_workflows::publishing::DEFAULT_TRANSCRIPT_LIMIT,
        }
    }
}

/// YouTube Data API access for comment analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Overridden by `YOUTUBE_API_KEY`; analysis is disabled without one
    pub api_key: Option<String>,
    pub max_comments: usize,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_comments: stepflow_workflows::analysis::DEFAULT_MAX_COMMENTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SponsorshipConfig {
    /// JSON file with a `marketing_mails` array
    pub assets_path: PathBuf,
    pub profile: InfluencerProfile,
}

impl Default for SponsorshipConfig {
    fn default() -> Self {
        Self {
            assets_path: PathBuf::from("assets.json"),
            profile: InfluencerProfile::default(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub engine: EngineConfig,
    pub checkpoint: CheckpointConfig,
    pub llm: LlmConfig,
    pub media: MediaConfig,
    pub youtube: YouTubeConfig,
    pub sponsorship: SponsorshipConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ServerConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ServerConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ServerConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load, apply environment overrides and validate
    ///
    /// Searches for config in:
    /// 1. `explicit` (the `--config` flag)
    /// 2. `STEPFLOW_CONFIG` environment variable
    /// 3. ./config/stepflow.toml
    /// 4. ./stepflow.toml
    ///
    /// Falls back to defaults when no file is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ServerConfigError> {
        let mut config = match Self::locate(explicit) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration");
                Self::from_file(path)?
            }
            None => {
                tracing::info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        [
            PathBuf::from("config/stepflow.toml"),
            PathBuf::from("stepflow.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Apply `HOST`, `PORT`, `STEPFLOW_MAX_STEPS`, `LLM_API_KEY` and
    /// `YOUTUBE_API_KEY` from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ServerConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ServerConfigError::InvalidConfig(format!("PORT must be a valid u16, got '{port}'")))?;
        }
        if let Some(steps) = lookup("STEPFLOW_MAX_STEPS") {
            self.engine.max_steps = steps.parse().map_err(|_| {
                ServerConfigError::InvalidConfig(format!(
                    "STEPFLOW_MAX_STEPS must be a positive integer, got '{steps}'"
                ))
            })?;
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(key);
        }
        Ok(())
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        let invalid = |msg: &str| Err(ServerConfigError::InvalidConfig(msg.to_string()));

        if self.server.host.trim().is_empty() {
            return invalid("server.host must not be empty");
        }
        if self.engine.max_steps == 0 {
            return invalid("engine.max_steps must be at least 1");
        }
        if self.llm.base_url.trim().is_empty() || self.llm.model.trim().is_empty() {
            return invalid("llm.base_url and llm.model are required");
        }
        if self.llm.timeout_secs == 0 {
            return invalid("llm.timeout_secs must be at least 1");
        }
        if self.checkpoint.backend == CheckpointBackend::File
            && self.checkpoint.directory.as_os_str().is_empty()
        {
            return invalid("checkpoint.directory is required for the file backend");
        }
        if self.youtube.max_comments == 0 {
            return invalid("youtube.max_comments must be at least 1");
        }
        Ok(())
    }

    /// `host:port` listen address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_parsing() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 9000
cors_origins = ["http://localhost:5501"]

[engine]
max_steps = 40

[checkpoint]
backend = "file"
directory = "/var/lib/stepflow"

[llm]
model = "gpt-4o-mini"
base_url = "https://api.openai.com/v1"

[media]
clip_aspect = "original"

[sponsorship]
assets_path = "data/assets.json"

[sponsorship.profile]
niche = "tech reviews"
youtube_subscribers = 55000
"#;

        let config = ServerConfig::from_str(toml_content).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.engine.max_steps, 40);
        assert_eq!(config.checkpoint.backend, CheckpointBackend::File);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.media.clip_aspect, AspectRatio::Original);
        assert_eq!(config.media.yt_dlp, "yt-dlp");
        assert_eq!(config.sponsorship.profile.niche.as_deref(), Some("tech reviews"));
        assert_eq!(config.sponsorship.profile.youtube_subscribers, Some(55_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.engine.max_steps, DEFAULT_MAX_STEPS);
        assert!(config.llm.api_key.is_none());
        assert!(config.youtube.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORT", "3000"),
            ("STEPFLOW_MAX_STEPS", "7"),
            ("LLM_API_KEY", "llm-secret"),
            ("YOUTUBE_API_KEY", "yt-secret"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.engine.max_steps, 7);
        assert_eq!(config.llm.api_key.as_deref(), Some("llm-secret"));
        assert_eq!(config.youtube.api_key.as_deref(), Some("yt-secret"));
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_env_overrides(|key| (key == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ServerConfigError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let mut config = ServerConfig::default();
        config.engine.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stepflow.toml");
        std::fs::write(&path, "[engine]\nmax_steps = 12\n").unwrap();

        assert_eq!(ServerConfig::from_file(&path).unwrap().engine.max_steps, 12);
        assert!(matches!(
            ServerConfig::from_file(dir.path().join("missing.toml")),
            Err(ServerConfigError::ReadError { .. })
        ));
    }
}
