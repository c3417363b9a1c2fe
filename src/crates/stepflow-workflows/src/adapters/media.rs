//! Media adapters backed by command-line tools
//!
//! - [`YtDlpDownloader`] fetches videos with `yt-dlp`
//! - [`CommandTranscriber`] runs a speech-to-text command and reads the
//!   transcript from stdout
//! - [`FfmpegClipCutter`] cuts clips with `ffmpeg`, optionally reframing to
//!   vertical 9:16

use super::process;
use crate::collaborators::{ClipCutter, ClipSegment, Transcriber, VideoDownloader};
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const YT_DLP_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const VERTICAL_FILTER: &str = "scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920";

/// Downloads videos with `yt-dlp`
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    program: String,
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self::with_program("yt-dlp")
    }

    /// Use a specific executable path
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(url: &str, output: &Path) -> Vec<String> {
        vec![
            "-f".to_string(),
            YT_DLP_FORMAT.to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            output.display().to_string(),
            url.to_string(),
        ]
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, output: &Path) -> Result<PathBuf> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tracing::info!(url, output = %output.display(), "Downloading video");
        process::run(&self.program, Self::args(url, output)).await?;
        Ok(output.to_path_buf())
    }
}

/// Transcribes by running an external command with the video path appended
///
/// The command must print the transcript to stdout, e.g.
/// `whisper-cli --output-txt -f` style wrappers.
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(&self, video: &Path) -> Result<String> {
        let mut args = self.args.clone();
        args.push(video.display().to_string());

        let stdout = process::run(&self.program, args).await?;
        // Segment-per-line output is joined into one transcript.
        let transcript = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if transcript.is_empty() {
            return Err(CollaboratorError::Parse(format!(
                "{} produced an empty transcript",
                self.program
            )));
        }
        Ok(transcript)
    }
}

/// Output framing for cut clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// Re-encode to 1080x1920
    #[default]
    Vertical,
    /// Stream copy without reframing
    Original,
}

/// Cuts clips with `ffmpeg`
#[derive(Debug, Clone)]
pub struct FfmpegClipCutter {
    program: String,
    aspect: AspectRatio,
}

impl FfmpegClipCutter {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            aspect: AspectRatio::default(),
        }
    }

    pub fn with_aspect(mut self, aspect: AspectRatio) -> Self {
        self.aspect = aspect;
        self
    }

    fn args(&self, video: &Path, clip: &ClipSegment, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video.display().to_string(),
            "-ss".to_string(),
            clip.start_sec.to_string(),
            "-to".to_string(),
            clip.end_sec().to_string(),
        ];
        match self.aspect {
            AspectRatio::Vertical => args.extend(
                ["-vf", VERTICAL_FILTER, "-c:v", "libx264", "-c:a", "aac"].map(String::from),
            ),
            AspectRatio::Original => args.extend(["-c", "copy"].map(String::from)),
        }
        args.push(output.display().to_string());
        args
    }
}

impl Default for FfmpegClipCutter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipCutter for FfmpegClipCutter {
    async fn cut(&self, video: &Path, clip: &ClipSegment, output: &Path) -> Result<PathBuf> {
        if clip.duration_sec <= 0.0 || clip.start_sec < 0.0 {
            return Err(CollaboratorError::Parse(format!(
                "invalid clip bounds: start {} duration {}",
                clip.start_sec, clip.duration_sec
            )));
        }

        process::run(&self.program, self.args(video, clip, output)).await?;
        tracing::info!(output = %output.display(), "Clip saved");
        Ok(output.to_path_buf())
    }
}
