//! Concrete collaborator implementations
//!
//! | Adapter | Trait | Backend |
//! |---------|-------|---------|
//! | [`ChatCompletionsModel`] | `LanguageModel` | OpenAI-compatible HTTP |
//! | [`YtDlpDownloader`] | `VideoDownloader` | `yt-dlp` executable |
//! | [`CommandTranscriber`] | `Transcriber` | any speech-to-text command |
//! | [`FfmpegClipCutter`] | `ClipCutter` | `ffmpeg` executable |
//! | [`YouTubeCommentSource`] | `CommentSource` | YouTube Data API v3 |
//! | [`JsonSponsorDirectory`] | `SponsorDirectory` | JSON file |
//! | [`LoggingPublisher`] | `VideoPublisher` | dry run |
//! | [`LoggingMailer`] | `Mailer` | dry run |
//! | [`AutoConfirmer`] | `Confirmer` | fixed answer |

pub mod llm;
pub mod media;
mod process;
pub mod sinks;
pub mod sponsors;
pub mod youtube;

pub use llm::{ChatCompletionsConfig, ChatCompletionsModel};
pub use media::{AspectRatio, CommandTranscriber, FfmpegClipCutter, YtDlpDownloader};
pub use sinks::{AutoConfirmer, LoggingLinkedIn, LoggingMailer, LoggingPublisher};
pub use sponsors::JsonSponsorDirectory;
pub use youtube::YouTubeCommentSource;
