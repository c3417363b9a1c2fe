//! Error types for workflow collaborators
//!
//! Collaborators (language models, media tools, publishing sinks) report
//! failures as [`CollaboratorError`]. Node bodies never let these escape as
//! fatal engine errors: they are converted into [`NodeError`]s so the message
//! lands in the workflow's `error` field and the run continues.

use stepflow_core::NodeError;
use thiserror::Error;

/// Result type for collaborator calls
pub type Result<T> = std::result::Result<T, CollaboratorError>;

/// Errors raised by external collaborators
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// External executable is not installed or not on PATH
    #[error("Executable not found: {0}")]
    MissingExecutable(String),

    /// External executable exited unsuccessfully
    #[error("{program} failed: {message}")]
    Process { program: String, message: String },

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Collaborator is missing required configuration
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl CollaboratorError {
    pub fn process(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Process {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Whether the failure came from a missing executable
    pub fn is_missing_executable(&self) -> bool {
        matches!(self, Self::MissingExecutable(_))
    }
}

impl From<serde_json::Error> for CollaboratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<CollaboratorError> for NodeError {
    fn from(err: CollaboratorError) -> Self {
        NodeError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_becomes_node_error() {
        let err = CollaboratorError::process("yt-dlp", "exit status 1");
        let node: NodeError = err.into();
        assert_eq!(node.message(), "yt-dlp failed: exit status 1");
    }

    #[test]
    fn test_missing_executable_detection() {
        assert!(CollaboratorError::MissingExecutable("ffmpeg".into()).is_missing_executable());
        assert!(!CollaboratorError::Parse("bad".into()).is_missing_executable());
    }

    #[test]
    fn test_api_error_display() {
        let err = CollaboratorError::Api {
            status: 429,
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "API error 429: quota exceeded");
    }
}
