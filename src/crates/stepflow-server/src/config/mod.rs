//! Configuration module for stepflow-server

pub mod server;

pub use server::{
    CheckpointBackend, CheckpointConfig, EngineConfig, ListenConfig, LlmConfig, MediaConfig,
    ServerConfig, ServerConfigError, SponsorshipConfig, YouTubeConfig, CONFIG_ENV,
};
