//! File-backed checkpoint storage
//!
//! [`FileCheckpointSaver`] writes one file per thread into a directory. Each
//! save goes to a temporary file first and is renamed over the previous
//! checkpoint, so a crash mid-write never leaves a torn checkpoint behind.
//!
//! Thread ids are escaped into file names: ASCII alphanumerics, `-` and `_`
//! are kept, every other byte becomes `%XX`.

use crate::{
    checkpoint::{Checkpoint, CheckpointMetadata},
    error::{CheckpointError, Result},
    serializer::{JsonSerializer, SerializerProtocol},
    traits::CheckpointSaver,
};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Checkpoint saver persisting each thread to its own file
#[derive(Debug, Clone)]
pub struct FileCheckpointSaver<S: SerializerProtocol = JsonSerializer> {
    dir: PathBuf,
    serializer: S,
}

impl FileCheckpointSaver<JsonSerializer> {
    /// Open (creating if needed) a JSON checkpoint directory
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_serializer(dir, JsonSerializer::new()).await
    }
}

impl<S: SerializerProtocol> FileCheckpointSaver<S> {
    /// Open a checkpoint directory with a custom serializer
    pub async fn with_serializer(dir: impl Into<PathBuf>, serializer: S) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, serializer })
    }

    /// Directory holding the checkpoint files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, thread_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_thread_id(thread_id), self.serializer.extension()))
    }
}

#[async_trait]
impl<S: SerializerProtocol> CheckpointSaver for FileCheckpointSaver<S> {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        match tokio::fs::read(self.path_for(thread_id)).await {
            Ok(bytes) => Ok(Some(self.serializer.loads(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(
        &self,
        thread_id: &str,
        state: Value,
        metadata: CheckpointMetadata,
    ) -> Result<Checkpoint> {
        if thread_id.is_empty() {
            return Err(CheckpointError::Invalid(
                "thread_id must not be empty".to_string(),
            ));
        }

        let version = self
            .load(thread_id)
            .await?
            .map(|c| c.next_version())
            .unwrap_or(1);
        let checkpoint = Checkpoint::new(thread_id, version, state, metadata);
        let bytes = self.serializer.dumps(&checkpoint)?;

        let path = self.path_for(thread_id);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(thread_id, version, path = %path.display(), "Checkpoint written");
        Ok(checkpoint)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(thread_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_threads(&self) -> Result<Vec<String>> {
        let suffix = format!(".{}", self.serializer.extension());
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut threads = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(&suffix) {
                threads.push(decode_thread_id(stem)?);
            }
        }

        threads.sort();
        Ok(threads)
    }
}

fn encode_thread_id(thread_id: &str) -> String {
    let mut out = String::with_capacity(thread_id.len());
    for byte in thread_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn decode_thread_id(encoded: &str) -> Result<String> {
    let invalid = || CheckpointError::Invalid(format!("malformed checkpoint file name: {encoded}"));
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3).ok_or_else(invalid)?;
            out.push(u8::from_str_radix(hex, 16).map_err(|_| invalid())?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| invalid())
}
