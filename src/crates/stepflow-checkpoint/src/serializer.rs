//! Serialization protocol for persisted checkpoints

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Protocol for turning checkpoints into bytes and back
///
/// Persistent stores are generic over this so the on-disk encoding can be
/// swapped without touching the store itself.
pub trait SerializerProtocol: Send + Sync {
    /// Serialize a value to bytes
    fn dumps<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize a value from bytes
    fn loads<T: for<'de> Deserialize<'de>>(&self, data: &[u8]) -> Result<T>;

    /// File extension used by stores that keep one file per record
    fn extension(&self) -> &'static str {
        "bin"
    }
}

/// JSON serializer (default)
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output, handy when checkpoints are inspected by hand
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl SerializerProtocol for JsonSerializer {
    fn dumps<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        if self.pretty {
            Ok(serde_json::to_vec_pretty(value)?)
        } else {
            Ok(serde_json::to_vec(value)?)
        }
    }

    fn loads<T: for<'de> Deserialize<'de>>(&self, data: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(data)?)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
